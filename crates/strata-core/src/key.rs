use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::location::Provenance;
use crate::property_type::PropertyType;

/// A named, typed property.
///
/// Two keys denote the same property when their names are equal; the value
/// type is only a compile-time tag. Declare keys once and reuse them:
///
/// ```
/// use strata_core::{Key, int_type};
///
/// let retry_count = Key::new("connection.retrycount", int_type());
/// assert_eq!(retry_count.name(), "connection.retrycount");
/// ```
pub struct Key<T> {
    name: String,
    property_type: PropertyType<T>,
}

impl<T: 'static> Key<T> {
    pub fn new(name: impl Into<String>, property_type: PropertyType<T>) -> Self {
        Self {
            name: name.into(),
            property_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> &PropertyType<T> {
        &self.property_type
    }

    pub fn parse(&self, location: &Provenance, raw: &str) -> Result<T> {
        self.property_type.parse(location, raw)
    }

    /// The same parser under another name. The result is a distinct key.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: self.property_type.clone(),
        }
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            property_type: self.property_type.clone(),
        }
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Key<T> {}

impl<T> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("type", &self.property_type)
            .finish()
    }
}

impl<T> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A namespace that hands out keys sharing a dotted prefix.
///
/// ```
/// use strata_core::{KeyGroup, int_type, string_type};
///
/// let db = KeyGroup::new("db");
/// let password = db.key("password", string_type());
/// let pool_size = db.group("pool").key("size", int_type());
/// assert_eq!(password.name(), "db.password");
/// assert_eq!(pool_size.name(), "db.pool.size");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyGroup {
    name: String,
}

impl KeyGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key<T: 'static>(&self, local_name: &str, property_type: PropertyType<T>) -> Key<T> {
        Key::new(self.qualify(local_name), property_type)
    }

    /// A nested group whose name is qualified by this one.
    pub fn group(&self, local_name: &str) -> KeyGroup {
        KeyGroup::new(self.qualify(local_name))
    }

    fn qualify(&self, local_name: &str) -> String {
        if self.name.is_empty() {
            local_name.to_owned()
        } else {
            format!("{}.{}", self.name, local_name)
        }
    }
}
