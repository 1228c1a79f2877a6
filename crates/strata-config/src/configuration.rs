use std::collections::BTreeMap;
use std::sync::Arc;

use strata_core::{Key, Location, Misconfiguration, Provenance, Result};

use crate::overriding::Override;

/// Raw name → raw value, as held by one source.
pub type PropertyMap = BTreeMap<String, String>;

/// One entry per underlying source, in priority order.
pub type Listing = Vec<(Location, PropertyMap)>;

/// A raw value and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub location: Provenance,
    pub value: String,
}

impl RawProperty {
    pub fn new(location: Provenance, value: impl Into<String>) -> Self {
        Self {
            location,
            value: value.into(),
        }
    }
}

/// Looks up configuration properties by name.
///
/// Implementations hold no mutable state after construction, so lookups are
/// repeatable and safe to share across threads. Typed access lives in
/// [`ConfigurationExt`].
pub trait Configuration: Send + Sync {
    /// The raw value for `name` from the first location in the search path that defines it.
    fn lookup(&self, name: &str) -> Option<RawProperty>;

    fn contains_name(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Every location that would be consulted for `name`, in priority order.
    fn search_path_of(&self, name: &str) -> Vec<Provenance>;

    /// The full raw contents of every underlying source.
    fn list(&self) -> Listing;
}

/// Typed lookups and composition, available on every [`Configuration`].
pub trait ConfigurationExt: Configuration {
    /// The value of `key`, or a [`Misconfiguration`] listing every searched location.
    fn get<T: 'static>(&self, key: &Key<T>) -> Result<T> {
        self.get_or_null(key)?
            .ok_or_else(|| Misconfiguration::missing_property(key.name(), &self.search_path_of(key.name())))
    }

    /// The value of `key`, or `None` when no location defines it.
    ///
    /// A value that is present but malformed is still an error.
    fn get_or_null<T: 'static>(&self, key: &Key<T>) -> Result<Option<T>> {
        self.lookup(key.name())
            .map(|raw| key.parse(&raw.location, &raw.value))
            .transpose()
    }

    /// The value of `key`, or `default` when no location defines it.
    fn get_or_else<T: 'static>(&self, key: &Key<T>, default: T) -> Result<T> {
        Ok(self.get_or_null(key)?.unwrap_or(default))
    }

    /// The value of `key`, or `default(key)` when no location defines it.
    fn get_or_else_with<T, F>(&self, key: &Key<T>, default: F) -> Result<T>
    where
        T: 'static,
        F: FnOnce(&Key<T>) -> T,
    {
        match self.get_or_null(key)? {
            Some(value) => Ok(value),
            None => Ok(default(key)),
        }
    }

    fn contains<T: 'static>(&self, key: &Key<T>) -> bool {
        self.contains_name(key.name())
    }

    fn search_path<T: 'static>(&self, key: &Key<T>) -> Vec<Provenance> {
        self.search_path_of(key.name())
    }

    /// Where the value of `key` would be taken from, if anywhere.
    fn location_of<T: 'static>(&self, key: &Key<T>) -> Option<Provenance> {
        self.lookup(key.name()).map(|raw| raw.location)
    }

    /// Look up in `self` first and in `fallback` only when `self` has no definition.
    fn overriding<F: Configuration>(self, fallback: F) -> Override<Self, F>
    where
        Self: Sized,
    {
        Override::new(self, fallback)
    }
}

impl<C: Configuration + ?Sized> ConfigurationExt for C {}

impl<C: Configuration + ?Sized> Configuration for &C {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        (**self).lookup(name)
    }

    fn contains_name(&self, name: &str) -> bool {
        (**self).contains_name(name)
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        (**self).search_path_of(name)
    }

    fn list(&self) -> Listing {
        (**self).list()
    }
}

impl<C: Configuration + ?Sized> Configuration for Box<C> {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        (**self).lookup(name)
    }

    fn contains_name(&self, name: &str) -> bool {
        (**self).contains_name(name)
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        (**self).search_path_of(name)
    }

    fn list(&self) -> Listing {
        (**self).list()
    }
}

impl<C: Configuration + ?Sized> Configuration for Arc<C> {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        (**self).lookup(name)
    }

    fn contains_name(&self, name: &str) -> bool {
        (**self).contains_name(name)
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        (**self).search_path_of(name)
    }

    fn list(&self) -> Listing {
        (**self).list()
    }
}
