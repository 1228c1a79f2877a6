use strata_core::{Location, Provenance};

use crate::configuration::{Configuration, Listing, PropertyMap, RawProperty};

/// Configuration held in memory, found at a single location.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationMap {
    properties: PropertyMap,
    location: Location,
}

impl ConfigurationMap {
    /// Properties compiled into the program, at [`Location::INTRINSIC`].
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            location: Location::INTRINSIC,
        }
    }

    /// Report the properties as coming from `location`.
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    fn provenance(&self, name: &str) -> Provenance {
        Provenance::new(name, self.location.clone(), name)
    }
}

impl From<PropertyMap> for ConfigurationMap {
    fn from(properties: PropertyMap) -> Self {
        Self {
            properties,
            location: Location::INTRINSIC,
        }
    }
}

impl Configuration for ConfigurationMap {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        self.properties
            .get(name)
            .map(|value| RawProperty::new(self.provenance(name), value.as_str()))
    }

    fn contains_name(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        vec![self.provenance(name)]
    }

    fn list(&self) -> Listing {
        vec![(self.location.clone(), self.properties.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_reports_the_name_verbatim() {
        let config = ConfigurationMap::new([("db.url", "jdbc:x")]).at(Location::new("defaults"));
        let raw = config.lookup("db.url").unwrap();
        assert_eq!(raw.value, "jdbc:x");
        assert_eq!(raw.location, Provenance::new("db.url", Location::new("defaults"), "db.url"));
        assert!(config.lookup("DB_URL").is_none());
    }

    #[test]
    fn test_defaults_to_intrinsic_location() {
        let config = ConfigurationMap::new([("a", "1")]);
        assert_eq!(config.location(), &Location::INTRINSIC);
    }
}
