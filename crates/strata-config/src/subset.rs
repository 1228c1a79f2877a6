use strata_core::Provenance;

use crate::configuration::{Configuration, Listing, RawProperty};

/// A narrower namespace projected onto a wider configuration.
///
/// With prefix `db`, a lookup of `password` is delegated as `db.password`;
/// with suffix `primary` it becomes `password.primary`. Both may be combined.
#[derive(Debug, Clone)]
pub struct Subset<C> {
    prefix: Option<String>,
    suffix: Option<String>,
    configuration: C,
}

impl<C> Subset<C> {
    pub fn new(prefix: Option<&str>, suffix: Option<&str>, configuration: C) -> Self {
        Self {
            prefix: prefix.map(|p| format!("{p}.")),
            suffix: suffix.map(|s| format!(".{s}")),
            configuration,
        }
    }

    pub fn prefixed(prefix: &str, configuration: C) -> Self {
        Self::new(Some(prefix), None, configuration)
    }

    pub fn suffixed(suffix: &str, configuration: C) -> Self {
        Self::new(None, Some(suffix), configuration)
    }

    fn full_name(&self, name: &str) -> String {
        let prefix = self.prefix.as_deref().unwrap_or("");
        let suffix = self.suffix.as_deref().unwrap_or("");
        format!("{prefix}{name}{suffix}")
    }

    fn is_member(&self, raw_name: &str) -> bool {
        let prefix = self.prefix.as_deref().unwrap_or("");
        let suffix = self.suffix.as_deref().unwrap_or("");
        raw_name.len() >= prefix.len() + suffix.len()
            && raw_name.starts_with(prefix)
            && raw_name.ends_with(suffix)
    }
}

impl<C: Configuration> Configuration for Subset<C> {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        self.configuration.lookup(&self.full_name(name))
    }

    fn contains_name(&self, name: &str) -> bool {
        self.configuration.contains_name(&self.full_name(name))
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        self.configuration.search_path_of(&self.full_name(name))
    }

    /// The wrapped listing, keeping only entries inside this namespace.
    fn list(&self) -> Listing {
        self.configuration
            .list()
            .into_iter()
            .map(|(location, properties)| {
                let members = properties
                    .into_iter()
                    .filter(|(name, _)| self.is_member(name))
                    .collect();
                (location, members)
            })
            .collect()
    }
}
