use std::fmt;

use strata_core::Provenance;

use crate::configuration::{Configuration, Listing, RawProperty};

/// An ordered list of configurations; the first one that defines a property wins.
#[derive(Default)]
pub struct Search {
    configurations: Vec<Box<dyn Configuration>>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `configuration` with lower priority than everything already added.
    pub fn with(mut self, configuration: impl Configuration + 'static) -> Self {
        self.configurations.push(Box::new(configuration));
        self
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

impl fmt::Debug for Search {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("configurations", &self.configurations.len())
            .finish_non_exhaustive()
    }
}

impl FromIterator<Box<dyn Configuration>> for Search {
    fn from_iter<I: IntoIterator<Item = Box<dyn Configuration>>>(iter: I) -> Self {
        Self {
            configurations: iter.into_iter().collect(),
        }
    }
}

/// Search `configurations` in the order given.
pub fn search<I>(configurations: I) -> Search
where
    I: IntoIterator<Item = Box<dyn Configuration>>,
{
    configurations.into_iter().collect()
}

impl Configuration for Search {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        self.configurations
            .iter()
            .find(|c| c.contains_name(name))
            .and_then(|c| c.lookup(name))
    }

    fn contains_name(&self, name: &str) -> bool {
        self.configurations.iter().any(|c| c.contains_name(name))
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        self.configurations
            .iter()
            .flat_map(|c| c.search_path_of(name))
            .collect()
    }

    fn list(&self) -> Listing {
        self.configurations.iter().flat_map(|c| c.list()).collect()
    }
}
