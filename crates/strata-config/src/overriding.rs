use strata_core::Provenance;

use crate::configuration::{Configuration, Listing, RawProperty};

/// Looks up properties in `primary` and, when not defined there, in `fallback`.
///
/// Chains associate to the right: `a.overriding(b.overriding(c))` searches
/// `a`, then `b`, then `c`.
#[derive(Debug, Clone)]
pub struct Override<O, F> {
    primary: O,
    fallback: F,
}

impl<O, F> Override<O, F> {
    pub fn new(primary: O, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &O {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<O: Configuration, F: Configuration> Configuration for Override<O, F> {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        self.primary.lookup(name).or_else(|| self.fallback.lookup(name))
    }

    fn contains_name(&self, name: &str) -> bool {
        self.primary.contains_name(name) || self.fallback.contains_name(name)
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        let mut path = self.primary.search_path_of(name);
        path.extend(self.fallback.search_path_of(name));
        path
    }

    fn list(&self) -> Listing {
        let mut listing = self.primary.list();
        listing.extend(self.fallback.list());
        listing
    }
}
