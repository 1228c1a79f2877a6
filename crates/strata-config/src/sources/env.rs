//! Process environment variables as a configuration source.
//!
//! Key names are translated from the lower-case, dotted convention to the
//! upper-case, underscored one, behind an optional prefix: with prefix `APP_`,
//! the key `db.password` is looked up as `APP_DB_PASSWORD`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use strata_core::{Location, Provenance};

use crate::configuration::{Configuration, Listing, PropertyMap, RawProperty};

static LOCATION: Location = Location {
    description: Cow::Borrowed("environment variables"),
    uri: None,
};

/// Somewhere environment variables can be read from.
pub trait EnvSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    /// Every variable, for listing.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    /// Variables whose name or value is not valid UTF-8 are skipped.
    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

/// A fixed set of variables, for tests and embedding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Configuration looked up in environment variables.
#[derive(Debug, Clone)]
pub struct EnvironmentVariables<E = ProcessEnv> {
    prefix: String,
    env: E,
}

impl EnvironmentVariables<ProcessEnv> {
    /// The process environment, unprefixed.
    pub fn new() -> Self {
        Self::with_source("", ProcessEnv)
    }

    /// The process environment, restricted to names starting with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_source(prefix, ProcessEnv)
    }
}

impl Default for EnvironmentVariables<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> EnvironmentVariables<E> {
    pub fn with_source(prefix: impl Into<String>, env: E) -> Self {
        Self {
            prefix: prefix.into(),
            env,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn location(&self) -> &Location {
        &LOCATION
    }

    /// `prefix + name` upper-cased, with `.` replaced by `_`.
    pub fn variable_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.to_uppercase().replace('.', "_"))
    }
}

impl<E: EnvSource> Configuration for EnvironmentVariables<E> {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        let variable = self.variable_name(name);
        let value = self.env.get(&variable)?;
        Some(RawProperty::new(Provenance::new(name, LOCATION.clone(), variable), value))
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        vec![Provenance::new(name, LOCATION.clone(), self.variable_name(name))]
    }

    fn list(&self) -> Listing {
        let vars: PropertyMap = self
            .env
            .vars()
            .into_iter()
            .filter(|(name, _)| name.starts_with(&self.prefix))
            .collect();
        vec![(LOCATION.clone(), vars)]
    }
}
