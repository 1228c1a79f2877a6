//! # strata-config
//!
//! Resolves typed [`Key`](strata_core::Key)s against layered sources: in-memory
//! maps, `.properties` and TOML files, environment variables and command-line
//! flags.
//!
//! Sources compose by delegation. [`Override`] puts one configuration in front
//! of another, [`Search`] does the same for an ordered list, and [`Subset`]
//! projects a prefixed or suffixed namespace onto a wider configuration. Every
//! lookup reports where its value came from, and a failed `get` lists every
//! location that was searched.

pub mod configuration;
pub mod overriding;
pub mod search;
pub mod sources;
pub mod subset;

pub use configuration::{Configuration, ConfigurationExt, Listing, PropertyMap, RawProperty};
pub use overriding::Override;
pub use search::{Search, search};
pub use sources::*;
pub use subset::Subset;

pub use strata_core::{Key, KeyGroup, Location, Misconfiguration, Provenance, Result};
