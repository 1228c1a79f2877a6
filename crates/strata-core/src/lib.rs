//! # strata-core
//!
//! The vocabulary shared by every Strata crate: typed [`Key`]s and the
//! [`PropertyType`] parsers behind them, [`Location`] and [`Provenance`]
//! records, and the single [`Misconfiguration`] error.

pub mod error;
pub mod key;
pub mod location;
pub mod property_type;
pub mod temporal;

pub use error::{Misconfiguration, Result};
pub use key::{Key, KeyGroup};
pub use location::{Location, Provenance};
pub use property_type::*;
pub use temporal::{
    Period, TemporalParseError, duration_type, instant_type, local_date_time_type, local_date_type,
    local_time_type, parse_iso_duration, period_type,
};
