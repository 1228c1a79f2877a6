use std::error::Error as StdError;

use thiserror::Error;

use crate::location::Provenance;

type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// The one error raised for missing or malformed configuration.
///
/// Carries a human-readable message and, when a low-level parse failed,
/// the original failure as its `source()`.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Misconfiguration {
    message: String,
    #[source]
    cause: Option<BoxedCause>,
}

impl Misconfiguration {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<BoxedCause>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// `"<source> <name-in-location> - invalid <type>: <raw>"`
    pub fn invalid_value(location: &Provenance, type_name: &str, raw: &str) -> Self {
        Self::new(invalid_value_message(location, type_name, raw))
    }

    /// Same message as [`Misconfiguration::invalid_value`], keeping the parse failure as the source.
    pub fn invalid_value_caused_by(
        location: &Provenance,
        type_name: &str,
        raw: &str,
        cause: impl Into<BoxedCause>,
    ) -> Self {
        Self::with_cause(invalid_value_message(location, type_name, raw), cause)
    }

    /// Raised by `get` when no location in the search path defines the key.
    pub fn missing_property(key_name: &str, searched: &[Provenance]) -> Self {
        let mut message = format!("{key_name} property not found; searched:\n");
        for location in searched {
            message.push_str(" - ");
            message.push_str(&location.description());
            message.push('\n');
        }
        Self::new(message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

fn invalid_value_message(location: &Provenance, type_name: &str, raw: &str) -> String {
    format!(
        "{} {} - invalid {}: {}",
        location.source.description, location.name_in_location, type_name, raw
    )
}

pub type Result<T> = std::result::Result<T, Misconfiguration>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn provenance() -> Provenance {
        Provenance::new("db.port", Location::new("defaults"), "db.port")
    }

    #[test]
    fn test_invalid_value_message_shape() {
        let err = Misconfiguration::invalid_value(&provenance(), "i32", "80x");
        assert_eq!(err.to_string(), "defaults db.port - invalid i32: 80x");
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_invalid_value_keeps_cause() {
        let cause = "80x".parse::<i32>().unwrap_err();
        let err = Misconfiguration::invalid_value_caused_by(&provenance(), "i32", "80x", cause);
        assert!(StdError::source(&err).is_some());
        assert!(err.message().contains("80x"));
    }

    #[test]
    fn test_missing_property_lists_every_location() {
        let searched = vec![
            Provenance::new("x", Location::new("overrides"), "x"),
            Provenance::new("x", Location::new("environment variables"), "X"),
        ];
        let err = Misconfiguration::missing_property("x", &searched);
        assert_eq!(
            err.message(),
            "x property not found; searched:\n - x in overrides\n - X in environment variables\n"
        );
    }
}
