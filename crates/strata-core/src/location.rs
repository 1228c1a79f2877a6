use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use url::Url;

/// Where a set of configuration properties lives.
///
/// A location may lack a `uri` when the data is compiled into the program or
/// comes from ephemeral state such as the process environment or the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub description: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<Url>,
}

impl Location {
    /// Values compiled into the program, such as an in-memory map of defaults.
    pub const INTRINSIC: Location = Location {
        description: Cow::Borrowed("intrinsic"),
        uri: None,
    };

    pub fn new(description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            description: description.into(),
            uri: None,
        }
    }

    pub fn with_uri(description: impl Into<Cow<'static, str>>, uri: Url) -> Self {
        Self {
            description: description.into(),
            uri: Some(uri),
        }
    }

    /// Described by its absolute path, with a `file://` URI when one can be formed.
    pub fn from_path(path: &Path) -> Self {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self {
            description: Cow::Owned(absolute.display().to_string()),
            uri: Url::from_file_path(&absolute).ok(),
        }
    }

    pub fn from_uri(uri: Url) -> Self {
        Self {
            description: Cow::Owned(uri.to_string()),
            uri: Some(uri),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Exactly where a property was found, or would be looked for.
///
/// `key` is the name of the requested key; `name_in_location` is the literal
/// name used inside `source` (e.g. `DB_PASSWORD`, `--db-password`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Provenance {
    pub key: String,
    pub source: Location,
    pub name_in_location: String,
}

impl Provenance {
    pub fn new(key: impl Into<String>, source: Location, name_in_location: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source,
            name_in_location: name_in_location.into(),
        }
    }

    /// `"<name-in-location> in <source description>"`
    pub fn description(&self) -> String {
        format!("{} in {}", self.name_in_location, self.source.description)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic_location() {
        assert_eq!(Location::INTRINSIC.description, "intrinsic");
        assert!(Location::INTRINSIC.uri.is_none());
    }

    #[test]
    fn test_location_from_uri_uses_uri_as_description() {
        let uri = Url::parse("https://config.example.com/app.properties").unwrap();
        let location = Location::from_uri(uri.clone());
        assert_eq!(location.description, uri.as_str());
        assert_eq!(location.uri, Some(uri));
    }

    #[test]
    fn test_location_from_relative_path_is_absolute() {
        let location = Location::from_path(Path::new("app.properties"));
        assert!(Path::new(location.description.as_ref()).is_absolute());
        assert_eq!(location.uri.as_ref().map(|u| u.scheme()), Some("file"));
    }

    #[test]
    fn test_provenance_description() {
        let p = Provenance::new("db.password", Location::new("environment variables"), "DB_PASSWORD");
        assert_eq!(p.description(), "DB_PASSWORD in environment variables");
        assert_eq!(p.to_string(), p.description());
    }
}
