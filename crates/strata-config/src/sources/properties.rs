//! `.properties` and TOML files, read once into an in-memory source.

use std::path::Path;

use strata_core::{Location, Misconfiguration, Provenance, Result};
use tracing::{debug, info};

use crate::configuration::{Configuration, Listing, PropertyMap, RawProperty};
use crate::sources::map::ConfigurationMap;

/// Configuration read from `key=value` text or a TOML document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationProperties {
    inner: ConfigurationMap,
}

impl ConfigurationProperties {
    pub fn new(properties: PropertyMap, location: Location) -> Self {
        Self {
            inner: ConfigurationMap::from(properties).at(location),
        }
    }

    /// Parse `.properties` text.
    pub fn parse(text: &str, location: Location) -> Result<Self> {
        Ok(Self::new(parse_properties(text)?, location))
    }

    /// Load a `.properties` file; a missing file is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_existing(path)?;
        info!(path = %path.display(), "loading properties file");
        Self::parse(&text, Location::from_path(path))
    }

    /// Parse a TOML document, flattening nested tables into dotted names.
    pub fn parse_toml(text: &str, location: Location) -> Result<Self> {
        let table: toml::Table = toml::from_str(text).map_err(|e| {
            Misconfiguration::with_cause(format!("failed to parse {}", location.description), e)
        })?;
        let mut properties = PropertyMap::new();
        flatten_table(None, &table, &mut properties);
        debug!(location = %location, properties = properties.len(), "flattened toml document");
        Ok(Self::new(properties, location))
    }

    /// Load a TOML file; a missing file is an error.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_existing(path)?;
        info!(path = %path.display(), "loading toml file");
        Self::parse_toml(&text, Location::from_path(path))
    }

    pub fn location(&self) -> &Location {
        self.inner.location()
    }

    pub fn properties(&self) -> &PropertyMap {
        self.inner.properties()
    }
}

impl Configuration for ConfigurationProperties {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        self.inner.lookup(name)
    }

    fn contains_name(&self, name: &str) -> bool {
        self.inner.contains_name(name)
    }

    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        self.inner.search_path_of(name)
    }

    fn list(&self) -> Listing {
        self.inner.list()
    }
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Misconfiguration::new(format!("file {} does not exist", path.display())));
    }
    std::fs::read_to_string(path)
        .map_err(|e| Misconfiguration::with_cause(format!("failed to read {}", path.display()), e))
}

/// Parse `.properties` syntax into a map. Later definitions replace earlier ones.
pub fn parse_properties(text: &str) -> Result<PropertyMap> {
    let mut properties = PropertyMap::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let line = trim_start(line);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_owned();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(trim_start(next)),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        properties.insert(unescape(key)?, unescape(value)?);
    }

    Ok(properties)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn trim_start(s: &str) -> &str {
    s.trim_start_matches(is_blank)
}

/// An odd number of trailing backslashes joins the next line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            end = i;
            break;
        }
    }

    let key = &line[..end];
    let mut rest = trim_start(&line[end..]);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = trim_start(stripped);
    }
    (key, rest)
}

fn unescape(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| Misconfiguration::new(format!("malformed \\uxxxx encoding: \\u{hex}")))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn flatten_table(prefix: Option<&str>, table: &toml::Table, out: &mut PropertyMap) {
    for (name, value) in table {
        let full_name = match prefix {
            Some(p) => format!("{p}.{name}"),
            None => name.clone(),
        };
        flatten_value(full_name, value, out);
    }
}

fn flatten_value(name: String, value: &toml::Value, out: &mut PropertyMap) {
    match value {
        toml::Value::Table(table) => flatten_table(Some(&name), table, out),
        toml::Value::Array(items) if items.iter().all(is_scalar) => {
            let joined: Vec<String> = items.iter().filter_map(scalar_text).collect();
            out.insert(name, joined.join(", "));
        }
        toml::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(format!("{name}.{index}"), item, out);
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                out.insert(name, text);
            }
        }
    }
}

fn is_scalar(value: &toml::Value) -> bool {
    !matches!(value, toml::Value::Table(_) | toml::Value::Array(_))
}

fn scalar_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
