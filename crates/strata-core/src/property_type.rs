//! Parsers that turn the raw string of a property into a typed value.
//!
//! A [`PropertyType`] is a named parse function. Every failure is reported as a
//! [`Misconfiguration`] naming the source, the name used there, the target type
//! and the offending raw text. The low-level error is kept as the source.

use std::borrow::Cow;
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::hash::Hash;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use url::Url;

use crate::error::{Misconfiguration, Result};
use crate::location::Provenance;

type ParseFn<T> = dyn Fn(&Provenance, &str) -> Result<T> + Send + Sync;

static DEFAULT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*").expect("default list separator is a valid pattern"));

/// A named `(location, raw) -> value` parser.
pub struct PropertyType<T> {
    type_name: Cow<'static, str>,
    parse: Arc<ParseFn<T>>,
}

impl<T> Clone for PropertyType<T> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<T> fmt::Debug for PropertyType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyType")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> PropertyType<T> {
    /// Build a type from a parse function that reports its own errors.
    pub fn new<F>(type_name: impl Into<Cow<'static, str>>, parse: F) -> Self
    where
        F: Fn(&Provenance, &str) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            parse: Arc::new(parse),
        }
    }

    /// Build a type from a plain string parser; its errors become [`Misconfiguration`]s.
    pub fn from_fn<E, F>(type_name: impl Into<Cow<'static, str>>, parse: F) -> Self
    where
        E: StdError + Send + Sync + 'static,
        F: Fn(&str) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let name = type_name.clone();
        Self::new(type_name, move |location, raw| {
            parse(raw).map_err(|e| Misconfiguration::invalid_value_caused_by(location, &name, raw, e))
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn parse(&self, location: &Provenance, raw: &str) -> Result<T> {
        (self.parse)(location, raw)
    }

    /// Apply `f` to every successfully parsed value.
    pub fn wrapped_as<U, F>(self, type_name: impl Into<Cow<'static, str>>, f: F) -> PropertyType<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.parse;
        PropertyType::new(type_name, move |location, raw| inner(location, raw).map(&f))
    }

    /// Like [`PropertyType::wrapped_as`] for a fallible `f`; its failures are
    /// reported under the wrapper's type name.
    pub fn try_wrapped_as<U, E, F>(self, type_name: impl Into<Cow<'static, str>>, f: F) -> PropertyType<U>
    where
        U: 'static,
        E: StdError + Send + Sync + 'static,
        F: Fn(T) -> std::result::Result<U, E> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let name = type_name.clone();
        let inner = self.parse;
        PropertyType::new(type_name, move |location, raw| {
            let value = inner(location, raw)?;
            f(value).map_err(|e| Misconfiguration::invalid_value_caused_by(location, &name, raw, e))
        })
    }

    /// Additionally reject values outside `range` (bounds inclusive).
    pub fn within(self, range: RangeInclusive<T>) -> Self
    where
        T: PartialOrd + fmt::Display + Send + Sync,
    {
        let type_name = format!("{} within {}..={}", self.type_name, range.start(), range.end());
        let name = type_name.clone();
        let inner = self.parse;
        PropertyType::new(type_name, move |location, raw| {
            let value = inner(location, raw)?;
            if range.contains(&value) {
                Ok(value)
            } else {
                Err(Misconfiguration::invalid_value(location, &name, raw))
            }
        })
    }
}

/// A type parsed with the value's [`FromStr`] implementation.
pub fn from_str_type<T>(type_name: impl Into<Cow<'static, str>>) -> PropertyType<T>
where
    T: FromStr + 'static,
    T::Err: StdError + Send + Sync + 'static,
{
    PropertyType::from_fn(type_name, |raw: &str| raw.parse::<T>())
}

/// The identity parser.
pub fn string_type() -> PropertyType<String> {
    PropertyType::new("String", |_, raw| Ok(raw.to_owned()))
}

pub fn int_type() -> PropertyType<i32> {
    from_str_type("i32")
}

pub fn long_type() -> PropertyType<i64> {
    from_str_type("i64")
}

pub fn u16_type() -> PropertyType<u16> {
    from_str_type("u16")
}

pub fn u32_type() -> PropertyType<u32> {
    from_str_type("u32")
}

pub fn u64_type() -> PropertyType<u64> {
    from_str_type("u64")
}

pub fn float_type() -> PropertyType<f32> {
    from_str_type("f32")
}

pub fn double_type() -> PropertyType<f64> {
    from_str_type("f64")
}

/// `true` in any letter case; every other string, the empty one included, is `false`.
pub fn boolean_type() -> PropertyType<bool> {
    PropertyType::new("bool", |_, raw| Ok(raw.eq_ignore_ascii_case("true")))
}

/// An absolute URI.
pub fn uri_type() -> PropertyType<Url> {
    PropertyType::from_fn("Url", Url::parse)
}

/// A closed set of literals, each mapped to a value.
///
/// Any other input fails, and the message lists the allowed literals.
pub fn enum_type<T, S, I>(type_name: impl Into<Cow<'static, str>>, allowed: I) -> PropertyType<T>
where
    T: Clone + Send + Sync + 'static,
    S: Into<String>,
    I: IntoIterator<Item = (S, T)>,
{
    let allowed: Vec<(String, T)> = allowed.into_iter().map(|(s, v)| (s.into(), v)).collect();
    let type_name = type_name.into();
    let name = type_name.clone();
    PropertyType::new(type_name, move |location, raw| {
        allowed
            .iter()
            .find(|(literal, _)| literal == raw)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                let literals: Vec<&str> = allowed.iter().map(|(l, _)| l.as_str()).collect();
                let base = Misconfiguration::invalid_value(location, &name, raw);
                Misconfiguration::new(format!("{}; must be one of: {}", base, literals.join(", ")))
            })
    })
}

/// Elements separated by a comma and optional whitespace, in order.
pub fn list_type<T: 'static>(element: PropertyType<T>) -> PropertyType<Vec<T>> {
    list_type_separated_by(element, DEFAULT_SEPARATOR.clone())
}

pub fn list_type_separated_by<T: 'static>(element: PropertyType<T>, separator: Regex) -> PropertyType<Vec<T>> {
    let type_name = format!("List<{}>", element.type_name);
    PropertyType::new(type_name, move |location, raw| {
        separator
            .split(raw)
            .map(|piece| element.parse(location, piece))
            .collect()
    })
}

/// Like [`list_type`], discarding duplicates.
pub fn set_type<T>(element: PropertyType<T>) -> PropertyType<HashSet<T>>
where
    T: Eq + Hash + 'static,
{
    set_type_separated_by(element, DEFAULT_SEPARATOR.clone())
}

pub fn set_type_separated_by<T>(element: PropertyType<T>, separator: Regex) -> PropertyType<HashSet<T>>
where
    T: Eq + Hash + 'static,
{
    let type_name = format!("Set<{}>", element.type_name);
    PropertyType::new(type_name, move |location, raw| {
        separator
            .split(raw)
            .map(|piece| element.parse(location, piece))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn location() -> Provenance {
        Provenance::new("passed-property-key", Location::new("source-location"), "property-key-in-source")
    }

    fn assert_parses<T: PartialEq + fmt::Debug + 'static>(ty: &PropertyType<T>, cases: &[(&str, T)]) {
        for (raw, expected) in cases {
            let actual = ty.parse(&location(), raw).unwrap();
            assert_eq!(&actual, expected, "parsing {raw:?}");
        }
    }

    fn assert_misconfiguration<T: fmt::Debug + 'static>(ty: &PropertyType<T>, bad: &[&str]) {
        for raw in bad {
            let err = ty.parse(&location(), raw).unwrap_err();
            let message = err.to_string();
            assert!(message.contains(*raw), "{message}");
            assert!(message.contains(ty.type_name()), "{message}");
            assert!(message.contains("property-key-in-source"), "{message}");
            assert!(message.contains("source-location"), "{message}");
        }
    }

    #[test]
    fn test_ints() {
        assert_parses(&int_type(), &[("1234", 1234), ("0", 0), ("-123", -123)]);
        assert_misconfiguration(&int_type(), &["zzz", "123x", ""]);
    }

    #[test]
    fn test_int_error_message_format() {
        let err = int_type().parse(&location(), "123x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "source-location property-key-in-source - invalid i32: 123x"
        );
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_longs() {
        assert_parses(&long_type(), &[("1234", 1234i64), ("0", 0), ("-123", -123)]);
        assert_misconfiguration(&long_type(), &["zzz", "123x", ""]);
    }

    #[test]
    fn test_doubles() {
        assert_parses(
            &double_type(),
            &[("1234", 1234.0), ("12.4", 12.4), ("0", 0.0), ("-10", -10.0), ("-12.25", -12.25)],
        );
        assert_misconfiguration(&double_type(), &["zzz", "123x", ""]);
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        assert_parses(&u16_type(), &[("8080", 8080u16)]);
        assert_misconfiguration(&u16_type(), &["-1", "70000"]);
    }

    #[test]
    fn test_booleans_never_fail() {
        assert_parses(
            &boolean_type(),
            &[
                ("true", true),
                ("TRUE", true),
                ("True", true),
                ("false", false),
                ("False", false),
                ("no", false),
                ("yes", false),
                ("zzz", false),
                ("123x", false),
                ("", false),
            ],
        );
    }

    #[test]
    fn test_uris() {
        let parsed = uri_type().parse(&location(), "http://example.com").unwrap();
        assert_eq!(parsed, Url::parse("http://example.com").unwrap());
        assert_misconfiguration(&uri_type(), &[":/{}!"]);
    }

    #[test]
    fn test_enum_literals() {
        let ty = enum_type("Level", [("foo", 1), ("bar", 2), ("baz", 3)]);
        assert_parses(&ty, &[("foo", 1), ("bar", 2), ("baz", 3)]);
        assert_misconfiguration(&ty, &["xxx", "FOO"]);
    }

    #[test]
    fn test_enum_failure_lists_allowed_literals() {
        #[derive(Debug, Clone, PartialEq)]
        enum Mode {
            Fast,
            Safe,
        }
        let ty = enum_type("Mode", [("fast", Mode::Fast), ("safe", Mode::Safe)]);
        assert_eq!(ty.parse(&location(), "safe").unwrap(), Mode::Safe);
        let message = ty.parse(&location(), "slow").unwrap_err().to_string();
        assert!(message.ends_with("must be one of: fast, safe"), "{message}");
    }

    #[test]
    fn test_lists() {
        assert_parses(
            &list_type(int_type()),
            &[("1,2,3", vec![1, 2, 3]), ("2, 3, 4", vec![2, 3, 4]), ("4,  5,6", vec![4, 5, 6])],
        );
    }

    #[test]
    fn test_list_with_custom_separator() {
        let ty = list_type_separated_by(int_type(), Regex::new(":").unwrap());
        assert_parses(&ty, &[("1:2:3", vec![1, 2, 3])]);
    }

    #[test]
    fn test_list_element_failure_names_element_type() {
        let err = list_type(int_type()).parse(&location(), "1,x,3").unwrap_err();
        assert!(err.to_string().ends_with("invalid i32: x"));
    }

    #[test]
    fn test_empty_list_is_one_empty_element() {
        let ty = list_type(string_type());
        assert_eq!(ty.parse(&location(), "").unwrap(), vec![String::new()]);
    }

    #[test]
    fn test_sets_discard_duplicates() {
        let ty = set_type(int_type());
        assert_parses(
            &ty,
            &[
                ("1,3,2,3", HashSet::from([1, 2, 3])),
                ("2, 4, 3, 4", HashSet::from([2, 3, 4])),
                ("6, 4,  5,6", HashSet::from([4, 5, 6])),
            ],
        );
        let colon = set_type_separated_by(int_type(), Regex::new(":").unwrap());
        assert_parses(&colon, &[("1:2:3", HashSet::from([1, 2, 3]))]);
    }

    #[test]
    fn test_wrapped_as() {
        #[derive(Debug, PartialEq)]
        struct Example(i32);
        let ty = int_type().wrapped_as("Example", Example);
        assert_eq!(ty.type_name(), "Example");
        assert_eq!(ty.parse(&location(), "1").unwrap(), Example(1));
        // the underlying parser still reports its own type
        assert!(ty.parse(&location(), "one").unwrap_err().to_string().contains("i32"));
    }

    #[test]
    fn test_try_wrapped_as_reports_wrapper_type() {
        let ty = string_type().try_wrapped_as("SocketAddr", |s| s.parse::<std::net::SocketAddr>());
        assert!(ty.parse(&location(), "127.0.0.1:80").is_ok());
        let err = ty.parse(&location(), "localhost").unwrap_err();
        assert_eq!(
            err.to_string(),
            "source-location property-key-in-source - invalid SocketAddr: localhost"
        );
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_within_inclusive_bounds() {
        let ty = int_type().within(1..=10);
        assert_parses(&ty, &[("1", 1), ("10", 10), ("5", 5)]);
        let err = ty.parse(&location(), "11").unwrap_err();
        assert_eq!(
            err.to_string(),
            "source-location property-key-in-source - invalid i32 within 1..=10: 11"
        );
        assert_misconfiguration(&ty, &["0", "-3"]);
    }
}
