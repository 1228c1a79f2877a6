//! ISO-8601 style temporal property types.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use thiserror::Error;

use crate::property_type::{PropertyType, from_str_type};

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([-+]?)P(?:([-+]?[0-9]+)D)?(T(?:([-+]?[0-9]+)H)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)(?:[.,]([0-9]{0,9}))?S)?)?$",
    )
    .expect("duration pattern is valid")
});

static PERIOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([-+]?)P(?:([-+]?[0-9]+)Y)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)W)?(?:([-+]?[0-9]+)D)?$")
        .expect("period pattern is valid")
});

const NANOS_PER_SECOND: i128 = 1_000_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("text '{text}' could not be parsed as {expected}")]
pub struct TemporalParseError {
    text: String,
    expected: &'static str,
}

impl TemporalParseError {
    fn new(text: &str, expected: &'static str) -> Self {
        Self {
            text: text.to_owned(),
            expected,
        }
    }
}

/// Parse `PnDTnHnMn.nS`, e.g. `PT15M`, `P2DT3H4M`, `-PT6H3M`, `PT-0.5S`.
pub fn parse_iso_duration(text: &str) -> Result<TimeDelta, TemporalParseError> {
    let err = || TemporalParseError::new(text, "an ISO-8601 duration");
    let caps = DURATION_PATTERN.captures(text).ok_or_else(err)?;

    let day = caps.get(2);
    let time_section = caps.get(3);
    let (hour, minute, second) = (caps.get(4), caps.get(5), caps.get(6));

    if day.is_none() && hour.is_none() && minute.is_none() && second.is_none() {
        return Err(err());
    }
    if time_section.is_some_and(|t| t.as_str().len() == 1) {
        return Err(err());
    }

    let number = |m: Option<regex::Match<'_>>| -> Result<i128, TemporalParseError> {
        m.map_or(Ok(0), |m| m.as_str().parse::<i128>().map_err(|_| err()))
    };

    let seconds = number(second)?;
    let mut nanos = match caps.get(7) {
        Some(f) if !f.as_str().is_empty() => {
            let digits = f.as_str();
            let scale = 10i128.pow(9 - digits.len() as u32);
            digits.parse::<i128>().map_err(|_| err())? * scale
        }
        _ => 0,
    };
    if second.is_some_and(|s| s.as_str().starts_with('-')) {
        nanos = -nanos;
    }

    let scaled = |m: Option<regex::Match<'_>>, factor: i128| -> Result<i128, TemporalParseError> {
        number(m)?.checked_mul(factor).ok_or_else(err)
    };
    let mut total = [scaled(day, 86_400)?, scaled(hour, 3_600)?, scaled(minute, 60)?, seconds]
        .into_iter()
        .try_fold(0i128, i128::checked_add)
        .and_then(|secs| secs.checked_mul(NANOS_PER_SECOND))
        .and_then(|ns| ns.checked_add(nanos))
        .ok_or_else(err)?;
    if &caps[1] == "-" {
        total = -total;
    }

    let secs = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).map_err(|_| err())?;
    let subsec = total.rem_euclid(NANOS_PER_SECOND) as u32;
    TimeDelta::new(secs, subsec).ok_or_else(err)
}

/// A date-based amount of time: years, months and days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Period {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl Period {
    pub fn new(years: i32, months: i32, days: i32) -> Self {
        Self { years, months, days }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

impl FromStr for Period {
    type Err = TemporalParseError;

    /// Parse `PnYnMnWnD`; weeks are folded into days.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let err = || TemporalParseError::new(text, "an ISO-8601 period");
        let caps = PERIOD_PATTERN.captures(text).ok_or_else(err)?;
        if (2..=5).all(|i| caps.get(i).is_none()) {
            return Err(err());
        }

        let field = |i: usize| -> Result<i32, TemporalParseError> {
            caps.get(i).map_or(Ok(0), |m| m.as_str().parse::<i32>().map_err(|_| err()))
        };
        let sign = if &caps[1] == "-" { -1 } else { 1 };
        let weeks_as_days = field(4)?.checked_mul(7).ok_or_else(err)?;
        let days = field(5)?.checked_add(weeks_as_days).ok_or_else(err)?;

        Ok(Period {
            years: field(2)?.checked_mul(sign).ok_or_else(err)?,
            months: field(3)?.checked_mul(sign).ok_or_else(err)?,
            days: days.checked_mul(sign).ok_or_else(err)?,
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

pub fn duration_type() -> PropertyType<TimeDelta> {
    PropertyType::from_fn("Duration", parse_iso_duration)
}

pub fn period_type() -> PropertyType<Period> {
    from_str_type("Period")
}

/// `HH:MM` or `HH:MM:SS[.fraction]`.
pub fn local_time_type() -> PropertyType<NaiveTime> {
    PropertyType::from_fn("NaiveTime", |raw: &str| {
        NaiveTime::parse_from_str(raw, "%H:%M:%S%.f").or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
    })
}

/// `YYYY-MM-DD`.
pub fn local_date_type() -> PropertyType<NaiveDate> {
    PropertyType::from_fn("NaiveDate", |raw: &str| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
}

/// `YYYY-MM-DDTHH:MM[:SS[.fraction]]`.
pub fn local_date_time_type() -> PropertyType<NaiveDateTime> {
    PropertyType::from_fn("NaiveDateTime", |raw: &str| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
    })
}

/// An RFC 3339 timestamp, normalised to UTC.
pub fn instant_type() -> PropertyType<DateTime<Utc>> {
    PropertyType::from_fn("Instant", |raw: &str| {
        DateTime::parse_from_rfc3339(raw).map(|t| t.with_timezone(&Utc))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Location, Provenance};
    use chrono::{Datelike, TimeZone, Timelike};

    fn location() -> Provenance {
        Provenance::new("timeout", Location::new("source-location"), "property-key-in-source")
    }

    #[test]
    fn test_durations() {
        assert_eq!(parse_iso_duration("PT15M").unwrap(), TimeDelta::minutes(15));
        assert_eq!(parse_iso_duration("PT20.345S").unwrap(), TimeDelta::milliseconds(20_345));
        assert_eq!(parse_iso_duration("P2D").unwrap(), TimeDelta::days(2));
        assert_eq!(
            parse_iso_duration("P2DT3H4M").unwrap(),
            TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::minutes(4)
        );
        assert_eq!(
            parse_iso_duration("-PT6H3M").unwrap(),
            -(TimeDelta::hours(6) + TimeDelta::minutes(3))
        );
        assert_eq!(parse_iso_duration("PT-0.5S").unwrap(), TimeDelta::milliseconds(-500));
        assert_eq!(parse_iso_duration("pt1h").unwrap(), TimeDelta::hours(1));
    }

    #[test]
    fn test_bad_durations() {
        for bad in ["", "P", "PT", "15M", "PT15", "P1Y", "PT1H2X", "P1DT"] {
            assert!(parse_iso_duration(bad).is_err(), "{bad:?} should be rejected");
        }
        let err = duration_type().parse(&location(), "15 minutes").unwrap_err();
        assert_eq!(
            err.to_string(),
            "source-location property-key-in-source - invalid Duration: 15 minutes"
        );
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        for huge in [
            "P99999999999999999999999999999999999D",
            "PT99999999999999999999999999999999999H",
            "PT99999999999999999999999999999999999S",
            "P9999999999999999999D",
        ] {
            assert!(parse_iso_duration(huge).is_err(), "{huge:?} should be rejected");
            let err = duration_type().parse(&location(), huge).unwrap_err();
            assert!(err.to_string().ends_with(&format!("invalid Duration: {huge}")));
        }
    }

    #[test]
    fn test_periods() {
        assert_eq!("P1Y2M3D".parse::<Period>().unwrap(), Period::new(1, 2, 3));
        assert_eq!("P2W".parse::<Period>().unwrap(), Period::new(0, 0, 14));
        assert_eq!("-P1M".parse::<Period>().unwrap(), Period::new(0, -1, 0));
        assert_eq!("P1Y2M3D".parse::<Period>().unwrap().to_string(), "P1Y2M3D");
        assert_eq!(Period::default().to_string(), "P0D");
        for bad in ["P", "1Y", "P1H", "PT1M"] {
            assert!(bad.parse::<Period>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_local_times() {
        let t = local_time_type().parse(&location(), "10:15").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (10, 15, 0));
        let t = local_time_type().parse(&location(), "10:15:30.5").unwrap();
        assert_eq!((t.second(), t.nanosecond()), (30, 500_000_000));
        assert!(local_time_type().parse(&location(), "25:00").is_err());
    }

    #[test]
    fn test_local_dates() {
        let d = local_date_type().parse(&location(), "2015-09-05").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2015, 9, 5));
        let err = local_date_type().parse(&location(), "2015-13-05").unwrap_err();
        assert!(err.to_string().contains("invalid NaiveDate: 2015-13-05"));
    }

    #[test]
    fn test_local_date_times() {
        let dt = local_date_time_type().parse(&location(), "2007-12-03T10:15:30").unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.second()), (3, 10, 30));
        assert!(local_date_time_type().parse(&location(), "2007-12-03T10:15").is_ok());
        assert!(local_date_time_type().parse(&location(), "2007-12-03").is_err());
    }

    #[test]
    fn test_instants() {
        let t = instant_type().parse(&location(), "2007-12-03T10:15:30Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2007, 12, 3, 10, 15, 30).unwrap());
        let shifted = instant_type().parse(&location(), "2007-12-03T11:15:30+01:00").unwrap();
        assert_eq!(shifted, t);
        assert!(instant_type().parse(&location(), "yesterday").is_err());
    }
}
