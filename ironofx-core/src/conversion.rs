/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Conversion between wire text and scalar values.
//!
//! OFX dates travel as `YYYYMMDDHHMMSS.XXX[gmt offset:tz name]`, booleans as
//! `Y`/`N`, and status codes as bare numbers. [`DefaultStringConversion`]
//! implements these rules; the [`StringConversion`] trait lets callers plug
//! in their own.

use crate::error::ConversionError;
use crate::status::StatusCode;
use crate::value::{ScalarKind, ScalarValue};
use arrayvec::ArrayString;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Converts scalar values to and from their wire text.
pub trait StringConversion: Send + Sync {
    /// Renders a value as wire text.
    fn to_wire(&self, value: &ScalarValue) -> String;

    /// Parses wire text as a value of the given kind.
    ///
    /// Empty text yields `Ok(None)`: "no value" is not an error.
    ///
    /// # Errors
    /// Returns `ConversionError` if the text is not a valid value of `kind`.
    fn from_wire(&self, kind: ScalarKind, text: &str)
    -> Result<Option<ScalarValue>, ConversionError>;
}

/// The conversion rules of the OFX specification.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStringConversion;

impl StringConversion for DefaultStringConversion {
    fn to_wire(&self, value: &ScalarValue) -> String {
        match value {
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Number(v) => v.to_string(),
            ScalarValue::Integer(v) => {
                let mut buf = itoa::Buffer::new();
                buf.format(*v).to_string()
            }
            ScalarValue::Decimal(v) => v.to_string(),
            ScalarValue::Boolean(v) => (if *v { "Y" } else { "N" }).to_string(),
            ScalarValue::Date(d) => format_date(d).to_string(),
            ScalarValue::StatusCode(c) => c.to_string(),
            ScalarValue::Enum(k) => (*k).to_string(),
        }
    }

    fn from_wire(
        &self,
        kind: ScalarKind,
        text: &str,
    ) -> Result<Option<ScalarValue>, ConversionError> {
        if text.is_empty() {
            return Ok(None);
        }

        let value = match kind {
            ScalarKind::Text => ScalarValue::Text(text.to_string()),
            ScalarKind::Number => ScalarValue::Number(
                text.trim()
                    .parse()
                    .map_err(|_| ConversionError::InvalidNumber(text.to_string()))?,
            ),
            ScalarKind::Integer => ScalarValue::Integer(
                text.trim()
                    .parse()
                    .map_err(|_| ConversionError::InvalidNumber(text.to_string()))?,
            ),
            ScalarKind::Decimal => ScalarValue::Decimal(
                text.trim()
                    .parse::<Decimal>()
                    .map_err(|_| ConversionError::InvalidNumber(text.to_string()))?,
            ),
            ScalarKind::Boolean => ScalarValue::Boolean(text.trim().eq_ignore_ascii_case("Y")),
            ScalarKind::Date => ScalarValue::Date(parse_date(text)?),
            ScalarKind::StatusCode => {
                let code: u32 = text
                    .trim()
                    .parse()
                    .map_err(|_| ConversionError::InvalidStatusCode(text.to_string()))?;
                ScalarValue::StatusCode(StatusCode::from_code(code))
            }
            ScalarKind::Enum(keys) => {
                let key = keys.find(text.trim()).ok_or_else(|| {
                    ConversionError::UnknownEnumKey {
                        key: text.to_string(),
                        expected: keys.name,
                    }
                })?;
                ScalarValue::Enum(key)
            }
        };

        Ok(Some(value))
    }
}

/// Formats an instant as an OFX date in UTC.
///
/// Format: `YYYYMMDDHHMMSS.XXX[0:GMT]`
#[must_use]
pub fn format_date(date: &DateTime<Utc>) -> ArrayString<32> {
    let mut buf = ArrayString::new();
    let _ = write!(buf, "{}[0:GMT]", date.format("%Y%m%d%H%M%S%.3f"));
    buf
}

/// Largest GMT offset accepted in a date, in hours.
const MAX_OFFSET_HOURS: f64 = 24.0;

/// Parses an OFX date.
///
/// Accepts `YYYYMMDD`, `YYYYMMDDHHMM`, `YYYYMMDDHHMMSS` and
/// `YYYYMMDDHHMMSS.XXX`, each optionally followed by a bracketed GMT offset
/// in hours (`[-5]`, `[-5:EST]`, `[5.5:IST]`). Missing time components
/// default to zero. The result is normalized to UTC.
///
/// # Errors
/// Returns `ConversionError::InvalidDate` if the text does not follow the format.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    let invalid = || ConversionError::InvalidDate(text.to_string());
    let trimmed = text.trim();

    let (stamp, offset_minutes) = match trimmed.find('[') {
        Some(bracket) => {
            let zone = trimmed[bracket + 1..].trim_end_matches(']');
            let hours = zone.split(':').next().unwrap_or_default().trim();
            let hours: f64 = hours.parse().map_err(|_| invalid())?;
            if !hours.is_finite() || hours.abs() > MAX_OFFSET_HOURS {
                return Err(invalid());
            }
            (&trimmed[..bracket], (hours * 60.0).round() as i64)
        }
        None => (trimmed, 0),
    };

    let (digits, fraction) = match stamp.split_once('.') {
        Some((digits, fraction)) => (digits, fraction),
        None => (stamp, ""),
    };

    if !matches!(digits.len(), 8 | 12 | 14) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let field = |range: std::ops::Range<usize>| -> Result<u32, ConversionError> {
        match digits.get(range) {
            Some(part) if !part.is_empty() => part.parse().map_err(|_| invalid()),
            _ => Ok(0),
        }
    };

    let year = digits[0..4].parse::<i32>().map_err(|_| invalid())?;
    let month = field(4..6)?;
    let day = field(6..8)?;
    let hour = field(8..10)?;
    let minute = field(10..12)?;
    let second = field(12..14)?;

    let millis = if fraction.is_empty() {
        0
    } else {
        let mut padded: ArrayString<3> = ArrayString::new();
        for c in fraction.chars().chain(std::iter::repeat('0')).take(3) {
            padded.push(c);
        }
        padded.parse::<u32>().map_err(|_| invalid())?
    };

    let local = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_milli_opt(hour, minute, second, millis))
        .ok_or_else(invalid)?;

    Duration::try_minutes(offset_minutes)
        .and_then(|offset| local.checked_sub_signed(offset))
        .map(|utc| utc.and_utc())
        .ok_or_else(invalid)
}
