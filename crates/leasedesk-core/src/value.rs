use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar format used for date values on the wire and in text input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

///
/// Value
///
/// A single field value. Numbers stay as the text the user typed; `to_int`
/// gives the numeric reading when a rule or derivation needs one.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Flag(bool),
    Date(NaiveDate),
}

impl Value {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Parse an ISO `YYYY-MM-DD` date; blank input is `Empty`.
    pub fn parse_date(s: &str) -> Result<Self, chrono::ParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Empty);
        }

        NaiveDate::parse_from_str(s, DATE_FORMAT).map(Self::Date)
    }

    /// Text view of text-like values. `Empty` reads as the empty string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Empty => Some(""),
            Self::Text(s) => Some(s),
            Self::Flag(_) | Self::Date(_) => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// True when the value carries nothing once whitespace is trimmed.
    /// Flags are never blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Flag(_) | Self::Date(_) => false,
        }
    }

    /// Strict integer reading of a text value.
    /// Returns `None` for blank, non-numeric, or non-text values.
    #[must_use]
    pub fn parse_int(&self) -> Option<i64> {
        self.as_text().and_then(|s| s.trim().parse::<i64>().ok())
    }

    /// Lenient integer reading: anything that is not an integer counts as 0.
    #[must_use]
    pub fn to_int(&self) -> i64 {
        self.parse_int().unwrap_or(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_trims_whitespace() {
        assert!(Value::Empty.is_blank());
        assert!(Value::text("   ").is_blank());
        assert!(!Value::text(" a ").is_blank());
        assert!(!Value::Flag(false).is_blank());
    }

    #[test]
    fn to_int_treats_garbage_as_zero() {
        assert_eq!(Value::text("12").to_int(), 12);
        assert_eq!(Value::text(" 7 ").to_int(), 7);
        assert_eq!(Value::text("-3").to_int(), -3);
        assert_eq!(Value::text("abc").to_int(), 0);
        assert_eq!(Value::Empty.to_int(), 0);
        assert_eq!(Value::Flag(true).to_int(), 0);
    }

    #[test]
    fn dates_parse_and_render_iso() {
        let v = Value::parse_date("2025-03-01").expect("date should parse");
        assert_eq!(v.to_string(), "2025-03-01");
        assert_eq!(Value::parse_date("  ").expect("blank is empty"), Value::Empty);
        assert!(Value::parse_date("01/03/2025").is_err());
    }
}
