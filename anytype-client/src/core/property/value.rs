//! Typed property values and their building blocks.

use super::PropertyFormat;
use crate::{Tag, ValidationError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::{Number, Value};
use std::fmt;

/// One entry of a multi-select value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRef {
    /// Identifier of an existing tag; emitted as-is.
    Id(String),
    /// Display name; resolved to an id (creating the tag if needed) on serialization.
    Name(String),
}

impl TagRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Id(s) | Self::Name(s) => s,
        }
    }
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        Self::Id(tag.id.clone())
    }
}

impl From<&str> for TagRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for TagRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// What a caller may assign to a multi-select: one name, or a list.
///
/// A single name is accepted for convenience and widened to a one-element
/// list with a [`Diagnostic::MultiSelectCoerced`](crate::Diagnostic::MultiSelectCoerced).
#[derive(Debug, Clone, PartialEq)]
pub enum MultiSelectInput {
    Single(String),
    List(Vec<TagRef>),
}

impl From<&str> for MultiSelectInput {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for MultiSelectInput {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<TagRef>> for MultiSelectInput {
    fn from(v: Vec<TagRef>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<String>> for MultiSelectInput {
    fn from(v: Vec<String>) -> Self {
        Self::List(v.into_iter().map(TagRef::Name).collect())
    }
}

impl From<Vec<&str>> for MultiSelectInput {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(TagRef::from).collect())
    }
}

impl From<&[Tag]> for MultiSelectInput {
    fn from(tags: &[Tag]) -> Self {
        Self::List(tags.iter().map(TagRef::from).collect())
    }
}

/// A date property value: either a calendar date or an instant with offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl DateValue {
    /// Parses the date spellings the API and its users produce.
    ///
    /// Accepts `YYYY-MM-DD`, RFC 3339 date-times, naive `YYYY-MM-DDTHH:MM:SS`
    /// (taken as UTC) and `DD/MM/YYYY`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::DateTime(dt));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Some(Self::DateTime(naive.and_utc().fixed_offset()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
            .ok()
            .map(Self::Date)
    }

    /// ISO-8601 rendering used on the wire.
    pub fn to_iso8601(&self) -> String {
        match self {
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<FixedOffset>> for DateValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// A property value, one case per format.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(Number),
    Select(String),
    MultiSelect(Vec<TagRef>),
    Date(Option<DateValue>),
    Files(Vec<String>),
    Checkbox(bool),
    Url(String),
    Email(String),
    Phone(String),
    Objects(Vec<String>),
}

impl PropertyValue {
    /// The format this value belongs to.
    pub fn format(&self) -> PropertyFormat {
        match self {
            Self::Text(_) => PropertyFormat::Text,
            Self::Number(_) => PropertyFormat::Number,
            Self::Select(_) => PropertyFormat::Select,
            Self::MultiSelect(_) => PropertyFormat::MultiSelect,
            Self::Date(_) => PropertyFormat::Date,
            Self::Files(_) => PropertyFormat::Files,
            Self::Checkbox(_) => PropertyFormat::Checkbox,
            Self::Url(_) => PropertyFormat::Url,
            Self::Email(_) => PropertyFormat::Email,
            Self::Phone(_) => PropertyFormat::Phone,
            Self::Objects(_) => PropertyFormat::Objects,
        }
    }

    /// Builds a number value from a float.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongType`] for NaN or infinite input, which
    /// JSON cannot represent.
    pub fn number(n: f64) -> std::result::Result<Self, ValidationError> {
        Number::from_f64(n)
            .map(Self::Number)
            .ok_or_else(|| ValidationError::WrongType {
                field: "number",
                expected: "a finite number",
                found: n.to_string(),
            })
    }
}

/// Short description of a JSON value's shape, for validation messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
