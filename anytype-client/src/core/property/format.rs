//! The closed registry of property formats and their coercion rules.

use super::value::{describe, DateValue, PropertyValue, TagRef};
use crate::{Diagnostic, Diagnostics, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Every value format the API recognizes. No others exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyFormat {
    Text,
    Number,
    Select,
    MultiSelect,
    Date,
    Files,
    Checkbox,
    Url,
    Email,
    Phone,
    Objects,
}

impl PropertyFormat {
    pub const ALL: [PropertyFormat; 11] = [
        Self::Text,
        Self::Number,
        Self::Select,
        Self::MultiSelect,
        Self::Date,
        Self::Files,
        Self::Checkbox,
        Self::Url,
        Self::Email,
        Self::Phone,
        Self::Objects,
    ];

    /// The wire tag, which is also the payload key for values of this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Date => "date",
            Self::Files => "files",
            Self::Checkbox => "checkbox",
            Self::Url => "url",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Objects => "objects",
        }
    }

    /// The value a fresh property of this format holds.
    pub fn zero_value(self) -> PropertyValue {
        match self {
            Self::Text => PropertyValue::Text(String::new()),
            Self::Number => PropertyValue::Number(Number::from(0)),
            Self::Select => PropertyValue::Select(String::new()),
            Self::MultiSelect => PropertyValue::MultiSelect(Vec::new()),
            Self::Date => PropertyValue::Date(None),
            Self::Files => PropertyValue::Files(Vec::new()),
            Self::Checkbox => PropertyValue::Checkbox(false),
            Self::Url => PropertyValue::Url(String::new()),
            Self::Email => PropertyValue::Email(String::new()),
            Self::Phone => PropertyValue::Phone(String::new()),
            Self::Objects => PropertyValue::Objects(Vec::new()),
        }
    }

    /// Checks a dynamic value's shape against this format and converts it.
    ///
    /// `key` only labels diagnostics. A bare string given to `multi_select`
    /// is widened to a one-element list and reported through `diags`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongType`] when the shape does not fit.
    pub fn coerce(
        self,
        value: Value,
        key: &str,
        diags: &mut Diagnostics,
    ) -> std::result::Result<PropertyValue, ValidationError> {
        let field = self.as_str();
        let wrong = |expected: &'static str, found: &Value| ValidationError::WrongType {
            field,
            expected,
            found: describe(found),
        };

        match self {
            Self::Checkbox => match value {
                Value::Bool(b) => Ok(PropertyValue::Checkbox(b)),
                other => Err(wrong("a boolean", &other)),
            },
            Self::Number => match value {
                Value::Number(n) => Ok(PropertyValue::Number(n)),
                other => Err(wrong("an integer or float", &other)),
            },
            Self::Text | Self::Select | Self::Url | Self::Email | Self::Phone => match value {
                Value::String(s) => Ok(match self {
                    Self::Text => PropertyValue::Text(s),
                    Self::Select => PropertyValue::Select(s),
                    Self::Url => PropertyValue::Url(s),
                    Self::Email => PropertyValue::Email(s),
                    _ => PropertyValue::Phone(s),
                }),
                other => Err(wrong("a string", &other)),
            },
            Self::Date => match value {
                Value::Null => Ok(PropertyValue::Date(None)),
                Value::String(s) => DateValue::parse(&s)
                    .map(|d| PropertyValue::Date(Some(d)))
                    .ok_or(ValidationError::WrongType {
                        field,
                        expected: "an ISO-8601 date",
                        found: format!("'{s}'"),
                    }),
                other => Err(wrong("an ISO-8601 date string or null", &other)),
            },
            Self::MultiSelect => match value {
                Value::String(s) => {
                    diags.push(Diagnostic::MultiSelectCoerced {
                        key: key.to_string(),
                        value: s.clone(),
                    });
                    Ok(PropertyValue::MultiSelect(vec![TagRef::Name(s)]))
                }
                Value::Array(items) => string_list(items, field, "a list of strings")
                    .map(|names| PropertyValue::MultiSelect(names.into_iter().map(TagRef::Name).collect())),
                other => Err(wrong("a list of strings", &other)),
            },
            Self::Files => match value {
                Value::Array(items) => string_list(items, field, "a list of file ids").map(PropertyValue::Files),
                other => Err(wrong("a list of file ids", &other)),
            },
            Self::Objects => match value {
                Value::Array(items) => {
                    string_list(items, field, "a list of object ids").map(PropertyValue::Objects)
                }
                other => Err(wrong("a list of object ids", &other)),
            },
        }
    }
}

fn string_list(
    items: Vec<Value>,
    field: &'static str,
    expected: &'static str,
) -> std::result::Result<Vec<String>, ValidationError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(ValidationError::WrongType {
                field,
                expected,
                found: format!("a list containing {}", describe(&other)),
            }),
        })
        .collect()
}

impl fmt::Display for PropertyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_str_accepts_exactly_the_registry() {
        for format in PropertyFormat::ALL {
            assert_eq!(format.as_str().parse::<PropertyFormat>().unwrap(), format);
        }
        assert_eq!(
            "formula".parse::<PropertyFormat>(),
            Err(ValidationError::InvalidFormat("formula".to_string()))
        );
        assert!("Text".parse::<PropertyFormat>().is_err());
        assert!("".parse::<PropertyFormat>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_tags() {
        assert_eq!(serde_json::to_value(PropertyFormat::MultiSelect).unwrap(), json!("multi_select"));
        let parsed: PropertyFormat = serde_json::from_value(json!("checkbox")).unwrap();
        assert_eq!(parsed, PropertyFormat::Checkbox);
    }

    #[test]
    fn test_zero_values_match_their_format() {
        for format in PropertyFormat::ALL {
            assert_eq!(format.zero_value().format(), format);
        }
    }

    #[test]
    fn test_coerce_rejects_string_for_checkbox() {
        let mut diags = Diagnostics::new();
        let err = PropertyFormat::Checkbox
            .coerce(json!("true"), "done", &mut diags)
            .unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { field: "checkbox", .. }));
        assert_eq!(
            PropertyFormat::Checkbox.coerce(json!(true), "done", &mut diags).unwrap(),
            PropertyValue::Checkbox(true)
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_coerce_widens_single_multi_select_name() {
        let mut diags = Diagnostics::new();
        let value = PropertyFormat::MultiSelect
            .coerce(json!("Fiction"), "genre", &mut diags)
            .unwrap();
        assert_eq!(value, PropertyValue::MultiSelect(vec![TagRef::Name("Fiction".to_string())]));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_coerce_rejects_mixed_multi_select_list() {
        let mut diags = Diagnostics::new();
        assert!(PropertyFormat::MultiSelect
            .coerce(json!(["a", 1]), "genre", &mut diags)
            .is_err());
        assert!(PropertyFormat::MultiSelect
            .coerce(json!(3), "genre", &mut diags)
            .is_err());
    }

    #[test]
    fn test_coerce_date_accepts_null_and_rejects_garbage() {
        let mut diags = Diagnostics::new();
        assert_eq!(
            PropertyFormat::Date.coerce(Value::Null, "due", &mut diags).unwrap(),
            PropertyValue::Date(None)
        );
        assert!(PropertyFormat::Date.coerce(json!("soon"), "due", &mut diags).is_err());
        assert!(PropertyFormat::Date.coerce(json!(20250327), "due", &mut diags).is_err());
    }

    #[test]
    fn test_coerce_keeps_integer_numbers_integral() {
        let mut diags = Diagnostics::new();
        let value = PropertyFormat::Number.coerce(json!(42), "n", &mut diags).unwrap();
        assert_eq!(value, PropertyValue::Number(Number::from(42)));
    }
}
