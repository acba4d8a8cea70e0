//! Object and type icons.

use crate::{TagColor, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An icon as the API represents it, tagged by `format`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    File { file: String },
    Icon { name: String, color: TagColor },
}

impl Icon {
    pub fn emoji(emoji: impl Into<String>) -> Self {
        Self::Emoji { emoji: emoji.into() }
    }

    pub fn file(file_id: impl Into<String>) -> Self {
        Self::File { file: file_id.into() }
    }

    pub fn named(name: impl Into<String>, color: TagColor) -> Self {
        Self::Icon {
            name: name.into(),
            color,
        }
    }

    /// Parses an icon from a raw JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIcon`] if `value` is not an icon object.
    pub fn from_json(value: Value) -> std::result::Result<Self, ValidationError> {
        let icon: Icon =
            serde_json::from_value(value).map_err(|e| ValidationError::InvalidIcon(e.to_string()))?;
        icon.validate()?;
        Ok(icon)
    }

    /// Checks that the icon carries a usable value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIcon`] for an empty emoji, file id or icon name.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let (field, value) = match self {
            Self::Emoji { emoji } => ("emoji", emoji),
            Self::File { file } => ("file", file),
            Self::Icon { name, .. } => ("name", name),
        };
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidIcon(format!("{field} must not be empty")));
        }
        Ok(())
    }
}

/// Deserializes an optional icon, treating anything unusable as no icon.
///
/// Read responses must still load when the app reports an icon shape this
/// client does not model.
pub(crate) fn lenient<'de, D>(deserializer: D) -> std::result::Result<Option<Icon>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| match Icon::from_json(v) {
        Ok(icon) => Some(icon),
        Err(e) => {
            log::debug!("ignoring icon: {e}");
            None
        }
    }))
}

impl From<&str> for Icon {
    fn from(emoji: &str) -> Self {
        Self::emoji(emoji)
    }
}
