//! Non-fatal diagnostics raised while reading, writing and serializing properties.
//!
//! Diagnostics never abort an operation. Callers own a [`Diagnostics`] sink and
//! pass it to the calls that may raise one, then inspect it afterwards. Every
//! recorded diagnostic is also emitted through the `log` facade at `warn` level.

use crate::core::property::PropertyFormat;
use serde::Serialize;
use std::fmt;

/// Whether a mismatched accessor was used to read or to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Get,
    Set,
}

/// A single non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A value slot was read or written through an accessor that does not
    /// match the property's declared format. The operation still happened.
    FormatMismatch {
        key: String,
        /// Declared format tag, `None` when the property is unbound.
        declared: Option<String>,
        accessor: PropertyFormat,
        access: Access,
    },
    /// A bare string was assigned to a multi-select and stored as a one-element list.
    MultiSelectCoerced { key: String, value: String },
    /// A multi-select name had no matching tag, so a new tag was created.
    TagAutoCreated {
        property_id: String,
        name: String,
        tag_id: String,
        color: String,
    },
    /// `set_format` replaced an existing binding. Value slots are kept.
    FormatRebound {
        key: String,
        from: PropertyFormat,
        to: PropertyFormat,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatMismatch { key, declared, accessor, access } => {
                let verb = match access {
                    Access::Get => "access",
                    Access::Set => "set",
                };
                write!(
                    f,
                    "trying to {verb} '{accessor}' on property '{key}' with format '{}'",
                    declared.as_deref().unwrap_or("")
                )
            }
            Self::MultiSelectCoerced { key, value } => write!(
                f,
                "multi-select property '{key}' expects a list; stored '{value}' as a one-element list"
            ),
            Self::TagAutoCreated { name, color, .. } => {
                write!(f, "tag '{name}' did not exist; created it with color '{color}'")
            }
            Self::FormatRebound { key, from, to } => {
                write!(f, "property '{key}' rebound from '{from}' to '{to}'")
            }
        }
    }
}

/// Caller-owned collection of diagnostics, in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `diagnostic` and logs it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of `FormatMismatch` diagnostics recorded so far.
    pub fn format_mismatches(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::FormatMismatch { .. }))
            .count()
    }

    /// Names of all tags created while resolving multi-select values.
    pub fn created_tags(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|d| match d {
                Diagnostic::TagAutoCreated { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
