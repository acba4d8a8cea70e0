//! Error types for the Anytype client library.

use thiserror::Error;

/// Malformed or missing caller input. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A format tag outside the 11 recognized formats.
    #[error("'{0}' is not a recognized property format")]
    InvalidFormat(String),

    /// A value of the wrong shape was assigned through an accessor.
    #[error("expected {expected} for '{field}', got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// Neither the object nor the supplied type carries a type key.
    #[error("object has no type: set a type key on the object or pass a type")]
    MissingType,

    /// The icon is not a usable icon value.
    #[error("invalid icon: {0}")]
    InvalidIcon(String),

    /// Tag resolution needs the backend id of the property.
    #[error("property '{0}' has no backend id or space id; fetch it from the space first")]
    MissingPropertyId(String),

    /// A required input was empty.
    #[error("'{0}' is required")]
    MissingField(&'static str),
}

/// An operation ran against a format tag the client cannot serialize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The backend reported a format this client does not know.
    #[error("unsupported property format '{0}'")]
    Unsupported(String),

    /// The property was never bound to a format.
    #[error("property '{0}' has no format")]
    Unrecognized(String),
}

/// All errors that can occur within the Anytype client library.
#[derive(Debug, Error)]
pub enum AnytypeError {
    /// Caller input failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A property format could not be handled.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Serializing one property of an object failed.
    #[error("Property '{key}' could not be serialized: {source}")]
    Property {
        key: String,
        #[source]
        source: Box<AnytypeError>,
    },

    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response carried no `Anytype-Version` header.
    #[error("Anytype-Version header not found, the app is probably too old")]
    MissingVersionHeader,

    /// The app's API version predates the minimum this client supports.
    #[error("Anytype version {found} is too old, {required} or newer is required")]
    UnsupportedVersion { found: String, required: String },

    /// An operation needed an app key but none is configured.
    #[error("Not authenticated: call auth() first")]
    NotAuthenticated,

    /// A lookup by name or key found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An I/O operation on the settings file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`AnytypeError`].
pub type Result<T> = std::result::Result<T, AnytypeError>;

impl AnytypeError {
    /// Wraps a per-property failure with the offending property's key.
    pub fn for_property(key: impl Into<String>, source: AnytypeError) -> Self {
        Self::Property {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Format(e) => e.to_string(),
            Self::Property { key, source } => format!("Property '{key}': {}", source.user_message()),
            Self::Http(e) => format!("Could not reach Anytype: {e}"),
            Self::Api { message, .. } => message.clone(),
            Self::MissingVersionHeader => "Anytype is too old for this client".to_string(),
            Self::UnsupportedVersion { required, .. } => {
                format!("Please update Anytype (API version {required} or newer)")
            }
            Self::NotAuthenticated => "Pair this client with Anytype first".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::InvalidResponse(_) => "Unexpected response from Anytype".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}
