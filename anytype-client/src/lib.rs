//! Client library for the Anytype local HTTP API.
//!
//! The primary entry point is [`Anytype`], which pairs with the desktop app and
//! hands out [`SpaceClient`]s for space-scoped calls. Objects are assembled
//! locally as [`TypedObject`]s whose [`Property`] values are bound to a
//! [`PropertyFormat`]; multi-select tag names are resolved to tag ids through a
//! [`TagResolver`] when the create payload is built.
//!
//! Non-fatal oddities (format mismatches, widened multi-select values,
//! auto-created tags) are collected in a caller-owned [`Diagnostics`] sink and
//! logged through the `log` facade.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    api::{
        ApiClient, ListResponse, Page, Pagination, DEFAULT_API_URL, DEFAULT_APP_NAME,
        MIN_API_VERSION, VERSION_HEADER,
    },
    client::{prompt_code_from_stdin, Anytype},
    diagnostics::{Access, Diagnostic, Diagnostics},
    error::{AnytypeError, FormatError, Result, ValidationError},
    icon::Icon,
    list_view::ListView,
    member::{Member, MemberRole},
    object::{CreateObjectPayload, ObjectRecord, TypedObject, UpdateObjectPayload, DEFAULT_EMOJI},
    property::{
        DateValue, MultiSelectInput, Property, PropertyDefinition, PropertyFormat, PropertyRecord,
        PropertyValue, TagRef,
    },
    settings::{load_settings, save_settings, settings_file_path, ClientSettings},
    space::{Space, SpaceClient},
    tag::{NewTag, Tag, TagCache, TagColor, TagResolver, TagStore},
    type_def::{Template, TypeDef, TypePayload, TypeRecord},
};
