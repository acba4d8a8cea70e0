//! Internal domain modules for the Anytype client library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod api;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod icon;
pub mod list_view;
pub mod member;
pub mod object;
pub mod property;
pub mod settings;
pub mod space;
pub mod tag;
pub mod type_def;

#[doc(inline)]
pub use api::{
    ApiClient, ListResponse, Page, Pagination, DEFAULT_API_URL, DEFAULT_APP_NAME, MIN_API_VERSION,
    VERSION_HEADER,
};
#[doc(inline)]
pub use client::{prompt_code_from_stdin, Anytype};
#[doc(inline)]
pub use diagnostics::{Access, Diagnostic, Diagnostics};
#[doc(inline)]
pub use error::{AnytypeError, FormatError, Result, ValidationError};
#[doc(inline)]
pub use icon::Icon;
#[doc(inline)]
pub use list_view::ListView;
#[doc(inline)]
pub use member::{Member, MemberRole};
#[doc(inline)]
pub use object::{CreateObjectPayload, ObjectRecord, TypedObject, UpdateObjectPayload, DEFAULT_EMOJI};
#[doc(inline)]
pub use property::{
    DateValue, MultiSelectInput, Property, PropertyDefinition, PropertyFormat, PropertyRecord,
    PropertyValue, TagRef,
};
#[doc(inline)]
pub use settings::{load_settings, save_settings, settings_file_path, ClientSettings};
#[doc(inline)]
pub use space::{Space, SpaceClient};
#[doc(inline)]
pub use tag::{NewTag, Tag, TagCache, TagColor, TagResolver, TagStore};
#[doc(inline)]
pub use type_def::{Template, TypeDef, TypePayload, TypeRecord};
