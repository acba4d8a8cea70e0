//! Typed properties: format binding, value slots, accessors and wire projection.
//!
//! A [`Property`] carries one value slot per [`PropertyFormat`]. Only the slot
//! matching the bound format is authoritative; the rest keep their zero values.
//! Reading or writing a slot through a mismatched accessor is allowed but
//! records a [`Diagnostic::FormatMismatch`], since backend schemas are dynamic
//! and callers routinely guess the format wrong.

mod format;
mod value;

pub use format::PropertyFormat;
pub use value::{DateValue, MultiSelectInput, PropertyValue, TagRef};

use crate::{
    Access, Diagnostic, Diagnostics, FormatError, Result, TagResolver, TagStore, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Default, PartialEq)]
enum Binding {
    #[default]
    Unbound,
    Bound(PropertyFormat),
    /// Hydrated from the backend with a tag outside the registry.
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Slots {
    checkbox: bool,
    date: Option<DateValue>,
    text: String,
    number: Number,
    select: String,
    multi_select: Vec<TagRef>,
    files: Vec<String>,
    url: String,
    email: String,
    phone: String,
    objects: Vec<String>,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            checkbox: false,
            date: None,
            text: String::new(),
            number: Number::from(0),
            select: String::new(),
            multi_select: Vec::new(),
            files: Vec::new(),
            url: String::new(),
            email: String::new(),
            phone: String::new(),
            objects: Vec::new(),
        }
    }
}

/// A typed attribute definition/value pair attached to an object or type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Property {
    /// Backend identifier; empty until the property is persisted.
    pub id: String,
    /// Stable key; may be empty until the backend assigns one.
    pub key: String,
    /// Display label.
    pub name: String,
    /// Space the property belongs to; empty for locally built properties.
    pub space_id: String,
    binding: Binding,
    slots: Slots,
}

/// A property as returned by the read endpoints.
///
/// The value, when present, sits under the key named by `format`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub number: Option<Number>,
    #[serde(default)]
    pub select: Option<Value>,
    #[serde(default)]
    pub multi_select: Option<Vec<Value>>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub checkbox: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub objects: Option<Vec<String>>,
}

/// Body for creating a property definition, or for listing one inside a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDefinition {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    pub name: String,
    pub format: PropertyFormat,
}

impl Property {
    /// Creates an unbound property with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Creates a property already bound to `format`, holding its zero value.
    pub fn with_format(key: impl Into<String>, format: PropertyFormat) -> Self {
        Self {
            key: key.into(),
            binding: Binding::Bound(format),
            ..Self::default()
        }
    }

    /// Creates a property bound to `value`'s format and holding `value`.
    pub fn with_value(key: impl Into<String>, value: PropertyValue) -> Self {
        let mut prop = Self::with_format(key, value.format());
        prop.assign(value);
        prop
    }

    /// Sets the display name, builder style.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The bound format, if it is one this client recognizes.
    pub fn format(&self) -> Option<PropertyFormat> {
        match self.binding {
            Binding::Bound(f) => Some(f),
            _ => None,
        }
    }

    /// The declared format tag, including tags this client does not recognize.
    pub fn format_tag(&self) -> Option<&str> {
        match &self.binding {
            Binding::Unbound => None,
            Binding::Bound(f) => Some(f.as_str()),
            Binding::Unsupported(tag) => Some(tag),
        }
    }

    /// Binds the property to the format named by `tag`.
    ///
    /// Slots are never touched, so a value stored earlier through the new
    /// format's accessor becomes authoritative. Rebinding an already-bound
    /// property to a different format records a [`Diagnostic::FormatRebound`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFormat`] when `tag` is not one of the
    /// 11 recognized formats. The property is left untouched.
    pub fn set_format(&mut self, tag: &str, diags: &mut Diagnostics) -> Result<()> {
        let format: PropertyFormat = tag.parse()?;
        self.bind(format, diags);
        Ok(())
    }

    /// Typed form of [`set_format`](Self::set_format).
    pub fn bind(&mut self, format: PropertyFormat, diags: &mut Diagnostics) {
        match self.binding {
            Binding::Bound(current) if current == format => {}
            Binding::Bound(current) => {
                diags.push(Diagnostic::FormatRebound {
                    key: self.key.clone(),
                    from: current,
                    to: format,
                });
                self.binding = Binding::Bound(format);
            }
            _ => self.binding = Binding::Bound(format),
        }
    }

    /// The authoritative value, or `None` when no recognized format is bound.
    ///
    /// Never records diagnostics.
    pub fn value(&self) -> Option<PropertyValue> {
        self.format().map(|f| self.slot(f))
    }

    /// Assigns a dynamic JSON value through the accessor for `accessor`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongType`] when `value` has the wrong shape
    /// for `accessor`. Nothing is stored in that case.
    pub fn set(&mut self, accessor: PropertyFormat, value: Value, diags: &mut Diagnostics) -> Result<()> {
        self.touch(accessor, Access::Set, diags);
        let value = accessor.coerce(value, &self.key, diags)?;
        self.assign(value);
        Ok(())
    }

    pub fn checkbox(&self, diags: &mut Diagnostics) -> bool {
        self.touch(PropertyFormat::Checkbox, Access::Get, diags);
        self.slots.checkbox
    }

    pub fn set_checkbox(&mut self, value: bool, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Checkbox, Access::Set, diags);
        self.slots.checkbox = value;
    }

    pub fn date(&self, diags: &mut Diagnostics) -> Option<DateValue> {
        self.touch(PropertyFormat::Date, Access::Get, diags);
        self.slots.date
    }

    pub fn set_date(&mut self, value: Option<DateValue>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Date, Access::Set, diags);
        self.slots.date = value;
    }

    pub fn text(&self, diags: &mut Diagnostics) -> &str {
        self.touch(PropertyFormat::Text, Access::Get, diags);
        &self.slots.text
    }

    pub fn set_text(&mut self, value: impl Into<String>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Text, Access::Set, diags);
        self.slots.text = value.into();
    }

    pub fn number(&self, diags: &mut Diagnostics) -> &Number {
        self.touch(PropertyFormat::Number, Access::Get, diags);
        &self.slots.number
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::WrongType`] for NaN or infinite values.
    pub fn set_number(&mut self, value: f64, diags: &mut Diagnostics) -> Result<()> {
        self.touch(PropertyFormat::Number, Access::Set, diags);
        if let PropertyValue::Number(n) = PropertyValue::number(value)? {
            self.slots.number = n;
        }
        Ok(())
    }

    /// Integer form of [`set_number`](Self::set_number); integers stay integral on the wire.
    pub fn set_integer(&mut self, value: i64, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Number, Access::Set, diags);
        self.slots.number = Number::from(value);
    }

    pub fn select(&self, diags: &mut Diagnostics) -> &str {
        self.touch(PropertyFormat::Select, Access::Get, diags);
        &self.slots.select
    }

    pub fn set_select(&mut self, value: impl Into<String>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Select, Access::Set, diags);
        self.slots.select = value.into();
    }

    pub fn multi_select(&self, diags: &mut Diagnostics) -> &[TagRef] {
        self.touch(PropertyFormat::MultiSelect, Access::Get, diags);
        &self.slots.multi_select
    }

    /// Assigns a list of tags, or a single name which is widened to a list.
    pub fn set_multi_select(&mut self, value: impl Into<MultiSelectInput>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::MultiSelect, Access::Set, diags);
        self.slots.multi_select = match value.into() {
            MultiSelectInput::List(tags) => tags,
            MultiSelectInput::Single(name) => {
                diags.push(Diagnostic::MultiSelectCoerced {
                    key: self.key.clone(),
                    value: name.clone(),
                });
                vec![TagRef::Name(name)]
            }
        };
    }

    pub fn files(&self, diags: &mut Diagnostics) -> &[String] {
        self.touch(PropertyFormat::Files, Access::Get, diags);
        &self.slots.files
    }

    pub fn set_files(&mut self, value: Vec<String>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Files, Access::Set, diags);
        self.slots.files = value;
    }

    pub fn url(&self, diags: &mut Diagnostics) -> &str {
        self.touch(PropertyFormat::Url, Access::Get, diags);
        &self.slots.url
    }

    pub fn set_url(&mut self, value: impl Into<String>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Url, Access::Set, diags);
        self.slots.url = value.into();
    }

    pub fn email(&self, diags: &mut Diagnostics) -> &str {
        self.touch(PropertyFormat::Email, Access::Get, diags);
        &self.slots.email
    }

    pub fn set_email(&mut self, value: impl Into<String>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Email, Access::Set, diags);
        self.slots.email = value.into();
    }

    pub fn phone(&self, diags: &mut Diagnostics) -> &str {
        self.touch(PropertyFormat::Phone, Access::Get, diags);
        &self.slots.phone
    }

    pub fn set_phone(&mut self, value: impl Into<String>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Phone, Access::Set, diags);
        self.slots.phone = value.into();
    }

    pub fn objects(&self, diags: &mut Diagnostics) -> &[String] {
        self.touch(PropertyFormat::Objects, Access::Get, diags);
        &self.slots.objects
    }

    pub fn set_objects(&mut self, value: Vec<String>, diags: &mut Diagnostics) {
        self.touch(PropertyFormat::Objects, Access::Set, diags);
        self.slots.objects = value;
    }

    /// Projects the bound value to `{<format>: <value>}`.
    ///
    /// Multi-select names are resolved to tag ids through `resolver`, which may
    /// create tags. Output order follows the stored order; duplicates are kept.
    ///
    /// # Errors
    ///
    /// - [`FormatError::Unrecognized`] if the property was never bound.
    /// - [`FormatError::Unsupported`] if the backend reported an unknown format.
    /// - [`ValidationError::MissingPropertyId`] if names need resolving but the
    ///   property has no backend id or space id.
    /// - Any error from the tag store.
    pub fn to_wire_payload<S: TagStore + ?Sized>(
        &self,
        resolver: &mut TagResolver<'_, S>,
        diags: &mut Diagnostics,
    ) -> Result<Value> {
        let format = match &self.binding {
            Binding::Bound(f) => *f,
            Binding::Unsupported(tag) => return Err(FormatError::Unsupported(tag.clone()).into()),
            Binding::Unbound => return Err(FormatError::Unrecognized(self.key.clone()).into()),
        };

        let value = match format {
            PropertyFormat::Checkbox => Value::Bool(self.slots.checkbox),
            PropertyFormat::Text => Value::String(self.slots.text.clone()),
            PropertyFormat::Number => Value::Number(self.slots.number.clone()),
            PropertyFormat::Select => Value::String(self.slots.select.clone()),
            PropertyFormat::Url => Value::String(self.slots.url.clone()),
            PropertyFormat::Email => Value::String(self.slots.email.clone()),
            PropertyFormat::Phone => Value::String(self.slots.phone.clone()),
            PropertyFormat::Files => string_array(&self.slots.files),
            PropertyFormat::Objects => string_array(&self.slots.objects),
            PropertyFormat::Date => self
                .slots
                .date
                .map_or(Value::Null, |d| Value::String(d.to_iso8601())),
            PropertyFormat::MultiSelect => {
                let mut ids = Vec::with_capacity(self.slots.multi_select.len());
                for entry in &self.slots.multi_select {
                    match entry {
                        TagRef::Id(id) => ids.push(Value::String(id.clone())),
                        TagRef::Name(name) => {
                            if self.id.is_empty() || self.space_id.is_empty() {
                                return Err(ValidationError::MissingPropertyId(self.key.clone()).into());
                            }
                            let tag = resolver.find_or_create(&self.space_id, &self.id, name, diags)?;
                            ids.push(Value::String(tag.id));
                        }
                    }
                }
                Value::Array(ids)
            }
        };

        let mut map = Map::new();
        map.insert(format.as_str().to_string(), value);
        Ok(Value::Object(map))
    }

    /// Hydrates a property from a read response.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongType`] if a `select` or `multi_select`
    /// value is neither an id string nor a tag object.
    pub fn from_record(record: PropertyRecord, space_id: &str) -> Result<Self> {
        let binding = if record.format.is_empty() {
            Binding::Unbound
        } else {
            match record.format.parse::<PropertyFormat>() {
                Ok(f) => Binding::Bound(f),
                Err(_) => Binding::Unsupported(record.format.clone()),
            }
        };

        let mut slots = Slots::default();
        if let Binding::Bound(format) = binding {
            match format {
                PropertyFormat::Text => slots.text = record.text.unwrap_or_default(),
                PropertyFormat::Number => {
                    if let Some(n) = record.number {
                        slots.number = n;
                    }
                }
                PropertyFormat::Select => {
                    slots.select = match record.select {
                        Some(v) => tag_id(v, "select")?.unwrap_or_default(),
                        None => String::new(),
                    }
                }
                PropertyFormat::MultiSelect => {
                    for v in record.multi_select.unwrap_or_default() {
                        if let Some(id) = tag_id(v, "multi_select")? {
                            slots.multi_select.push(TagRef::Id(id));
                        }
                    }
                }
                PropertyFormat::Date => {
                    slots.date = record.date.as_deref().and_then(DateValue::parse);
                    if slots.date.is_none() && record.date.is_some() {
                        log::debug!("dropping unparseable date on property '{}'", record.key);
                    }
                }
                PropertyFormat::Files => slots.files = record.files.unwrap_or_default(),
                PropertyFormat::Checkbox => slots.checkbox = record.checkbox.unwrap_or(false),
                PropertyFormat::Url => slots.url = record.url.unwrap_or_default(),
                PropertyFormat::Email => slots.email = record.email.unwrap_or_default(),
                PropertyFormat::Phone => slots.phone = record.phone.unwrap_or_default(),
                PropertyFormat::Objects => slots.objects = record.objects.unwrap_or_default(),
            }
        }

        Ok(Self {
            id: record.id,
            key: record.key,
            name: record.name,
            space_id: space_id.to_string(),
            binding,
            slots,
        })
    }

    /// The definition body used when creating this property or a type holding it.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when no recognized format is bound.
    pub fn definition(&self) -> Result<PropertyDefinition> {
        let format = match &self.binding {
            Binding::Bound(f) => *f,
            Binding::Unsupported(tag) => return Err(FormatError::Unsupported(tag.clone()).into()),
            Binding::Unbound => return Err(FormatError::Unrecognized(self.key.clone()).into()),
        };
        Ok(PropertyDefinition {
            key: self.key.clone(),
            name: self.name.clone(),
            format,
        })
    }

    /// A zero-valued copy bound to the same format, keeping identity fields.
    pub(crate) fn cleared(&self) -> Self {
        Self {
            id: self.id.clone(),
            key: self.key.clone(),
            name: self.name.clone(),
            space_id: self.space_id.clone(),
            binding: self.binding.clone(),
            slots: Slots::default(),
        }
    }

    fn touch(&self, accessor: PropertyFormat, access: Access, diags: &mut Diagnostics) {
        if self.binding != Binding::Bound(accessor) {
            diags.push(Diagnostic::FormatMismatch {
                key: self.key.clone(),
                declared: self.format_tag().map(str::to_string),
                accessor,
                access,
            });
        }
    }

    fn slot(&self, format: PropertyFormat) -> PropertyValue {
        let s = &self.slots;
        match format {
            PropertyFormat::Text => PropertyValue::Text(s.text.clone()),
            PropertyFormat::Number => PropertyValue::Number(s.number.clone()),
            PropertyFormat::Select => PropertyValue::Select(s.select.clone()),
            PropertyFormat::MultiSelect => PropertyValue::MultiSelect(s.multi_select.clone()),
            PropertyFormat::Date => PropertyValue::Date(s.date),
            PropertyFormat::Files => PropertyValue::Files(s.files.clone()),
            PropertyFormat::Checkbox => PropertyValue::Checkbox(s.checkbox),
            PropertyFormat::Url => PropertyValue::Url(s.url.clone()),
            PropertyFormat::Email => PropertyValue::Email(s.email.clone()),
            PropertyFormat::Phone => PropertyValue::Phone(s.phone.clone()),
            PropertyFormat::Objects => PropertyValue::Objects(s.objects.clone()),
        }
    }

    fn assign(&mut self, value: PropertyValue) {
        let s = &mut self.slots;
        match value {
            PropertyValue::Text(v) => s.text = v,
            PropertyValue::Number(v) => s.number = v,
            PropertyValue::Select(v) => s.select = v,
            PropertyValue::MultiSelect(v) => s.multi_select = v,
            PropertyValue::Date(v) => s.date = v,
            PropertyValue::Files(v) => s.files = v,
            PropertyValue::Checkbox(v) => s.checkbox = v,
            PropertyValue::Url(v) => s.url = v,
            PropertyValue::Email(v) => s.email = v,
            PropertyValue::Phone(v) => s.phone = v,
            PropertyValue::Objects(v) => s.objects = v,
        }
    }
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Reads a tag id from either a bare id string or a tag object.
fn tag_id(value: Value, field: &'static str) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Object(mut map) => match map.remove("id") {
            Some(Value::String(id)) => Ok(Some(id)),
            _ => Err(ValidationError::WrongType {
                field,
                expected: "a tag object with an id",
                found: "an object without an id".to_string(),
            }
            .into()),
        },
        other => Err(ValidationError::WrongType {
            field,
            expected: "a tag id or tag object",
            found: value::describe(&other),
        }
        .into()),
    }
}
