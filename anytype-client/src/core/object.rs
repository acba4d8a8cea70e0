//! Typed objects and the payloads sent to create and update them.

use crate::core::icon;
use crate::{
    AnytypeError, Diagnostics, Icon, Property, PropertyRecord, Result, TagResolver, TagStore,
    TypeDef, TypeRecord, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An object as returned by the read endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub space_id: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, deserialize_with = "icon::lenient")]
    pub icon: Option<Icon>,
    #[serde(default, rename = "type")]
    pub type_ref: Option<TypeRecord>,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
    /// Body as markdown; only present on single-object reads.
    #[serde(default)]
    pub markdown: Option<String>,
}

/// Icon given to objects built locally.
pub const DEFAULT_EMOJI: &str = "📄";

/// An object in a space: name, body, icon, type reference and ordered properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedObject {
    pub id: String,
    pub space_id: String,
    pub name: String,
    pub description: String,
    /// Markdown body.
    pub body: String,
    pub icon: Option<Icon>,
    pub type_key: String,
    /// Template to instantiate; empty for none.
    pub template_id: String,
    pub snippet: String,
    pub layout: String,
    pub archived: bool,
    properties: Vec<Property>,
}

/// Body of the create-object call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateObjectPayload {
    pub icon: Icon,
    pub name: String,
    pub description: String,
    pub body: String,
    /// Reserved by the API; always empty.
    pub source: String,
    pub template_id: String,
    pub type_key: String,
    pub properties: Vec<Value>,
}

/// Body of the update-object call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateObjectPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub description: String,
    #[serde(rename = "markdown")]
    pub body: String,
    pub properties: Vec<Value>,
}

impl TypedObject {
    /// A new object of `object_type`, carrying blank copies of its properties.
    pub fn new(name: impl Into<String>, object_type: &TypeDef) -> Self {
        Self {
            name: name.into(),
            space_id: object_type.space_id.clone(),
            type_key: object_type.key.clone(),
            template_id: object_type.template_id.clone(),
            icon: Some(Icon::emoji(DEFAULT_EMOJI)),
            properties: object_type.blank_properties(),
            ..Self::default()
        }
    }

    /// A new object with no type yet; set `type_key` or pass a type on creation.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: Some(Icon::emoji(DEFAULT_EMOJI)),
            ..Self::default()
        }
    }

    /// Builds an object from a read response.
    ///
    /// # Errors
    ///
    /// Propagates property hydration failures.
    pub fn from_record(record: ObjectRecord) -> Result<Self> {
        let space_id = record.space_id;
        let properties = record
            .properties
            .into_iter()
            .map(|p| Property::from_record(p, &space_id))
            .collect::<Result<Vec<_>>>()?;
        let type_key = record.type_ref.map(|t| t.key).unwrap_or_default();
        let description = properties
            .iter()
            .find(|p| p.key == "description")
            .and_then(|p| match p.value() {
                Some(crate::PropertyValue::Text(s)) => Some(s),
                _ => None,
            })
            .unwrap_or_default();

        Ok(Self {
            id: record.id,
            space_id,
            name: record.name,
            description,
            body: record.markdown.unwrap_or_default(),
            icon: record.icon,
            type_key,
            template_id: String::new(),
            snippet: record.snippet,
            layout: record.layout,
            archived: record.archived,
            properties,
        })
    }

    /// Points the object at `object_type`, adopting its key and template.
    pub fn set_type(&mut self, object_type: &TypeDef) {
        self.type_key = object_type.key.clone();
        self.template_id = object_type.template_id.clone();
    }

    /// Sets the icon from raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIcon`] if `value` is not an icon object.
    pub fn set_icon_json(&mut self, value: Value) -> Result<()> {
        self.icon = Some(Icon::from_json(value)?);
        Ok(())
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.properties
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.key == key)
    }

    /// Attaches a property after those already present.
    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn add_title1(&mut self, text: &str) {
        self.push_block(&format!("# {text}"));
    }

    pub fn add_title2(&mut self, text: &str) {
        self.push_block(&format!("## {text}"));
    }

    pub fn add_title3(&mut self, text: &str) {
        self.push_block(&format!("### {text}"));
    }

    pub fn add_text(&mut self, text: &str) {
        self.push_block(text);
    }

    pub fn add_codeblock(&mut self, code: &str, language: &str) {
        self.push_block(&format!("``` {language}\n{code}\n```"));
    }

    pub fn add_bullet(&mut self, text: &str) {
        self.push_block(&format!("- {text}"));
    }

    pub fn add_checkbox(&mut self, text: &str, checked: bool) {
        let mark = if checked { 'x' } else { ' ' };
        self.push_block(&format!("- [{mark}] {text}"));
    }

    /// Appends an image; `title` is omitted from the markdown when empty.
    pub fn add_image(&mut self, url: &str, alt: &str, title: &str) {
        if title.is_empty() {
            self.push_block(&format!("![{alt}]({url})"));
        } else {
            self.push_block(&format!("![{alt}]({url} \"{title}\")"));
        }
    }

    fn push_block(&mut self, block: &str) {
        self.body.push_str(block);
        self.body.push('\n');
    }

    /// Assembles the create-object body.
    ///
    /// The type key and template come from the object when set, otherwise from
    /// `object_type`. Properties are serialized in attachment order.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingType`] if no type key can be resolved.
    /// - [`ValidationError::InvalidIcon`] if the icon is missing or unusable.
    /// - [`AnytypeError::Property`] wrapping the first property that fails.
    pub fn build_create_payload<S: TagStore + ?Sized>(
        &self,
        object_type: Option<&TypeDef>,
        resolver: &mut TagResolver<'_, S>,
        diags: &mut Diagnostics,
    ) -> Result<CreateObjectPayload> {
        let type_key = match (self.type_key.as_str(), object_type) {
            (key, _) if !key.is_empty() => key.to_string(),
            (_, Some(t)) if !t.key.is_empty() => t.key.clone(),
            _ => return Err(ValidationError::MissingType.into()),
        };
        let template_id = if self.template_id.is_empty() {
            object_type.map(|t| t.template_id.clone()).unwrap_or_default()
        } else {
            self.template_id.clone()
        };
        let icon = self
            .icon
            .clone()
            .ok_or_else(|| ValidationError::InvalidIcon("icon is required".to_string()))?;
        icon.validate()?;

        Ok(CreateObjectPayload {
            icon,
            name: self.name.clone(),
            description: self.description.clone(),
            body: self.body.clone(),
            source: String::new(),
            template_id,
            type_key,
            properties: self.wire_properties(resolver, diags)?,
        })
    }

    /// Assembles the update-object body.
    ///
    /// # Errors
    ///
    /// Same property and icon failures as [`build_create_payload`](Self::build_create_payload).
    pub fn build_update_payload<S: TagStore + ?Sized>(
        &self,
        resolver: &mut TagResolver<'_, S>,
        diags: &mut Diagnostics,
    ) -> Result<UpdateObjectPayload> {
        if let Some(icon) = &self.icon {
            icon.validate()?;
        }
        Ok(UpdateObjectPayload {
            name: self.name.clone(),
            icon: self.icon.clone(),
            description: self.description.clone(),
            body: self.body.clone(),
            properties: self.wire_properties(resolver, diags)?,
        })
    }

    /// Each property's wire value, tagged with its key so the API can address it.
    fn wire_properties<S: TagStore + ?Sized>(
        &self,
        resolver: &mut TagResolver<'_, S>,
        diags: &mut Diagnostics,
    ) -> Result<Vec<Value>> {
        self.properties
            .iter()
            .map(|prop| {
                let mut value = prop
                    .to_wire_payload(resolver, diags)
                    .map_err(|e| AnytypeError::for_property(&prop.key, e))?;
                if let Value::Object(map) = &mut value {
                    map.insert("key".to_string(), Value::String(prop.key.clone()));
                }
                Ok(value)
            })
            .collect()
    }
}
