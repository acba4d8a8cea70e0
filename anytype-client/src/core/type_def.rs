//! Object types and their templates.

use crate::core::icon;
use crate::core::property::PropertyDefinition;
use crate::{AnytypeError, Icon, Property, PropertyRecord, Result};
use serde::{Deserialize, Serialize};

/// A type as returned by the read endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plural_name: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, deserialize_with = "icon::lenient")]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

/// A pre-filled object skeleton associated with a type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "icon::lenient")]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub snippet: String,
}

/// A schema describing which properties objects of this type carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDef {
    pub id: String,
    pub key: String,
    pub name: String,
    pub plural_name: String,
    pub layout: String,
    pub icon: Option<Icon>,
    pub space_id: String,
    pub archived: bool,
    /// Template used for new objects of this type; empty for none.
    pub template_id: String,
    properties: Vec<Property>,
}

/// Body for creating or updating a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypePayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    pub name: String,
    pub plural_name: String,
    pub layout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub properties: Vec<PropertyDefinition>,
}

impl TypeDef {
    /// A local type definition, ready to be filled and created.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: "basic".to_string(),
            ..Self::default()
        }
    }

    /// Builds a type from a read response, hydrating its property definitions.
    ///
    /// # Errors
    ///
    /// Propagates property hydration failures.
    pub fn from_record(record: TypeRecord, space_id: &str) -> Result<Self> {
        let properties = record
            .properties
            .into_iter()
            .map(|p| Property::from_record(p, space_id))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: record.id,
            key: record.key,
            name: record.name,
            plural_name: record.plural_name,
            layout: record.layout,
            icon: record.icon,
            space_id: space_id.to_string(),
            archived: record.archived,
            template_id: String::new(),
            properties,
        })
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    /// Adds a property definition, replacing one with the same key in place.
    pub fn add_property(&mut self, property: Property) {
        match self.properties.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }

    /// Selects the template named `name` from `templates`.
    ///
    /// # Errors
    ///
    /// Returns [`AnytypeError::NotFound`] when no template has that name.
    pub fn set_template(&mut self, name: &str, templates: &[Template]) -> Result<()> {
        let template = templates.iter().find(|t| t.name == name).ok_or_else(|| {
            AnytypeError::NotFound(format!("template '{}' for type '{}'", name, self.name))
        })?;
        self.template_id = template.id.clone();
        Ok(())
    }

    /// Fresh, zero-valued copies of the type's properties for a new object.
    pub(crate) fn blank_properties(&self) -> Vec<Property> {
        self.properties.iter().map(Property::cleared).collect()
    }

    /// The body sent to create or update this type.
    ///
    /// # Errors
    ///
    /// Returns a format error for any property without a recognized format.
    pub fn build_payload(&self) -> Result<TypePayload> {
        let properties = self
            .properties
            .iter()
            .map(|p| p.definition().map_err(|e| AnytypeError::for_property(&p.key, e)))
            .collect::<Result<Vec<_>>>()?;
        if let Some(icon) = &self.icon {
            icon.validate()?;
        }
        let plural_name = if self.plural_name.is_empty() {
            format!("{}s", self.name)
        } else {
            self.plural_name.clone()
        };
        Ok(TypePayload {
            key: self.key.clone(),
            name: self.name.clone(),
            plural_name,
            layout: self.layout.clone(),
            icon: self.icon.clone(),
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyFormat;
    use serde_json::json;

    #[test]
    fn test_payload_lists_properties_in_order() {
        let mut ty = TypeDef::new("TestProperty");
        ty.plural_name = "TestProperties".to_string();
        ty.icon = Some(Icon::emoji("🧪"));
        ty.add_property(Property::with_format("prop_text", PropertyFormat::Text).named("Text"));
        ty.add_property(Property::with_format("prop_number", PropertyFormat::Number).named("Number"));
        ty.add_property(Property::with_format("prop_multi", PropertyFormat::MultiSelect).named("Multi"));

        let payload = serde_json::to_value(ty.build_payload().unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "name": "TestProperty",
                "plural_name": "TestProperties",
                "layout": "basic",
                "icon": {"format": "emoji", "emoji": "🧪"},
                "properties": [
                    {"key": "prop_text", "name": "Text", "format": "text"},
                    {"key": "prop_number", "name": "Number", "format": "number"},
                    {"key": "prop_multi", "name": "Multi", "format": "multi_select"}
                ]
            })
        );
    }

    #[test]
    fn test_add_property_replaces_same_key() {
        let mut ty = TypeDef::new("Book");
        ty.add_property(Property::with_format("year", PropertyFormat::Text));
        ty.add_property(Property::with_format("author", PropertyFormat::Text));
        ty.add_property(Property::with_format("year", PropertyFormat::Number));
        assert_eq!(ty.properties().len(), 2);
        assert_eq!(ty.properties()[0].format(), Some(PropertyFormat::Number));
    }

    #[test]
    fn test_payload_fails_for_unbound_property() {
        let mut ty = TypeDef::new("Book");
        ty.add_property(Property::new("loose"));
        let err = ty.build_payload().unwrap_err();
        assert!(matches!(err, AnytypeError::Property { ref key, .. } if key == "loose"));
    }

    #[test]
    fn test_set_template_by_name() {
        let templates = vec![
            Template { id: "t1".to_string(), name: "Weekly".to_string(), ..Template::default() },
            Template { id: "t2".to_string(), name: "Daily".to_string(), ..Template::default() },
        ];
        let mut ty = TypeDef::new("Journal");
        ty.set_template("Daily", &templates).unwrap();
        assert_eq!(ty.template_id, "t2");
        assert!(matches!(
            ty.set_template("NoExists", &templates),
            Err(AnytypeError::NotFound(_))
        ));
        assert_eq!(ty.template_id, "t2");
    }

    #[test]
    fn test_from_record_hydrates_properties_and_tolerates_odd_icons() {
        let record: TypeRecord = serde_json::from_value(json!({
            "id": "ty1",
            "key": "page",
            "name": "Page",
            "plural_name": "Pages",
            "layout": "basic",
            "icon": {"format": "sticker"},
            "properties": [
                {"id": "p1", "key": "tag", "name": "Tag", "format": "multi_select"},
                {"id": "p2", "key": "due", "name": "Due", "format": "date"}
            ],
            "object": "type"
        }))
        .unwrap();
        let ty = TypeDef::from_record(record, "space-1").unwrap();
        assert_eq!(ty.key, "page");
        assert!(ty.icon.is_none());
        assert_eq!(ty.properties().len(), 2);
        assert_eq!(ty.property("due").unwrap().format(), Some(PropertyFormat::Date));
        assert_eq!(ty.property("tag").unwrap().space_id, "space-1");
    }
}
