//! Spaces and the operations scoped to one space.

use crate::core::api::{string_field, unwrap_envelope};
use crate::core::icon;
use crate::{
    AnytypeError, ApiClient, Diagnostics, Icon, ListView, Member, NewTag, ObjectRecord, Page,
    Property, PropertyRecord, PropertyValue, Result, Tag, TagColor, TagRef, TagResolver, TagStore,
    Template, TypeDef, TypeRecord, TypedObject, ValidationError,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// A top-level container of objects.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Space {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "icon::lenient")]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub gateway_url: String,
    #[serde(default)]
    pub network_id: String,
}

/// Operations on one space, borrowing the authenticated [`ApiClient`].
#[derive(Debug, Clone)]
pub struct SpaceClient<'a> {
    api: &'a ApiClient,
    space_id: String,
}

impl<'a> SpaceClient<'a> {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for an empty space id.
    pub fn new(api: &'a ApiClient, space_id: &str) -> Result<Self> {
        if space_id.is_empty() {
            return Err(ValidationError::MissingField("space_id").into());
        }
        Ok(Self {
            api,
            space_id: space_id.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.space_id
    }

    fn path(&self, rest: &str) -> String {
        format!("/spaces/{}{}", self.space_id, rest)
    }

    /// A resolver that re-fetches tags on every lookup.
    pub fn tag_resolver(&self) -> TagResolver<'a, ApiClient> {
        TagResolver::new(self.api)
    }

    // --- objects ---

    pub fn get_objects(&self, page: Page) -> Result<Vec<TypedObject>> {
        self.api
            .list::<ObjectRecord>(&self.path("/objects"), page)?
            .data
            .into_iter()
            .map(TypedObject::from_record)
            .collect()
    }

    pub fn get_object(&self, object_id: &str) -> Result<TypedObject> {
        let record: ObjectRecord = self
            .api
            .get_record(&self.path(&format!("/objects/{object_id}")), "object")?;
        TypedObject::from_record(record)
    }

    /// Creates `object` in this space.
    ///
    /// The type key comes from the object, or from `object_type` when the
    /// object has none. Multi-select names are resolved with one tag cache per
    /// call. Local properties without a backend id are matched to the space's
    /// properties by key first.
    ///
    /// # Errors
    ///
    /// Payload validation errors before any request is sent, then transport errors.
    pub fn create_object(
        &self,
        object: &TypedObject,
        object_type: Option<&TypeDef>,
        diags: &mut Diagnostics,
    ) -> Result<TypedObject> {
        let object = self.adopt(object)?;
        let mut resolver = TagResolver::cached(self.api);
        let payload = object.build_create_payload(object_type, &mut resolver, diags)?;
        let body = self
            .api
            .post(&self.path("/objects"), &serde_json::to_value(&payload)?)?;
        let created = TypedObject::from_record(unwrap_envelope(body, "object")?)?;
        log::info!("created object '{}' ({}) in space {}", created.name, created.id, self.space_id);
        Ok(created)
    }

    /// Sends the object's name, icon, body and properties as an update.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] when the object has no id, otherwise
    /// as [`create_object`](Self::create_object).
    pub fn update_object(&self, object: &TypedObject, diags: &mut Diagnostics) -> Result<TypedObject> {
        if object.id.is_empty() {
            return Err(ValidationError::MissingField("object id").into());
        }
        let object = self.adopt(object)?;
        let mut resolver = TagResolver::cached(self.api);
        let payload = object.build_update_payload(&mut resolver, diags)?;
        let body = self.api.patch(
            &self.path(&format!("/objects/{}", object.id)),
            &serde_json::to_value(&payload)?,
        )?;
        TypedObject::from_record(unwrap_envelope(body, "object")?)
    }

    pub fn delete_object(&self, object_id: &str) -> Result<()> {
        self.api.delete(&self.path(&format!("/objects/{object_id}")))?;
        Ok(())
    }

    /// Exports an object's content, e.g. with `format = "markdown"`.
    pub fn export_object(&self, object_id: &str, format: &str) -> Result<String> {
        let body = self.api.get(&self.path(&format!("/objects/{object_id}/{format}")))?;
        string_field(&body, "markdown")
    }

    /// Full-text search within the space, optionally limited to type keys.
    pub fn search(&self, query: &str, types: &[String], page: Page) -> Result<Vec<TypedObject>> {
        self.api
            .search(&self.path("/search"), query, types, page)?
            .data
            .into_iter()
            .map(|v| TypedObject::from_record(serde_json::from_value(v)?))
            .collect()
    }

    /// Copies `object` into this space and fills in missing property ids by key.
    ///
    /// Properties that belong to another space lose their id and are matched
    /// again by key here. Tag ids already stored in them are kept as they are.
    fn adopt(&self, object: &TypedObject) -> Result<TypedObject> {
        let mut object = object.clone();
        object.space_id = self.space_id.clone();
        for prop in object.properties_mut() {
            if prop.space_id != self.space_id {
                if !prop.space_id.is_empty() {
                    log::debug!("re-keying property '{}' from space {}", prop.key, prop.space_id);
                    prop.id.clear();
                }
                prop.space_id = self.space_id.clone();
            }
        }

        let needs_id = |p: &Property| {
            p.id.is_empty()
                && matches!(p.value(), Some(PropertyValue::MultiSelect(ref refs))
                    if refs.iter().any(|r| matches!(r, TagRef::Name(_))))
        };
        if !object.properties().iter().any(needs_id) {
            return Ok(object);
        }

        let known = self.get_all_properties()?;
        for prop in object.properties_mut() {
            if prop.id.is_empty() {
                if let Some(found) = known.iter().find(|k| k.key == prop.key) {
                    prop.id = found.id.clone();
                }
            }
        }
        Ok(object)
    }

    // --- types and templates ---

    pub fn get_types(&self, page: Page) -> Result<Vec<TypeDef>> {
        self.api
            .list::<TypeRecord>(&self.path("/types"), page)?
            .data
            .into_iter()
            .map(|r| TypeDef::from_record(r, &self.space_id))
            .collect()
    }

    pub fn get_type(&self, type_id: &str) -> Result<TypeDef> {
        let record: TypeRecord = self
            .api
            .get_record(&self.path(&format!("/types/{type_id}")), "type")?;
        TypeDef::from_record(record, &self.space_id)
    }

    /// Looks a type up by display name across all pages.
    ///
    /// # Errors
    ///
    /// [`AnytypeError::NotFound`] if no type has that name.
    pub fn get_type_by_name(&self, name: &str) -> Result<TypeDef> {
        let records: Vec<TypeRecord> = self.api.list_all(&self.path("/types"))?;
        let record = records
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| AnytypeError::NotFound(format!("type '{name}'")))?;
        TypeDef::from_record(record, &self.space_id)
    }

    pub fn create_type(&self, object_type: &TypeDef) -> Result<TypeDef> {
        let payload = object_type.build_payload()?;
        let body = self
            .api
            .post(&self.path("/types"), &serde_json::to_value(&payload)?)?;
        TypeDef::from_record(unwrap_envelope(body, "type")?, &self.space_id)
    }

    pub fn update_type(&self, object_type: &TypeDef) -> Result<TypeDef> {
        if object_type.id.is_empty() {
            return Err(ValidationError::MissingField("type id").into());
        }
        let payload = object_type.build_payload()?;
        let body = self.api.patch(
            &self.path(&format!("/types/{}", object_type.id)),
            &serde_json::to_value(&payload)?,
        )?;
        TypeDef::from_record(unwrap_envelope(body, "type")?, &self.space_id)
    }

    pub fn delete_type(&self, type_id: &str) -> Result<()> {
        self.api.delete(&self.path(&format!("/types/{type_id}")))?;
        Ok(())
    }

    pub fn get_templates(&self, type_id: &str, page: Page) -> Result<Vec<Template>> {
        Ok(self
            .api
            .list(&self.path(&format!("/types/{type_id}/templates")), page)?
            .data)
    }

    pub fn get_template(&self, type_id: &str, template_id: &str) -> Result<Template> {
        self.api.get_record(
            &self.path(&format!("/types/{type_id}/templates/{template_id}")),
            "template",
        )
    }

    /// Selects the template named `name` as the default for new objects of `object_type`.
    pub fn set_template(&self, object_type: &mut TypeDef, name: &str) -> Result<()> {
        let templates: Vec<Template> = self
            .api
            .list_all(&self.path(&format!("/types/{}/templates", object_type.id)))?;
        object_type.set_template(name, &templates)
    }

    // --- members ---

    pub fn get_members(&self, page: Page) -> Result<Vec<Member>> {
        Ok(self.api.list(&self.path("/members"), page)?.data)
    }

    pub fn get_member(&self, member_id: &str) -> Result<Member> {
        self.api
            .get_record(&self.path(&format!("/members/{member_id}")), "member")
    }

    // --- lists ---

    pub fn get_list_views(&self, list_id: &str, page: Page) -> Result<Vec<ListView>> {
        let views: Vec<ListView> = self
            .api
            .list(&self.path(&format!("/lists/{list_id}/views")), page)?
            .data;
        Ok(views
            .into_iter()
            .map(|mut v| {
                v.list_id = list_id.to_string();
                v.space_id = self.space_id.clone();
                v
            })
            .collect())
    }

    pub fn get_objects_in_list_view(&self, view: &ListView, page: Page) -> Result<Vec<TypedObject>> {
        self.api
            .list::<ObjectRecord>(
                &self.path(&format!("/lists/{}/{}/objects", view.list_id, view.id)),
                page,
            )?
            .data
            .into_iter()
            .map(TypedObject::from_record)
            .collect()
    }

    pub fn add_objects_to_list(&self, list_id: &str, object_ids: &[String]) -> Result<()> {
        self.api
            .post(&self.path(&format!("/lists/{list_id}/objects")), &json!(object_ids))?;
        Ok(())
    }

    pub fn remove_object_from_list(&self, list_id: &str, object_id: &str) -> Result<()> {
        self.api
            .delete(&self.path(&format!("/lists/{list_id}/objects/{object_id}")))?;
        Ok(())
    }

    // --- properties ---

    pub fn get_properties(&self, page: Page) -> Result<Vec<Property>> {
        self.api
            .list::<PropertyRecord>(&self.path("/properties"), page)?
            .data
            .into_iter()
            .map(|r| Property::from_record(r, &self.space_id))
            .collect()
    }

    fn get_all_properties(&self) -> Result<Vec<Property>> {
        self.api
            .list_all::<PropertyRecord>(&self.path("/properties"))?
            .into_iter()
            .map(|r| Property::from_record(r, &self.space_id))
            .collect()
    }

    pub fn get_property(&self, property_id: &str) -> Result<Property> {
        let record: PropertyRecord = self
            .api
            .get_record(&self.path(&format!("/properties/{property_id}")), "property")?;
        Property::from_record(record, &self.space_id)
    }

    /// Looks a property up by key across all pages.
    ///
    /// # Errors
    ///
    /// [`AnytypeError::NotFound`] if no property has that key.
    pub fn get_property_by_key(&self, key: &str) -> Result<Property> {
        self.get_all_properties()?
            .into_iter()
            .find(|p| p.key == key)
            .ok_or_else(|| AnytypeError::NotFound(format!("property '{key}'")))
    }

    pub fn create_property(&self, property: &Property) -> Result<Property> {
        let definition = property.definition()?;
        let body = self
            .api
            .post(&self.path("/properties"), &serde_json::to_value(&definition)?)?;
        Property::from_record(unwrap_envelope(body, "property")?, &self.space_id)
    }

    /// Renames a property; its format cannot change once created.
    pub fn update_property(&self, property: &Property) -> Result<Property> {
        if property.id.is_empty() {
            return Err(ValidationError::MissingPropertyId(property.key.clone()).into());
        }
        let body = self.api.patch(
            &self.path(&format!("/properties/{}", property.id)),
            &json!({ "name": property.name, "key": property.key }),
        )?;
        Property::from_record(unwrap_envelope(body, "property")?, &self.space_id)
    }

    pub fn delete_property(&self, property_id: &str) -> Result<()> {
        self.api
            .delete(&self.path(&format!("/properties/{property_id}")))?;
        Ok(())
    }

    // --- tags ---

    pub fn get_tags(&self, property_id: &str) -> Result<Vec<Tag>> {
        self.api.list_tags(&self.space_id, property_id)
    }

    pub fn get_tag(&self, property_id: &str, tag_id: &str) -> Result<Tag> {
        self.api.get_record(
            &self.path(&format!("/properties/{property_id}/tags/{tag_id}")),
            "tag",
        )
    }

    /// Creates a tag; unless `create_if_exists`, an existing tag with the same
    /// name is returned instead.
    pub fn create_tag(
        &self,
        property_id: &str,
        name: &str,
        color: TagColor,
        create_if_exists: bool,
    ) -> Result<Tag> {
        if !create_if_exists {
            if let Some(tag) = self.get_tags(property_id)?.into_iter().find(|t| t.name == name) {
                log::warn!("tag '{name}' already exists, returning existing tag");
                return Ok(tag);
            }
        }
        let tag = NewTag {
            name: name.to_string(),
            color,
        };
        self.api.create_tag(&self.space_id, property_id, &tag)
    }

    pub fn update_tag(&self, property_id: &str, tag_id: &str, tag: &NewTag) -> Result<Tag> {
        let body = self.api.patch(
            &self.path(&format!("/properties/{property_id}/tags/{tag_id}")),
            &serde_json::to_value(tag)?,
        )?;
        unwrap_envelope(body, "tag")
    }

    pub fn delete_tag(&self, property_id: &str, tag_id: &str) -> Result<()> {
        self.api
            .delete(&self.path(&format!("/properties/{property_id}/tags/{tag_id}")))?;
        Ok(())
    }
}

/// Reads `{"space": ...}` or a bare space record.
pub(crate) fn space_from(body: Value) -> Result<Space> {
    if body.get("space").is_some() {
        unwrap_envelope(body, "space")
    } else {
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_API_URL;

    #[test]
    fn test_space_client_requires_id() {
        let api = ApiClient::new(DEFAULT_API_URL, "test").unwrap();
        let err = SpaceClient::new(&api, "").unwrap_err();
        assert!(matches!(
            err,
            AnytypeError::Validation(ValidationError::MissingField("space_id"))
        ));
        let space = SpaceClient::new(&api, "bafy-space").unwrap();
        assert_eq!(space.path("/objects"), "/spaces/bafy-space/objects");
    }

    #[test]
    fn test_adopt_moves_properties_into_the_space() {
        let api = ApiClient::new(DEFAULT_API_URL, "test").unwrap();
        let space = SpaceClient::new(&api, "space-b").unwrap();
        let mut diags = Diagnostics::new();

        let mut foreign = Property::with_format("genre", crate::PropertyFormat::MultiSelect);
        foreign.id = "p-in-a".to_string();
        foreign.space_id = "space-a".to_string();
        foreign.set_multi_select(vec![TagRef::Id("t-1".to_string())], &mut diags);
        let mut local = Property::with_format("notes", crate::PropertyFormat::Text);
        local.id = "p-notes".to_string();

        let mut object = TypedObject::untyped("Moved");
        object.space_id = "space-a".to_string();
        object.add_property(foreign);
        object.add_property(local);

        let adopted = space.adopt(&object).unwrap();
        assert_eq!(adopted.space_id, "space-b");
        let genre = adopted.property("genre").unwrap();
        assert_eq!(genre.space_id, "space-b");
        assert!(genre.id.is_empty());
        let notes = adopted.property("notes").unwrap();
        assert_eq!(notes.space_id, "space-b");
        assert_eq!(notes.id, "p-notes");
    }

    #[test]
    fn test_space_from_accepts_envelope_or_bare_record() {
        let wrapped = json!({"space": {"id": "s1", "name": "API"}});
        assert_eq!(space_from(wrapped).unwrap().name, "API");
        let bare = json!({"id": "s2", "name": "Home", "gateway_url": "http://127.0.0.1:47800"});
        let space = space_from(bare).unwrap();
        assert_eq!(space.id, "s2");
        assert_eq!(space.gateway_url, "http://127.0.0.1:47800");
    }
}
