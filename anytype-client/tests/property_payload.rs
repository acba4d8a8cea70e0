use anytype_client::{
    AnytypeError, Diagnostic, Diagnostics, NewTag, Property, PropertyFormat, PropertyRecord,
    Result, Tag, TagColor, TagResolver, TagStore, TypeDef, TypeRecord, TypedObject,
    ValidationError,
};
use serde_json::{json, Value};
use std::cell::RefCell;

/// In-memory tag service that counts calls; created tags become visible to later lists.
#[derive(Default)]
struct RecordingTags {
    tags: RefCell<Vec<Tag>>,
    list_calls: RefCell<usize>,
    created: RefCell<Vec<NewTag>>,
}

impl RecordingTags {
    fn with(existing: &[(&str, &str)]) -> Self {
        let store = Self::default();
        store.tags.borrow_mut().extend(existing.iter().map(|(id, name)| Tag {
            id: id.to_string(),
            key: String::new(),
            name: name.to_string(),
            color: "grey".to_string(),
        }));
        store
    }

    fn list_calls(&self) -> usize {
        *self.list_calls.borrow()
    }
}

impl TagStore for RecordingTags {
    fn list_tags(&self, _space_id: &str, _property_id: &str) -> Result<Vec<Tag>> {
        *self.list_calls.borrow_mut() += 1;
        Ok(self.tags.borrow().clone())
    }

    fn create_tag(&self, _space_id: &str, _property_id: &str, tag: &NewTag) -> Result<Tag> {
        let created = Tag {
            id: format!("tag-{}", self.created.borrow().len() + 1),
            key: String::new(),
            name: tag.name.clone(),
            color: tag.color.to_string(),
        };
        self.created.borrow_mut().push(tag.clone());
        self.tags.borrow_mut().push(created.clone());
        Ok(created)
    }
}

fn genre_property() -> Property {
    let record: PropertyRecord = serde_json::from_value(json!({
        "id": "p-genre",
        "key": "genre",
        "name": "Genre",
        "format": "multi_select"
    }))
    .unwrap();
    Property::from_record(record, "space-1").unwrap()
}

fn book_type() -> TypeDef {
    let record: TypeRecord = serde_json::from_value(json!({
        "id": "ty-book",
        "key": "book",
        "name": "Book",
        "properties": [
            {"id": "p-genre", "key": "genre", "name": "Genre", "format": "multi_select"},
            {"id": "p-pages", "key": "pages", "name": "Pages", "format": "number"}
        ]
    }))
    .unwrap();
    TypeDef::from_record(record, "space-1").unwrap()
}

#[test]
fn existing_and_new_tag_names_resolve_in_order() {
    let store = RecordingTags::with(&[("t-scifi", "SciFi")]);
    let mut prop = genre_property();
    let mut diags = Diagnostics::new();
    prop.set_multi_select(vec!["SciFi", "Fiction"], &mut diags);

    let mut resolver = TagResolver::new(&store);
    let payload = prop.to_wire_payload(&mut resolver, &mut diags).unwrap();

    assert_eq!(payload, json!({"multi_select": ["t-scifi", "tag-1"]}));
    let created = store.created.borrow();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "Fiction");
    assert!(TagColor::ALL.contains(&created[0].color));

    assert_eq!(diags.created_tags(), vec!["Fiction"]);
    assert!(diags.iter().any(|d| matches!(
        d,
        Diagnostic::TagAutoCreated { property_id, tag_id, .. }
            if property_id == "p-genre" && tag_id == "tag-1"
    )));
    assert_eq!(diags.format_mismatches(), 0);
}

#[test]
fn one_object_creation_fetches_and_creates_each_tag_once() {
    let store = RecordingTags::with(&[]);
    let ty = book_type();
    let mut book = TypedObject::new("Dune", &ty);
    let mut diags = Diagnostics::new();
    book.property_mut("genre")
        .unwrap()
        .set_multi_select(vec!["Classic", "Classic", "Desert"], &mut diags);
    book.property_mut("pages").unwrap().set_integer(412, &mut diags);

    let mut resolver = TagResolver::cached(&store);
    let payload = book.build_create_payload(None, &mut resolver, &mut diags).unwrap();

    assert_eq!(store.list_calls(), 1);
    assert_eq!(store.created.borrow().len(), 2);
    assert_eq!(
        payload.properties,
        vec![
            json!({"key": "genre", "multi_select": ["tag-1", "tag-1", "tag-2"]}),
            json!({"key": "pages", "number": 412}),
        ]
    );
    assert_eq!(payload.type_key, "book");
}

#[test]
fn cache_handed_back_spans_several_objects() {
    let store = RecordingTags::with(&[("t-1", "Poetry")]);
    let ty = book_type();
    let mut diags = Diagnostics::new();

    let mut first = TypedObject::new("Odes", &ty);
    first
        .property_mut("genre")
        .unwrap()
        .set_multi_select("Poetry", &mut diags);
    let mut resolver = TagResolver::cached(&store);
    first.build_create_payload(None, &mut resolver, &mut diags).unwrap();
    let cache = resolver.into_cache().unwrap();

    let mut second = TypedObject::new("Elegies", &ty);
    second
        .property_mut("genre")
        .unwrap()
        .set_multi_select("Poetry", &mut diags);
    let mut resolver = TagResolver::with_cache(&store, cache);
    second.build_create_payload(None, &mut resolver, &mut diags).unwrap();

    assert_eq!(store.list_calls(), 1);
    assert!(store.created.borrow().is_empty());
    // both bare strings were widened to one-element lists
    assert!(diags
        .iter()
        .all(|d| matches!(d, Diagnostic::MultiSelectCoerced { .. })));
    assert_eq!(diags.len(), 2);
}

#[test]
fn type_key_comes_from_object_or_parameter() {
    let store = RecordingTags::default();
    let mut diags = Diagnostics::new();
    let mut resolver = TagResolver::new(&store);

    let loose = TypedObject::untyped("Loose note");
    let err = loose
        .build_create_payload(None, &mut resolver, &mut diags)
        .unwrap_err();
    assert!(matches!(err, AnytypeError::Validation(ValidationError::MissingType)));

    let untyped_param = TypeDef::new("Nameless");
    assert!(loose
        .build_create_payload(Some(&untyped_param), &mut resolver, &mut diags)
        .is_err());

    let payload = loose
        .build_create_payload(Some(&book_type()), &mut resolver, &mut diags)
        .unwrap();
    assert_eq!(payload.type_key, "book");
}

#[test]
fn hydrated_number_round_trips_unchanged() {
    let store = RecordingTags::default();
    let record: PropertyRecord = serde_json::from_value(json!({
        "id": "p1", "key": "k", "name": "N", "format": "number", "number": 42
    }))
    .unwrap();
    let prop = Property::from_record(record, "space-1").unwrap();
    let mut diags = Diagnostics::new();
    let mut resolver = TagResolver::new(&store);

    let first = prop.to_wire_payload(&mut resolver, &mut diags).unwrap();
    let second = prop.to_wire_payload(&mut resolver, &mut diags).unwrap();
    assert_eq!(first, json!({"number": 42}));
    assert_eq!(first, second);
    assert!(diags.is_empty());
    assert_eq!(store.list_calls(), 0);
}

#[test]
fn every_format_serializes_under_its_own_tag() {
    let store = RecordingTags::default();
    let mut resolver = TagResolver::new(&store);
    let mut diags = Diagnostics::new();

    let cases: Vec<(PropertyFormat, Value)> = vec![
        (PropertyFormat::Text, json!("hello")),
        (PropertyFormat::Number, json!(3.5)),
        (PropertyFormat::Select, json!("t-1")),
        (PropertyFormat::MultiSelect, json!([])),
        (PropertyFormat::Date, json!("2025-03-27")),
        (PropertyFormat::Files, json!(["f-1"])),
        (PropertyFormat::Checkbox, json!(true)),
        (PropertyFormat::Url, json!("https://anytype.io")),
        (PropertyFormat::Email, json!("a@b.c")),
        (PropertyFormat::Phone, json!("+1 555 0100")),
        (PropertyFormat::Objects, json!(["o-1"])),
    ];
    for (format, value) in cases {
        let mut prop = Property::with_format("k", format);
        prop.set(format, value.clone(), &mut diags).unwrap();
        let payload = prop.to_wire_payload(&mut resolver, &mut diags).unwrap();
        assert_eq!(payload, json!({ format.as_str(): value }), "{format}");
    }
    assert!(diags.is_empty());
}

#[test]
fn hydrated_tag_ids_reassigned_as_json_are_not_recreated() {
    let store = RecordingTags::with(&[("bafy-t1", "Fiction")]);
    let record: PropertyRecord = serde_json::from_value(json!({
        "id": "p-genre", "key": "genre", "name": "Genre",
        "format": "multi_select", "multi_select": ["bafy-t1"]
    }))
    .unwrap();
    let mut prop = Property::from_record(record, "space-1").unwrap();
    let mut diags = Diagnostics::new();
    prop.set(PropertyFormat::MultiSelect, json!(["bafy-t1"]), &mut diags)
        .unwrap();

    let mut resolver = TagResolver::new(&store);
    let payload = prop.to_wire_payload(&mut resolver, &mut diags).unwrap();
    assert_eq!(payload, json!({"multi_select": ["bafy-t1"]}));
    assert!(store.created.borrow().is_empty());
    assert!(diags.created_tags().is_empty());
}
