//! Tags, the color palette, and name-to-id resolution for multi-select values.

use crate::{Diagnostic, Diagnostics, Result};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The fixed palette shared by tags and icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Grey,
    Yellow,
    Orange,
    Red,
    Pink,
    Purple,
    Blue,
    Ice,
    Teal,
    Lime,
}

impl TagColor {
    pub const ALL: [TagColor; 10] = [
        Self::Grey,
        Self::Yellow,
        Self::Orange,
        Self::Red,
        Self::Pink,
        Self::Purple,
        Self::Blue,
        Self::Ice,
        Self::Teal,
        Self::Lime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grey => "grey",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Ice => "ice",
            Self::Teal => "teal",
            Self::Lime => "lime",
        }
    }

    /// A color drawn uniformly at random from the palette.
    pub fn random() -> Self {
        *Self::ALL.choose(&mut rand::rng()).unwrap_or(&Self::Grey)
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for TagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, colored option of a select or multi-select property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub key: String,
    pub name: String,
    /// Kept as the raw string so colors added by newer app versions still load.
    #[serde(default)]
    pub color: String,
}

/// Body for creating or updating a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTag {
    pub name: String,
    pub color: TagColor,
}

/// The tag operations a [`TagResolver`] needs from the backend.
///
/// [`ApiClient`](crate::ApiClient) implements this against the HTTP API.
pub trait TagStore {
    /// Every tag of the property, across all pages.
    fn list_tags(&self, space_id: &str, property_id: &str) -> Result<Vec<Tag>>;

    fn create_tag(&self, space_id: &str, property_id: &str, tag: &NewTag) -> Result<Tag>;
}

/// Tag lists remembered per `(space_id, property_id)`.
#[derive(Debug, Clone, Default)]
pub struct TagCache {
    tags: HashMap<(String, String), Vec<Tag>>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Forgets everything; the next lookup re-fetches.
    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

/// Resolves multi-select display names to tag ids, creating missing tags.
///
/// Without a cache every lookup re-fetches the property's full tag list. With
/// one, each list is fetched once and tags created during the batch are added
/// to it, so one batch never creates the same name twice. Two resolvers racing
/// on the same unknown name can still both create it.
pub struct TagResolver<'a, S: TagStore + ?Sized> {
    store: &'a S,
    cache: Option<TagCache>,
}

impl<'a, S: TagStore + ?Sized> TagResolver<'a, S> {
    /// A resolver that fetches on every lookup.
    pub fn new(store: &'a S) -> Self {
        Self { store, cache: None }
    }

    /// A resolver with a fresh cache, meant to live for one batch.
    pub fn cached(store: &'a S) -> Self {
        Self::with_cache(store, TagCache::new())
    }

    /// A resolver continuing from a cache kept by the caller.
    pub fn with_cache(store: &'a S, cache: TagCache) -> Self {
        Self {
            store,
            cache: Some(cache),
        }
    }

    /// Hands the cache back so the caller can reuse it across calls.
    pub fn into_cache(self) -> Option<TagCache> {
        self.cache
    }

    /// Returns the tag whose id is `name`, else the tag named `name` (exact,
    /// case-sensitive), creating it with a random palette color when absent.
    ///
    /// The id match lets hydrated id lists pass through a dynamic setter
    /// without creating tags named after ids.
    ///
    /// # Errors
    ///
    /// Propagates errors from the [`TagStore`] unchanged.
    pub fn find_or_create(
        &mut self,
        space_id: &str,
        property_id: &str,
        name: &str,
        diags: &mut Diagnostics,
    ) -> Result<Tag> {
        let slot = (space_id.to_string(), property_id.to_string());

        let existing = match self.cache.as_mut() {
            Some(cache) => {
                if !cache.tags.contains_key(&slot) {
                    let fetched = self.store.list_tags(space_id, property_id)?;
                    cache.tags.insert(slot.clone(), fetched);
                }
                cache
                    .tags
                    .get(&slot)
                    .and_then(|tags| lookup(tags, name))
                    .cloned()
            }
            None => lookup(&self.store.list_tags(space_id, property_id)?, name).cloned(),
        };
        if let Some(tag) = existing {
            return Ok(tag);
        }

        let color = TagColor::random();
        let tag = self.store.create_tag(
            space_id,
            property_id,
            &NewTag {
                name: name.to_string(),
                color,
            },
        )?;
        log::info!("created tag '{}' ({}) on property {}", tag.name, tag.id, property_id);
        diags.push(Diagnostic::TagAutoCreated {
            property_id: property_id.to_string(),
            name: name.to_string(),
            tag_id: tag.id.clone(),
            color: color.to_string(),
        });

        if let Some(cache) = self.cache.as_mut() {
            cache.tags.entry(slot).or_default().push(tag.clone());
        }
        Ok(tag)
    }
}

fn lookup<'t>(tags: &'t [Tag], name: &str) -> Option<&'t Tag> {
    tags.iter()
        .find(|t| t.id == name)
        .or_else(|| tags.iter().find(|t| t.name == name))
}
