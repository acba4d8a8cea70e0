//! Views of collections and sets.

use serde::Deserialize;
use serde_json::Value;

/// One view (grid, list, gallery, ...) of a collection or set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListView {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layout: String,
    /// Filters and sorts are passed through untouched.
    #[serde(default)]
    pub filters: Vec<Value>,
    #[serde(default)]
    pub sorts: Vec<Value>,
    /// The collection or set the view belongs to; filled in by the client.
    #[serde(skip)]
    pub list_id: String,
    #[serde(skip)]
    pub space_id: String,
}
