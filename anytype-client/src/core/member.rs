//! Space members.

use crate::core::icon;
use crate::Icon;
use serde::{Deserialize, Serialize};

/// A participant of a space.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub global_name: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "icon::lenient")]
    pub icon: Option<Icon>,
}

/// What a member may do in the space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Editor,
    Viewer,
    #[default]
    #[serde(other)]
    NoPermission,
}
