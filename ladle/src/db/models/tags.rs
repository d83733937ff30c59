//! Database models for tags.

use crate::types::{TagId, UserId};
use chrono::{DateTime, Utc};
use std::fmt;

/// Database request for creating a new tag
#[derive(Debug, Clone)]
pub struct TagCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
}

/// Database request for renaming a tag
#[derive(Debug, Clone, Default)]
pub struct TagUpdateDBRequest {
    pub name: Option<String>,
}

/// Database response for a tag
#[derive(Debug, Clone)]
pub struct TagDBResponse {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for TagDBResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
