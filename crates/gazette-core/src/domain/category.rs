use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity - a named tag attachable to posts. Names are unique;
/// the storage layer enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

/// Explicit join entity linking one post to one category.
/// Carries nothing beyond the two foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCategory {
    pub post_id: Uuid,
    pub category_id: Uuid,
}

/// A user's subscription to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: Uuid,
    pub category_id: Uuid,
}
