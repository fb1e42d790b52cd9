use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - user feedback attached to one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub rating: i32,
    /// Stamped once at construction, never mutated afterwards.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment with a generated ID and creation timestamp.
    pub fn new(user_id: Uuid, post_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            text,
            rating: 0,
            created_at: Utc::now(),
        }
    }

    /// Bump the rating by one. No upper bound.
    pub fn like(&mut self) {
        self.rating += 1;
    }

    /// Drop the rating by one. The rating may go negative.
    pub fn dislike(&mut self) {
        self.rating -= 1;
    }
}
