use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters of `text` included in a preview.
const PREVIEW_LEN: usize = 124;

/// What kind of publication a post is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    #[default]
    Article,
    News,
}

/// Post entity - an article or news item owned by one author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub text: String,
    pub rating: i32,
    /// Stamped once at construction, never mutated afterwards.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with a generated ID and creation timestamp.
    pub fn new(author_id: Uuid, kind: PostKind, title: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            kind,
            title,
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

    /// First 124 characters of the text followed by an ellipsis marker.
    ///
    /// The marker is appended even when the text is shorter than the cutoff.
    /// Counted in characters, not bytes, so multi-byte text is never split.
    pub fn preview(&self) -> String {
        let head: String = self.text.chars().take(PREVIEW_LEN).collect();
        format!("{head}...")
    }
}
