use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author entity - wraps exactly one user and carries a derived reputation
/// score. The `rating` field is a cached aggregate; it is recomputed by
/// `RatingService::update_author_rating` and never edited directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
}

impl Author {
    /// Create a new author for an existing user, starting at rating 0.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            rating: 0,
        }
    }
}
