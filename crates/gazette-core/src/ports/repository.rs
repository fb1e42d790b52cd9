use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Author, Category, Comment, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// `insert` and `update` are separate on purpose: primary keys are generated
/// by the application, so the storage layer cannot tell a fresh entity from
/// an existing one by looking at the key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Cascades along the ownership edges
    /// (an author's posts, a post's comments and category links, and so on).
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with identity lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Author repository.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// Find the author wrapping a given user, if any.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError>;
}

/// Post repository with the aggregate queries the rating service needs.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// SUM of `rating` over the author's posts, 0 when there are none.
    async fn sum_rating_by_author(&self, author_id: Uuid) -> Result<i64, RepoError>;
}

/// Comment repository with the aggregate queries the rating service needs.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// SUM of `rating` over comments written by this user, 0 when there are none.
    async fn sum_rating_by_user(&self, user_id: Uuid) -> Result<i64, RepoError>;

    /// SUM of `rating` over comments attached to any of this author's posts,
    /// 0 when there are none.
    async fn sum_rating_on_author_posts(&self, author_id: Uuid) -> Result<i64, RepoError>;
}

/// Category repository. Also owns the two many-to-many relations a category
/// participates in: post links and user subscriptions.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    /// Attach a post to a category. Idempotent at the storage layer.
    async fn add_post(&self, post_id: Uuid, category_id: Uuid) -> Result<(), RepoError>;

    /// Subscribe a user to a category.
    async fn subscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<(), RepoError>;

    /// All users subscribed to a category.
    async fn subscribers(&self, category_id: Uuid) -> Result<Vec<User>, RepoError>;
}
