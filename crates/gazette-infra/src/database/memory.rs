//! In-memory repositories - used as the test backend and for minimal
//! deployments without a database.
//!
//! All repositories share one [`MemoryStore`] so that cross-entity behavior
//! (cascading deletes, aggregate sums) works the same way the relational
//! schema does. Note: data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use gazette_core::domain::{Author, Category, Comment, Post, PostCategory, Subscription, User};
use gazette_core::error::RepoError;
use gazette_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, PostRepository,
    UserRepository,
};

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    authors: RwLock<HashMap<Uuid, Author>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
    post_categories: RwLock<Vec<PostCategory>>,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Remove everything owned by the given posts: their comments and
    /// their category links.
    async fn cascade_posts(&self, post_ids: &[Uuid]) {
        self.comments
            .write()
            .await
            .retain(|_, c| !post_ids.contains(&c.post_id));
        self.post_categories
            .write()
            .await
            .retain(|l| !post_ids.contains(&l.post_id));
    }

    /// Remove everything owned by the given authors, starting with their
    /// posts.
    async fn cascade_authors(&self, author_ids: &[Uuid]) {
        let removed: Vec<Uuid> = {
            let mut posts = self.posts.write().await;
            let ids: Vec<Uuid> = posts
                .values()
                .filter(|p| author_ids.contains(&p.author_id))
                .map(|p| p.id)
                .collect();
            posts.retain(|_, p| !author_ids.contains(&p.author_id));
            ids
        };
        self.cascade_posts(&removed).await;
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

/// In-memory author repository.
pub struct InMemoryAuthorRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryAuthorRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

/// In-memory category repository.
pub struct InMemoryCategoryRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryCategoryRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

/// In-memory comment repository.
pub struct InMemoryCommentRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryCommentRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if users.values().any(|u| u.username == entity.username) {
            return Err(RepoError::Constraint(format!(
                "duplicate username: {}",
                entity.username
            )));
        }
        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if !users.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.users.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let authors: Vec<Uuid> = {
            let mut map = self.store.authors.write().await;
            let ids: Vec<Uuid> = map
                .values()
                .filter(|a| a.user_id == id)
                .map(|a| a.id)
                .collect();
            map.retain(|_, a| a.user_id != id);
            ids
        };
        self.store.cascade_authors(&authors).await;

        self.store
            .comments
            .write()
            .await
            .retain(|_, c| c.user_id != id);
        self.store
            .subscriptions
            .write()
            .await
            .retain(|s| s.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryAuthorRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.store.authors.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Author) -> Result<Author, RepoError> {
        let mut authors = self.store.authors.write().await;
        if authors.values().any(|a| a.user_id == entity.user_id) {
            return Err(RepoError::Constraint(format!(
                "duplicate author for user {}",
                entity.user_id
            )));
        }
        authors.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Author) -> Result<Author, RepoError> {
        let mut authors = self.store.authors.write().await;
        if !authors.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        authors.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.authors.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        self.store.cascade_authors(&[id]).await;
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self
            .store
            .authors
            .read()
            .await
            .values()
            .find(|a| a.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        self.store
            .posts
            .write()
            .await
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        if !posts.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.posts.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        self.store.cascade_posts(&[id]).await;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .store
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn sum_rating_by_author(&self, author_id: Uuid) -> Result<i64, RepoError> {
        Ok(self
            .store
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.author_id == author_id)
            .map(|p| i64::from(p.rating))
            .sum())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.comments.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.store
            .comments
            .write()
            .await
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.store.comments.write().await;
        if !comments.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        comments.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.comments.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        Ok(self
            .store
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn sum_rating_by_user(&self, user_id: Uuid) -> Result<i64, RepoError> {
        Ok(self
            .store
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| i64::from(c.rating))
            .sum())
    }

    async fn sum_rating_on_author_posts(&self, author_id: Uuid) -> Result<i64, RepoError> {
        let post_ids: Vec<Uuid> = {
            self.store
                .posts
                .read()
                .await
                .values()
                .filter(|p| p.author_id == author_id)
                .map(|p| p.id)
                .collect()
        };

        Ok(self
            .store
            .comments
            .read()
            .await
            .values()
            .filter(|c| post_ids.contains(&c.post_id))
            .map(|c| i64::from(c.rating))
            .sum())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.categories.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Category) -> Result<Category, RepoError> {
        let mut categories = self.store.categories.write().await;
        if categories.values().any(|c| c.name == entity.name) {
            return Err(RepoError::Constraint(format!(
                "duplicate category name: {}",
                entity.name
            )));
        }
        categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Category) -> Result<Category, RepoError> {
        let mut categories = self.store.categories.write().await;
        if !categories.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        if categories
            .values()
            .any(|c| c.id != entity.id && c.name == entity.name)
        {
            return Err(RepoError::Constraint(format!(
                "duplicate category name: {}",
                entity.name
            )));
        }
        categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.categories.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        // Links and subscriptions go; posts stay.
        self.store
            .post_categories
            .write()
            .await
            .retain(|l| l.category_id != id);
        self.store
            .subscriptions
            .write()
            .await
            .retain(|s| s.category_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .store
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn add_post(&self, post_id: Uuid, category_id: Uuid) -> Result<(), RepoError> {
        let link = PostCategory {
            post_id,
            category_id,
        };
        let mut links = self.store.post_categories.write().await;
        if !links.contains(&link) {
            links.push(link);
        }
        Ok(())
    }

    async fn subscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<(), RepoError> {
        let sub = Subscription {
            user_id,
            category_id,
        };
        let mut subs = self.store.subscriptions.write().await;
        if !subs.contains(&sub) {
            subs.push(sub);
        }
        Ok(())
    }

    async fn subscribers(&self, category_id: Uuid) -> Result<Vec<User>, RepoError> {
        let user_ids: Vec<Uuid> = {
            self.store
                .subscriptions
                .read()
                .await
                .iter()
                .filter(|s| s.category_id == category_id)
                .map(|s| s.user_id)
                .collect()
        };

        let users = self.store.users.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gazette_core::domain::PostKind;
    use gazette_core::service::RatingService;

    use super::*;

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        authors: Arc<InMemoryAuthorRepository>,
        categories: Arc<InMemoryCategoryRepository>,
        posts: Arc<InMemoryPostRepository>,
        comments: Arc<InMemoryCommentRepository>,
        service: RatingService,
    }

    impl Fixture {
        fn store(&self) -> &MemoryStore {
            &self.users.store
        }
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let users = Arc::new(InMemoryUserRepository::new(store.clone()));
        let authors = Arc::new(InMemoryAuthorRepository::new(store.clone()));
        let categories = Arc::new(InMemoryCategoryRepository::new(store.clone()));
        let posts = Arc::new(InMemoryPostRepository::new(store.clone()));
        let comments = Arc::new(InMemoryCommentRepository::new(store));
        let service = RatingService::new(authors.clone(), posts.clone(), comments.clone());
        Fixture {
            users,
            authors,
            categories,
            posts,
            comments,
            service,
        }
    }

    async fn seed_author(fx: &Fixture, username: &str) -> Author {
        let user = fx.users.insert(User::new(username.to_string())).await.unwrap();
        fx.authors.insert(Author::new(user.id)).await.unwrap()
    }

    async fn seed_post(fx: &Fixture, author: &Author, rating: i32) -> Post {
        let mut post = Post::new(
            author.id,
            PostKind::Article,
            "title".to_string(),
            "text".to_string(),
        );
        post.rating = rating;
        fx.posts.insert(post).await.unwrap()
    }

    async fn seed_comment(fx: &Fixture, user_id: Uuid, post_id: Uuid, rating: i32) -> Comment {
        let mut comment = Comment::new(user_id, post_id, "comment".to_string());
        comment.rating = rating;
        fx.comments.insert(comment).await.unwrap()
    }

    #[tokio::test]
    async fn inactive_author_rating_is_zero() {
        let fx = fixture();
        let mut author = seed_author(&fx, "quiet").await;

        // A stale cached value must be overwritten, not kept.
        author.rating = 99;
        fx.authors.update(author.clone()).await.unwrap();

        let updated = fx.service.update_author_rating(author.id).await.unwrap();
        assert_eq!(updated.rating, 0);
    }

    #[tokio::test]
    async fn author_rating_is_posts_x3_plus_comments_plus_post_comments() {
        let fx = fixture();
        let writer = seed_author(&fx, "writer").await;
        let other = seed_author(&fx, "other").await;

        // Posts by the writer: 4 + 6 = 10.
        let p1 = seed_post(&fx, &writer, 4).await;
        seed_post(&fx, &writer, 6).await;

        // Comment written by the writer elsewhere: 5.
        let other_post = seed_post(&fx, &other, 0).await;
        seed_comment(&fx, writer.user_id, other_post.id, 5).await;

        // Comment left on the writer's post by someone else: 7.
        seed_comment(&fx, other.user_id, p1.id, 7).await;

        let updated = fx.service.update_author_rating(writer.id).await.unwrap();
        assert_eq!(updated.rating, 10 * 3 + 5 + 7);

        // Persisted, not just returned.
        let stored = fx.authors.find_by_id(writer.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 42);
    }

    #[tokio::test]
    async fn update_author_rating_is_idempotent() {
        let fx = fixture();
        let writer = seed_author(&fx, "writer").await;
        seed_post(&fx, &writer, 4).await;

        let first = fx.service.update_author_rating(writer.id).await.unwrap();
        let second = fx.service.update_author_rating(writer.id).await.unwrap();
        assert_eq!(first.rating, second.rating);
    }

    #[tokio::test]
    async fn update_author_rating_for_unknown_author_fails() {
        let fx = fixture();
        let err = fx
            .service
            .update_author_rating(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            gazette_core::DomainError::NotFound { entity_type: "Author", .. }
        ));
    }

    #[tokio::test]
    async fn like_then_dislike_restores_post_rating() {
        let fx = fixture();
        let writer = seed_author(&fx, "writer").await;
        let post = seed_post(&fx, &writer, 3).await;

        fx.service.like_post(post.id).await.unwrap();
        fx.service.dislike_post(post.id).await.unwrap();

        let stored = fx.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 3);
    }

    #[tokio::test]
    async fn comment_votes_are_persisted() {
        let fx = fixture();
        let writer = seed_author(&fx, "writer").await;
        let post = seed_post(&fx, &writer, 0).await;
        let comment = seed_comment(&fx, writer.user_id, post.id, 0).await;

        fx.service.like_comment(comment.id).await.unwrap();
        fx.service.like_comment(comment.id).await.unwrap();
        fx.service.dislike_comment(comment.id).await.unwrap();

        let stored = fx.comments.find_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 1);
    }

    #[tokio::test]
    async fn deleting_post_cascades_to_comments_and_links() {
        let fx = fixture();
        let writer = seed_author(&fx, "writer").await;
        let post = seed_post(&fx, &writer, 0).await;
        let comment = seed_comment(&fx, writer.user_id, post.id, 1).await;

        let category = fx
            .categories
            .insert(Category::new("politics".to_string()))
            .await
            .unwrap();
        fx.categories.add_post(post.id, category.id).await.unwrap();

        fx.posts.delete(post.id).await.unwrap();

        assert!(fx.comments.find_by_id(comment.id).await.unwrap().is_none());
        assert!(fx.store().post_categories.read().await.is_empty());
    }

    #[tokio::test]
    async fn deleting_category_keeps_posts() {
        let fx = fixture();
        let writer = seed_author(&fx, "writer").await;
        let post = seed_post(&fx, &writer, 0).await;

        let category = fx
            .categories
            .insert(Category::new("sports".to_string()))
            .await
            .unwrap();
        fx.categories.add_post(post.id, category.id).await.unwrap();

        fx.categories.delete(category.id).await.unwrap();

        assert!(fx.posts.find_by_id(post.id).await.unwrap().is_some());
        assert!(fx.store().post_categories.read().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_category_name_is_rejected() {
        let fx = fixture();
        fx.categories
            .insert(Category::new("culture".to_string()))
            .await
            .unwrap();

        let err = fx
            .categories
            .insert(Category::new("culture".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn subscribers_lists_subscribed_users() {
        let fx = fixture();
        let user = fx.users.insert(User::new("reader".to_string())).await.unwrap();
        let category = fx
            .categories
            .insert(Category::new("tech".to_string()))
            .await
            .unwrap();

        fx.categories.subscribe(user.id, category.id).await.unwrap();
        // Subscribing twice must not duplicate the row.
        fx.categories.subscribe(user.id, category.id).await.unwrap();

        let subs = fx.categories.subscribers(category.id).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].username, "reader");
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_author_posts_and_comments() {
        let fx = fixture();
        let writer = seed_author(&fx, "writer").await;
        let post = seed_post(&fx, &writer, 0).await;
        let comment = seed_comment(&fx, writer.user_id, post.id, 0).await;

        fx.users.delete(writer.user_id).await.unwrap();

        assert!(fx.authors.find_by_id(writer.id).await.unwrap().is_none());
        assert!(fx.posts.find_by_id(post.id).await.unwrap().is_none());
        assert!(fx.comments.find_by_id(comment.id).await.unwrap().is_none());
    }
}
