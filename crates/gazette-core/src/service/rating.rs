use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Author, Comment, Post};
use crate::error::DomainError;
use crate::ports::{AuthorRepository, CommentRepository, PostRepository};

/// Weight of a post's own rating relative to comment ratings when
/// computing an author's reputation.
const POST_RATING_WEIGHT: i64 = 3;

/// Recomputes author reputation and applies like/dislike votes.
///
/// Every operation is a synchronous read-then-write against the injected
/// repositories; concurrent callers race last-write-wins, as the storage
/// collaborator's transaction model allows.
pub struct RatingService {
    authors: Arc<dyn AuthorRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl RatingService {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            authors,
            posts,
            comments,
        }
    }

    /// Recompute and persist an author's derived rating from three sums:
    /// the author's posts (weighted x3), the comments the author wrote,
    /// and the comments left on the author's posts. Each sum is 0 when the
    /// underlying set is empty, so an inactive author lands at exactly 0.
    ///
    /// Idempotent: absent intervening votes, a second call stores the same
    /// value.
    pub async fn update_author_rating(&self, author_id: Uuid) -> Result<Author, DomainError> {
        let mut author =
            self.authors
                .find_by_id(author_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity_type: "Author",
                    id: author_id,
                })?;

        let posts_rating = self.posts.sum_rating_by_author(author_id).await?;
        let comments_rating = self.comments.sum_rating_by_user(author.user_id).await?;
        let posts_comments_rating = self.comments.sum_rating_on_author_posts(author_id).await?;

        let new_rating =
            posts_rating * POST_RATING_WEIGHT + comments_rating + posts_comments_rating;
        author.rating = new_rating as i32;

        Ok(self.authors.update(author).await?)
    }

    /// Increment a post's rating by one and persist it.
    pub async fn like_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        let mut post = self.find_post(post_id).await?;
        post.like();
        Ok(self.posts.update(post).await?)
    }

    /// Decrement a post's rating by one and persist it.
    pub async fn dislike_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        let mut post = self.find_post(post_id).await?;
        post.dislike();
        Ok(self.posts.update(post).await?)
    }

    /// Increment a comment's rating by one and persist it.
    pub async fn like_comment(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        let mut comment = self.find_comment(comment_id).await?;
        comment.like();
        Ok(self.comments.update(comment).await?)
    }

    /// Decrement a comment's rating by one and persist it.
    pub async fn dislike_comment(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        let mut comment = self.find_comment(comment_id).await?;
        comment.dislike();
        Ok(self.comments.update(comment).await?)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id: post_id,
            })
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Comment",
                id: comment_id,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::PostKind;
    use crate::error::RepoError;
    use crate::ports::BaseRepository;

    use super::*;

    /// Single stub backing all three ports the service depends on.
    #[derive(Default)]
    struct StubStore {
        authors: Mutex<HashMap<Uuid, Author>>,
        posts: Mutex<HashMap<Uuid, Post>>,
        comments: Mutex<HashMap<Uuid, Comment>>,
    }

    #[async_trait]
    impl BaseRepository<Author, Uuid> for StubStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
            Ok(self.authors.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, entity: Author) -> Result<Author, RepoError> {
            self.authors.lock().unwrap().insert(entity.id, entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: Author) -> Result<Author, RepoError> {
            self.authors.lock().unwrap().insert(entity.id, entity.clone());
            Ok(entity)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.authors.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl AuthorRepository for StubStore {
        async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
            Ok(self
                .authors
                .lock()
                .unwrap()
                .values()
                .find(|a| a.user_id == user_id)
                .cloned())
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for StubStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.posts.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
            self.posts.lock().unwrap().insert(entity.id, entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: Post) -> Result<Post, RepoError> {
            self.posts.lock().unwrap().insert(entity.id, entity.clone());
            Ok(entity)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.posts.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl PostRepository for StubStore {
        async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.author_id == author_id)
                .cloned()
                .collect())
        }

        async fn sum_rating_by_author(&self, author_id: Uuid) -> Result<i64, RepoError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.author_id == author_id)
                .map(|p| i64::from(p.rating))
                .sum())
        }
    }

    #[async_trait]
    impl BaseRepository<Comment, Uuid> for StubStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
            Ok(self.comments.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
            self.comments.lock().unwrap().insert(entity.id, entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
            self.comments.lock().unwrap().insert(entity.id, entity.clone());
            Ok(entity)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.comments.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl CommentRepository for StubStore {
        async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
            Ok(self
                .comments
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.post_id == post_id)
                .cloned()
                .collect())
        }

        async fn sum_rating_by_user(&self, user_id: Uuid) -> Result<i64, RepoError> {
            Ok(self
                .comments
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.user_id == user_id)
                .map(|c| i64::from(c.rating))
                .sum())
        }

        async fn sum_rating_on_author_posts(&self, author_id: Uuid) -> Result<i64, RepoError> {
            let post_ids: Vec<Uuid> = self
                .posts
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.author_id == author_id)
                .map(|p| p.id)
                .collect();

            Ok(self
                .comments
                .lock()
                .unwrap()
                .values()
                .filter(|c| post_ids.contains(&c.post_id))
                .map(|c| i64::from(c.rating))
                .sum())
        }
    }

    fn service(store: &Arc<StubStore>) -> RatingService {
        RatingService::new(store.clone(), store.clone(), store.clone())
    }

    // `StubStore` implements `BaseRepository` for three entity types, so
    // calls on it need the entity spelled out.
    async fn seed_author(store: &StubStore, author: Author) -> Author {
        BaseRepository::<Author, Uuid>::insert(store, author)
            .await
            .unwrap()
    }

    async fn stored_author(store: &StubStore, id: Uuid) -> Option<Author> {
        BaseRepository::<Author, Uuid>::find_by_id(store, id)
            .await
            .unwrap()
    }

    async fn seed_post(store: &StubStore, author_id: Uuid, rating: i32) -> Post {
        let mut post = Post::new(
            author_id,
            PostKind::Article,
            "title".to_string(),
            "text".to_string(),
        );
        post.rating = rating;
        BaseRepository::<Post, Uuid>::insert(store, post).await.unwrap()
    }

    async fn seed_comment(store: &StubStore, user_id: Uuid, post_id: Uuid, rating: i32) -> Comment {
        let mut comment = Comment::new(user_id, post_id, "comment".to_string());
        comment.rating = rating;
        BaseRepository::<Comment, Uuid>::insert(store, comment)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn author_rating_is_posts_x3_plus_comments_plus_post_comments() {
        let store = Arc::new(StubStore::default());
        let svc = service(&store);

        let author = seed_author(&store, Author::new(Uuid::new_v4())).await;
        let stranger_id = Uuid::new_v4();

        // Posts by the author: 4 + 6 = 10.
        let p1 = seed_post(&store, author.id, 4).await;
        seed_post(&store, author.id, 6).await;

        // Comment written by the author's user somewhere else: 5.
        let elsewhere = seed_post(&store, Uuid::new_v4(), 0).await;
        seed_comment(&store, author.user_id, elsewhere.id, 5).await;

        // Comment left on the author's post by someone else: 7.
        seed_comment(&store, stranger_id, p1.id, 7).await;

        let updated = svc.update_author_rating(author.id).await.unwrap();
        assert_eq!(updated.rating, 10 * 3 + 5 + 7);

        // Persisted, not just returned.
        let stored = stored_author(&store, author.id).await.unwrap();
        assert_eq!(stored.rating, 42);
    }

    #[tokio::test]
    async fn inactive_author_rating_is_zero() {
        let store = Arc::new(StubStore::default());
        let svc = service(&store);

        let mut author = Author::new(Uuid::new_v4());
        author.rating = 99;
        seed_author(&store, author.clone()).await;

        let updated = svc.update_author_rating(author.id).await.unwrap();
        assert_eq!(updated.rating, 0);
    }

    #[tokio::test]
    async fn update_author_rating_is_idempotent() {
        let store = Arc::new(StubStore::default());
        let svc = service(&store);

        let author = seed_author(&store, Author::new(Uuid::new_v4())).await;
        seed_post(&store, author.id, 4).await;

        let first = svc.update_author_rating(author.id).await.unwrap();
        let second = svc.update_author_rating(author.id).await.unwrap();
        assert_eq!(first.rating, second.rating);
    }

    #[tokio::test]
    async fn unknown_author_is_not_found() {
        let store = Arc::new(StubStore::default());
        let svc = service(&store);

        let err = svc.update_author_rating(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { entity_type: "Author", .. }
        ));
    }
}
