//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QuerySelect, RelationTrait,
    Set,
};
use uuid::Uuid;

use gazette_core::domain::{Author, Category, Comment, Post, User};
use gazette_core::error::RepoError;
use gazette_core::ports::{
    AuthorRepository, CategoryRepository, CommentRepository, PostRepository, UserRepository,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::entity::subscription::{self, Entity as SubscriptionEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Result row of a SUM aggregation. SQL SUM over an empty set is NULL,
/// hence the Option; callers coalesce to 0.
#[derive(FromQueryResult)]
struct RatingSum {
    total: Option<i64>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let result = AuthorEntity::find()
            .filter(author::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn sum_rating_by_author(&self, author_id: Uuid) -> Result<i64, RepoError> {
        tracing::debug!(%author_id, "Summing post ratings");

        let row = PostEntity::find()
            .select_only()
            .column_as(post::Column::Rating.sum(), "total")
            .filter(post::Column::AuthorId.eq(author_id))
            .into_model::<RatingSum>()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.and_then(|r| r.total).unwrap_or(0))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn sum_rating_by_user(&self, user_id: Uuid) -> Result<i64, RepoError> {
        tracing::debug!(%user_id, "Summing comment ratings");

        let row = CommentEntity::find()
            .select_only()
            .column_as(comment::Column::Rating.sum(), "total")
            .filter(comment::Column::UserId.eq(user_id))
            .into_model::<RatingSum>()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.and_then(|r| r.total).unwrap_or(0))
    }

    async fn sum_rating_on_author_posts(&self, author_id: Uuid) -> Result<i64, RepoError> {
        tracing::debug!(%author_id, "Summing ratings of comments on author posts");

        let row = CommentEntity::find()
            .select_only()
            .column_as(comment::Column::Rating.sum(), "total")
            .inner_join(PostEntity)
            .filter(post::Column::AuthorId.eq(author_id))
            .into_model::<RatingSum>()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.and_then(|r| r.total).unwrap_or(0))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn add_post(&self, post_id: Uuid, category_id: Uuid) -> Result<(), RepoError> {
        let link = post_category::ActiveModel {
            post_id: Set(post_id),
            category_id: Set(category_id),
        };

        // Re-linking an already linked pair is a no-op.
        PostCategoryEntity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    post_category::Column::PostId,
                    post_category::Column::CategoryId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn subscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<(), RepoError> {
        let sub = subscription::ActiveModel {
            user_id: Set(user_id),
            category_id: Set(category_id),
        };

        SubscriptionEntity::insert(sub)
            .on_conflict(
                OnConflict::columns([
                    subscription::Column::UserId,
                    subscription::Column::CategoryId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn subscribers(&self, category_id: Uuid) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .join(JoinType::InnerJoin, subscription::Relation::User.def().rev())
            .filter(subscription::Column::CategoryId.eq(category_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
