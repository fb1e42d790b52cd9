//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

/// Post kind as stored in the database ("ART" / "NEW").
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum PostKind {
    #[sea_orm(string_value = "ART")]
    Article,
    #[sea_orm(string_value = "NEW")]
    News,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub rating: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::post_category::Entity")]
    PostCategory,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

// Many-to-many to categories through the explicit join entity.
impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_category::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<PostKind> for gazette_core::domain::PostKind {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::Article => Self::Article,
            PostKind::News => Self::News,
        }
    }
}

impl From<gazette_core::domain::PostKind> for PostKind {
    fn from(kind: gazette_core::domain::PostKind) -> Self {
        match kind {
            gazette_core::domain::PostKind::Article => Self::Article,
            gazette_core::domain::PostKind::News => Self::News,
        }
    }
}

impl From<Model> for gazette_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            kind: model.kind.into(),
            title: model.title,
            text: model.text,
            rating: model.rating,
            created_at: model.created_at.into(),
        }
    }
}

impl From<gazette_core::domain::Post> for ActiveModel {
    fn from(post: gazette_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            kind: Set(post.kind.into()),
            title: Set(post.title),
            text: Set(post.text),
            rating: Set(post.rating),
            created_at: Set(post.created_at.into()),
        }
    }
}
