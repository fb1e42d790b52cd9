//! SeaORM entity definitions mirroring the domain model.

pub mod author;
pub mod category;
pub mod comment;
pub mod post;
pub mod post_category;
pub mod subscription;
pub mod user;
