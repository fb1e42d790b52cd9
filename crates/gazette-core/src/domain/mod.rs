//! Domain entities - the core business objects.

mod author;
mod category;
mod comment;
mod post;
mod user;

pub use author::Author;
pub use category::{Category, PostCategory, Subscription};
pub use comment::Comment;
pub use post::{Post, PostKind};
pub use user::User;
