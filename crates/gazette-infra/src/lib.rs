//! # Gazette Infrastructure
//!
//! Concrete implementations of the ports defined in `gazette-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory repositories only
//! - `postgres` - PostgreSQL support via SeaORM

pub mod database;

// Re-exports - In-Memory
pub use database::{
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryPostRepository, InMemoryUserRepository, MemoryStore,
};

pub use database::DatabaseConfig;

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConnections, PostgresAuthorRepository, PostgresCategoryRepository,
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};
