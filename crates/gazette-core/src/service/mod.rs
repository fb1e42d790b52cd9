//! Domain services - logic that spans repositories.

mod rating;

pub use rating::RatingService;
