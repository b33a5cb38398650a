//! Saved-book domain types shared by the user operations.

pub mod models;

pub use models::{BookInput, SavedBook};
