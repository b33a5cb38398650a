//! Bookshelf application library
//!
//! Account, sign-in and saved-book operations exposed over GraphQL, wired on
//! top of the bookshelf crates.

pub mod app;
pub mod modules;

pub use app::App;
pub use modules::*;
