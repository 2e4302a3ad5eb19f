//! Configuration for the editor
//!
//! Provides types and parsing for `pxe.toml` configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
