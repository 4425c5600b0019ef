//! Data models for the translation graph service.
//!
//! Persisted records, content objects seen through the host, and API request bodies.

mod content;
mod group;
mod language;
mod requests;

pub use content::*;
pub use group::*;
pub use language::*;
pub use requests::*;
