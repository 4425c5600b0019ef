//! Translation groups: the in-memory graph, its persisted store, per-object language
//! tags and the host event hooks.

mod graph;
mod lifecycle;
mod store;
mod tagger;

pub use graph::{LinkRejection, PruneReport, TranslationGraph};
pub use lifecycle::ContentLifecycle;
pub use store::TranslationGroupStore;
pub use tagger::{ContentLanguageTagger, LANGUAGE_TAXONOMY};
