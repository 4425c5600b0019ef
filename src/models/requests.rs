//! API request and response bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    Actor, ContentId, ContentObject, ContentStatus, GroupId, Language, MetaMap, TranslationMap,
};

/// Revision info returned by the revision endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

/// Request body for creating a content object in the reference host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub content_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub excerpt: String,
    pub parent_id: Option<ContentId>,
    #[serde(default)]
    pub menu_order: i64,
    #[serde(default)]
    pub author_id: i64,
    pub status: Option<ContentStatus>,
    /// Explicit language; the default language is assigned when absent.
    pub language: Option<String>,
    /// Term slugs keyed by taxonomy.
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub meta: MetaMap,
    pub featured_asset_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLanguageRequest {
    pub language: String,
}

/// Request body for replacing a whole translation map. Values are sanitized, so raw
/// JSON is accepted here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTranslationsRequest {
    #[serde(default)]
    pub translations: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRequest {
    pub actor: Actor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDefaultLanguageRequest {
    pub slug: String,
}

/// A content object together with its language tag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentView {
    #[serde(flatten)]
    pub object: ContentObject,
    pub language: Option<String>,
}

/// The translation group a content object belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationsView {
    pub content_id: ContentId,
    pub group_id: Option<GroupId>,
    pub translations: TranslationMap,
}

/// Registered languages and the current default.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesView {
    pub languages: Vec<Language>,
    pub default_language: Option<String>,
}
