//! Persisted translation group records.
//!
//! Both records are decoded from raw JSON through `From<serde_json::Value>`, which is
//! the only place entries are validated. Malformed groups, non-positive ids and empty
//! language keys are dropped instead of failing the read.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ContentId, LangSlug};

/// Identifier of a translation group (UUID v4 text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Language slot map of one group.
pub type TranslationMap = BTreeMap<LangSlug, ContentId>;

/// One translation group: the content type shared by its members and one content id
/// per language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct TranslationGroup {
    pub content_type: String,
    pub translations: TranslationMap,
}

impl TranslationGroup {
    pub fn new(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            translations: TranslationMap::new(),
        }
    }

    pub fn references(&self, id: ContentId) -> bool {
        self.translations.values().any(|v| *v == id)
    }
}

impl From<Value> for TranslationGroup {
    fn from(value: Value) -> Self {
        let content_type = value
            .get("contentType")
            .or_else(|| value.get("post_type"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let translations = value
            .get("translations")
            .and_then(Value::as_object)
            .map(|raw| sanitize_translations(raw.iter().map(|(k, v)| (k.as_str(), v))))
            .unwrap_or_default();

        Self {
            content_type,
            translations,
        }
    }
}

/// Build a translation map from raw pairs, dropping invalid keys and ids.
/// When two raw keys sanitize to the same slug the later one wins.
pub fn sanitize_translations<'a>(
    raw: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> TranslationMap {
    raw.into_iter()
        .filter_map(|(lang, id)| Some((LangSlug::sanitize(lang)?, ContentId::from_json(id)?)))
        .collect()
}

/// The groups record: `{ "groups": { groupId: TranslationGroup } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct GroupsRecord {
    pub groups: BTreeMap<GroupId, TranslationGroup>,
}

impl From<Value> for GroupsRecord {
    fn from(value: Value) -> Self {
        let Some(raw) = value.get("groups").and_then(Value::as_object) else {
            return Self::default();
        };

        let groups = raw
            .iter()
            .filter(|(_, group)| group.is_object())
            .filter_map(|(id, group)| {
                Some((GroupId::parse(id)?, TranslationGroup::from(group.clone())))
            })
            .collect();

        Self { groups }
    }
}

/// The object index record: `{ contentId: groupId }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectIndex {
    #[serde(deserialize_with = "deserialize_index")]
    pub entries: BTreeMap<ContentId, GroupId>,
}

impl ObjectIndex {
    pub fn get(&self, id: ContentId) -> Option<&GroupId> {
        self.entries.get(&id)
    }

    /// Whether any content id still points at `group_id`.
    pub fn references_group(&self, group_id: &GroupId) -> bool {
        self.entries.values().any(|g| g == group_id)
    }

    /// All content ids pointing at `group_id`.
    pub fn members_of(&self, group_id: &GroupId) -> Vec<ContentId> {
        self.entries
            .iter()
            .filter(|(_, g)| *g == group_id)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Remove `id` only if it still points at `group_id`.
    pub fn remove_if_in(&mut self, id: ContentId, group_id: &GroupId) -> bool {
        if self.entries.get(&id) == Some(group_id) {
            self.entries.remove(&id);
            true
        } else {
            false
        }
    }
}

fn deserialize_index<'de, D>(deserializer: D) -> Result<BTreeMap<ContentId, GroupId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(raw) = value.as_object() else {
        return Ok(BTreeMap::new());
    };

    Ok(raw
        .iter()
        .filter_map(|(id, group)| {
            let id = ContentId::from_json(&Value::String(id.clone()))?;
            let group = GroupId::parse(group.as_str()?)?;
            Some((id, group))
        })
        .collect())
}
