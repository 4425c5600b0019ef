//! Content objects as seen through the host collaborator.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a content object. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ContentId(i64);

impl ContentId {
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Lenient conversion used when reading persisted JSON: accepts numbers and
    /// numeric strings, rejects everything else.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().and_then(Self::new),
            serde_json::Value::String(s) => s.trim().parse().ok().and_then(Self::new),
            _ => None,
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ContentId {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("content id must be positive, got {}", raw))
    }
}

impl From<ContentId> for i64 {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication state of a content object. `Trash` is the removed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Publish => "publish",
            ContentStatus::Draft => "draft",
            ContentStatus::Pending => "pending",
            ContentStatus::Private => "private",
            ContentStatus::Future => "future",
            ContentStatus::Trash => "trash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "publish" => Some(ContentStatus::Publish),
            "draft" => Some(ContentStatus::Draft),
            "pending" => Some(ContentStatus::Pending),
            "private" => Some(ContentStatus::Private),
            "future" => Some(ContentStatus::Future),
            "trash" => Some(ContentStatus::Trash),
            _ => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, ContentStatus::Trash)
    }
}

/// Content types that can carry a language and be duplicated into translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportedType {
    Article,
    Page,
    Product,
    ProductVariant,
}

impl SupportedType {
    pub const ALL: [SupportedType; 4] = [
        SupportedType::Article,
        SupportedType::Page,
        SupportedType::Product,
        SupportedType::ProductVariant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedType::Article => "article",
            SupportedType::Page => "page",
            SupportedType::Product => "product",
            SupportedType::ProductVariant => "product_variant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// A content object fetched from the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentObject {
    pub id: ContentId,
    pub content_type: String,
    pub status: ContentStatus,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ContentId>,
    pub menu_order: i64,
    pub author_id: i64,
}

impl ContentObject {
    pub fn supported_type(&self) -> Option<SupportedType> {
        SupportedType::parse(&self.content_type)
    }
}

/// Field set used to create a content object.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub content_type: String,
    pub status: ContentStatus,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub parent_id: Option<ContentId>,
    pub menu_order: i64,
    pub author_id: i64,
}

impl NewContent {
    /// Draft copy of `source`: editorial fields and authorship only. Status, ids and
    /// language are deliberately not carried over.
    pub fn draft_copy_of(source: &ContentObject) -> Self {
        Self {
            content_type: source.content_type.clone(),
            status: ContentStatus::Draft,
            title: source.title.clone(),
            body: source.body.clone(),
            excerpt: source.excerpt.clone(),
            parent_id: source.parent_id,
            menu_order: source.menu_order,
            author_id: source.author_id,
        }
    }
}

/// A taxonomy term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Term {
    pub id: i64,
    pub taxonomy: String,
    pub slug: String,
    pub name: String,
}

/// Multi-valued metadata of a content object, keyed by meta key.
pub type MetaMap = BTreeMap<String, Vec<String>>;

/// Capability level of the actor triggering an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Editor,
    Author,
    Subscriber,
}

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    /// Administrators and editors may edit anything, authors only their own objects.
    pub fn can_edit(&self, object: &ContentObject) -> bool {
        match self.role {
            Role::Administrator | Role::Editor => true,
            Role::Author => self.id > 0 && self.id == object.author_id,
            Role::Subscriber => false,
        }
    }
}
