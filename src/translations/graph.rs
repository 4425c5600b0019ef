//! In-memory translation graph.
//!
//! Pure algorithms over the two persisted records. Every public mutation keeps these
//! invariants:
//! - each value in a group's `translations` is indexed to that same group;
//! - a content id is indexed to at most one group;
//! - a content id occupies at most one language slot per group.
//!
//! The index may additionally hold the anchor id that caused a group to be created
//! without it being listed as a translation.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::models::{
    sanitize_translations, ContentId, GroupId, GroupsRecord, LangSlug, ObjectIndex,
    TranslationGroup, TranslationMap,
};

/// Why a link request was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRejection {
    InvalidLanguage,
    TypeMismatch { group_type: String, requested: String },
}

/// What `prune_group` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<ContentId>,
    pub group_deleted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationGraph {
    pub groups: GroupsRecord,
    pub index: ObjectIndex,
}

impl TranslationGraph {
    pub fn new(groups: GroupsRecord, index: ObjectIndex) -> Self {
        Self { groups, index }
    }

    pub fn group_id_for(&self, id: ContentId) -> Option<&GroupId> {
        self.index.get(id)
    }

    pub fn group(&self, group_id: &GroupId) -> Option<&TranslationGroup> {
        self.groups.groups.get(group_id)
    }

    /// Translations of the group `id` belongs to; empty when it has none.
    pub fn translations_of(&self, id: ContentId) -> TranslationMap {
        self.group_id_for(id)
            .and_then(|g| self.group(g))
            .map(|group| group.translations.clone())
            .unwrap_or_default()
    }

    /// Every content id tied to a group, through its translations or the index.
    pub fn members_of(&self, group_id: &GroupId) -> BTreeSet<ContentId> {
        let mut members: BTreeSet<ContentId> =
            self.index.members_of(group_id).into_iter().collect();
        if let Some(group) = self.group(group_id) {
            members.extend(group.translations.values().copied());
        }
        members
    }

    /// The group of `id`, allocating a fresh one when `id` is unindexed or its group
    /// no longer exists.
    pub fn ensure_group(&mut self, id: ContentId, content_type: &str) -> GroupId {
        if let Some(existing) = self.index.get(id) {
            if self.groups.groups.contains_key(existing) {
                return existing.clone();
            }
        }

        let group_id = GroupId::generate();
        self.groups
            .groups
            .insert(group_id.clone(), TranslationGroup::new(content_type));
        self.index.entries.insert(id, group_id.clone());

        tracing::debug!("Created translation group {} for content {}", group_id, id);
        group_id
    }

    /// Point `lang` of `id`'s group at `target`, creating the group when needed.
    pub fn link(
        &mut self,
        id: ContentId,
        lang: &str,
        target: ContentId,
        content_type: &str,
        strict_types: bool,
    ) -> Result<GroupId, LinkRejection> {
        let lang = LangSlug::sanitize(lang).ok_or(LinkRejection::InvalidLanguage)?;
        self.check_type(id, content_type, strict_types)?;

        let group_id = self.ensure_group(id, content_type);
        let mut touched = self.detach(target, &group_id);

        let group = self.group_mut(&group_id, content_type);
        group.content_type = content_type.to_string();
        group
            .translations
            .retain(|slot, value| *value != target || *slot == lang);
        let previous = group.translations.insert(lang, target);
        let still_listed: BTreeSet<ContentId> = group.translations.values().copied().collect();

        self.index.entries.insert(id, group_id.clone());
        self.index.entries.insert(target, group_id.clone());

        if let Some(previous) = previous {
            if previous != target && previous != id && !still_listed.contains(&previous) {
                self.index.remove_if_in(previous, &group_id);
            }
        }

        touched.remove(&group_id);
        self.drop_unreferenced(touched);

        Ok(group_id)
    }

    /// Replace the whole translation map of `id`'s group. Raw entries are sanitized;
    /// ids dropped from the map lose their index entry unless they are `id` itself.
    pub fn set_all<'a>(
        &mut self,
        id: ContentId,
        raw: impl IntoIterator<Item = (&'a str, &'a Value)>,
        content_type: &str,
        strict_types: bool,
    ) -> Result<GroupId, LinkRejection> {
        self.check_type(id, content_type, strict_types)?;

        let sanitized = dedupe_targets(sanitize_translations(raw));
        let group_id = self.ensure_group(id, content_type);

        let previous: BTreeSet<ContentId> = self
            .group(&group_id)
            .map(|g| g.translations.values().copied().collect())
            .unwrap_or_default();
        let current: BTreeSet<ContentId> = sanitized.values().copied().collect();

        let mut touched = BTreeSet::new();
        for target in &current {
            touched.extend(self.detach(*target, &group_id));
        }

        let group = self.group_mut(&group_id, content_type);
        group.content_type = content_type.to_string();
        group.translations = sanitized;

        for target in previous.union(&current) {
            if current.contains(target) {
                self.index.entries.insert(*target, group_id.clone());
            } else if *target != id {
                self.index.remove_if_in(*target, &group_id);
            }
        }
        self.index.entries.insert(id, group_id.clone());

        touched.remove(&group_id);
        self.drop_unreferenced(touched);

        Ok(group_id)
    }

    /// Remove `id` from every slot of its group and from the index.
    /// Returns the group it belonged to so the caller can run orphan cleanup.
    pub fn remove_content_id(&mut self, id: ContentId) -> Option<GroupId> {
        let group_id = self.index.get(id)?.clone();

        if let Some(group) = self.groups.groups.get_mut(&group_id) {
            group.translations.retain(|_, value| *value != id);
        }
        self.index.remove_if_in(id, &group_id);

        Some(group_id)
    }

    /// Drop members listed in `invalid` from the group and the index, then delete the
    /// group when no index entry points at it any more. A group missing from storage
    /// has its dangling index entries removed.
    pub fn prune_group(&mut self, group_id: &GroupId, invalid: &BTreeSet<ContentId>) -> PruneReport {
        let mut report = PruneReport::default();

        let Some(group) = self.groups.groups.get_mut(group_id) else {
            let dangling = self.index.members_of(group_id);
            for id in dangling {
                self.index.entries.remove(&id);
                report.removed.push(id);
            }
            return report;
        };

        group.translations.retain(|_, value| {
            if invalid.contains(value) {
                report.removed.push(*value);
                false
            } else {
                true
            }
        });

        for id in invalid {
            if self.index.remove_if_in(*id, group_id) && !report.removed.contains(id) {
                report.removed.push(*id);
            }
        }

        if !self.index.references_group(group_id) {
            self.groups.groups.remove(group_id);
            report.group_deleted = true;
        }

        report
    }

    /// Describe every invariant violation. Empty when the graph is consistent.
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (group_id, group) in &self.groups.groups {
            let mut seen = BTreeSet::new();
            for (lang, id) in &group.translations {
                if self.index.get(*id) != Some(group_id) {
                    problems.push(format!(
                        "group {} lists {} for {} but the index disagrees",
                        group_id, id, lang
                    ));
                }
                if !seen.insert(*id) {
                    problems.push(format!("group {} lists {} twice", group_id, id));
                }
            }
        }

        for (id, group_id) in &self.index.entries {
            if !self.groups.groups.contains_key(group_id) {
                problems.push(format!("index maps {} to missing group {}", id, group_id));
            }
        }

        problems
    }

    fn check_type(
        &self,
        id: ContentId,
        content_type: &str,
        strict_types: bool,
    ) -> Result<(), LinkRejection> {
        if !strict_types {
            return Ok(());
        }

        let existing = self.index.get(id).and_then(|g| self.group(g));
        match existing {
            Some(group) if !group.content_type.is_empty() && group.content_type != content_type => {
                Err(LinkRejection::TypeMismatch {
                    group_type: group.content_type.clone(),
                    requested: content_type.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn group_mut(&mut self, group_id: &GroupId, content_type: &str) -> &mut TranslationGroup {
        self.groups
            .groups
            .entry(group_id.clone())
            .or_insert_with(|| TranslationGroup::new(content_type))
    }

    /// Take `id` out of whatever other group currently holds it. Returns the groups
    /// that lost a member.
    fn detach(&mut self, id: ContentId, keep: &GroupId) -> BTreeSet<GroupId> {
        let mut touched = BTreeSet::new();

        if let Some(other) = self.index.get(id).cloned() {
            if &other != keep {
                if let Some(group) = self.groups.groups.get_mut(&other) {
                    group.translations.retain(|_, value| *value != id);
                }
                self.index.entries.remove(&id);
                tracing::debug!("Moved content {} out of group {}", id, other);
                touched.insert(other);
            }
        }

        touched
    }

    fn drop_unreferenced(&mut self, candidates: BTreeSet<GroupId>) {
        for group_id in candidates {
            if !self.index.references_group(&group_id) {
                self.groups.groups.remove(&group_id);
                tracing::debug!("Deleted orphan group {}", group_id);
            }
        }
    }
}

/// Keep a content id in one slot only; the first language (in key order) wins.
fn dedupe_targets(map: TranslationMap) -> TranslationMap {
    let mut seen = BTreeSet::new();
    map.into_iter().filter(|(_, id)| seen.insert(*id)).collect()
}
