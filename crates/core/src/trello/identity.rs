//! Foreign-to-local identity maps.
//!
//! Each import run owns one set of maps translating Trello ids to local
//! database ids. Label and list maps start empty and are filled as the
//! materializer creates each entity; the member map is pre-seeded from a
//! caller-supplied mapping, because users themselves are never created
//! by an import. Resolving an unmapped id is not an error -- a card may
//! reference a member who opted out of migration.

use std::collections::HashMap;

use crate::types::DbId;

/// One foreign-id to local-id table. Keys are unique; entries are never
/// removed during an import run.
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: HashMap<String, DbId>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map pre-seeded with caller-supplied entries.
    pub fn from_mapping(mapping: HashMap<String, DbId>) -> Self {
        Self { entries: mapping }
    }

    /// Record the local id created for a foreign id.
    pub fn record(&mut self, foreign_id: impl Into<String>, local_id: DbId) {
        self.entries.insert(foreign_id.into(), local_id);
    }

    /// Resolve a foreign id, or `None` if no local entity is mapped.
    pub fn resolve(&self, foreign_id: &str) -> Option<DbId> {
        self.entries.get(foreign_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three maps one import run needs.
#[derive(Debug, Default)]
pub struct IdentityMaps {
    pub labels: IdentityMap,
    pub lists: IdentityMap,
    pub members: IdentityMap,
}

impl IdentityMaps {
    /// Fresh maps for one import run, with the member map optionally
    /// pre-seeded from the caller's `membersMapping`.
    pub fn new(members_mapping: Option<HashMap<String, DbId>>) -> Self {
        Self {
            labels: IdentityMap::new(),
            lists: IdentityMap::new(),
            members: match members_mapping {
                Some(mapping) => IdentityMap::from_mapping(mapping),
                None => IdentityMap::new(),
            },
        }
    }

    /// Resolve a card's foreign member ids: unmapped entries are dropped
    /// and duplicate local ids collapsed, preserving first-seen order
    /// (multiple foreign members may map to the same local user).
    pub fn resolve_members(&self, foreign_ids: &[String]) -> Vec<DbId> {
        let mut members = Vec::new();
        for foreign_id in foreign_ids {
            if let Some(local_id) = self.members.resolve(foreign_id) {
                if !members.contains(&local_id) {
                    members.push(local_id);
                }
            }
        }
        members
    }

    /// Resolve a card's foreign label ids positionally. An unmapped id
    /// yields a `None` slot rather than being filtered out, so the
    /// array keeps the foreign card's label positions.
    pub fn resolve_labels(&self, foreign_ids: &[String]) -> Vec<Option<DbId>> {
        foreign_ids
            .iter()
            .map(|foreign_id| self.labels.resolve(foreign_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_resolve() {
        let mut map = IdentityMap::new();
        map.record("L1", 42);
        assert_eq!(map.resolve("L1"), Some(42));
        assert_eq!(map.resolve("L2"), None);
    }

    #[test]
    fn members_pre_seeded_from_mapping() {
        let mapping = HashMap::from([("m1".to_string(), 7), ("m2".to_string(), 8)]);
        let maps = IdentityMaps::new(Some(mapping));
        assert_eq!(maps.members.resolve("m1"), Some(7));
        assert!(maps.labels.is_empty());
        assert!(maps.lists.is_empty());
    }

    #[test]
    fn unmapped_members_are_dropped() {
        let mapping = HashMap::from([("m1".to_string(), 7)]);
        let maps = IdentityMaps::new(Some(mapping));
        let resolved = maps.resolve_members(&["m1".to_string(), "ghost".to_string()]);
        assert_eq!(resolved, vec![7]);
    }

    #[test]
    fn duplicate_local_members_collapse() {
        // Two foreign members mapped to the same local user.
        let mapping = HashMap::from([("m1".to_string(), 7), ("m2".to_string(), 7)]);
        let maps = IdentityMaps::new(Some(mapping));
        let resolved = maps.resolve_members(&["m1".to_string(), "m2".to_string()]);
        assert_eq!(resolved, vec![7]);
    }

    #[test]
    fn unmapped_labels_keep_null_slots() {
        let mut maps = IdentityMaps::new(None);
        maps.labels.record("lab1", 100);
        let resolved = maps.resolve_labels(&["lab1".to_string(), "lab2".to_string()]);
        assert_eq!(resolved, vec![Some(100), None]);
    }
}
