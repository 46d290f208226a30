//! Two-level case type selector.
//!
//! Groups are keyed by their description. The selected item set itself is
//! owned by the case list filters; every toggle takes the current set and
//! returns the new one, which the caller feeds back as a filter update.

use std::collections::BTreeSet;

use crate::types::ZaaktypeGroup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZaaktypeSelector {
    groups: Vec<ZaaktypeGroup>,
    selected_groups: BTreeSet<String>,
    expanded_groups: BTreeSet<String>,
}

impl ZaaktypeSelector {
    /// Build the selector and derive group state from `initial`
    ///
    /// A group whose items are all in `initial` starts selected. Groups
    /// without items are vacuously covered and start selected too.
    pub fn new(groups: Vec<ZaaktypeGroup>, initial: &BTreeSet<String>) -> Self {
        let selected_groups = groups
            .iter()
            .filter(|group| group.values().all(|v| initial.contains(v)))
            .map(|group| group.description.clone())
            .collect();

        Self {
            groups,
            selected_groups,
            expanded_groups: BTreeSet::new(),
        }
    }

    pub fn groups(&self) -> &[ZaaktypeGroup] {
        &self.groups
    }

    pub fn group(&self, key: &str) -> Option<&ZaaktypeGroup> {
        self.groups.iter().find(|g| g.description == key)
    }

    pub fn is_group_selected(&self, key: &str) -> bool {
        self.selected_groups.contains(key)
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded_groups.contains(key)
    }

    /// Add or remove one case type; the group checkbox follows
    pub fn toggle_item(
        &mut self,
        group: &str,
        value: &str,
        selection: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let mut next = selection.clone();
        if !next.remove(value) {
            next.insert(value.to_string());
        }
        tracing::trace!(group, value, "toggled zaaktype");
        self.reconcile(&next);
        next
    }

    /// Select or deselect every case type of a group at once
    pub fn toggle_group(&mut self, key: &str, selection: &BTreeSet<String>) -> BTreeSet<String> {
        let Some(group) = self.group(key) else {
            return selection.clone();
        };
        let values: Vec<String> = group.values().map(str::to_string).collect();

        let mut next = selection.clone();
        if self.selected_groups.contains(key) {
            for value in &values {
                next.remove(value);
            }
            self.selected_groups.remove(key);
        } else {
            next.extend(values);
            self.selected_groups.insert(key.to_string());
        }
        self.reconcile(&next);
        next
    }

    pub fn toggle_expand(&mut self, key: &str) {
        if !self.expanded_groups.remove(key) {
            self.expanded_groups.insert(key.to_string());
        }
    }

    pub fn expand_all(&mut self) {
        self.expanded_groups = self.groups.iter().map(|g| g.description.clone()).collect();
    }

    /// Re-derive the checkbox of every non-empty group from `selection`
    ///
    /// Empty groups keep whatever state they were toggled to.
    fn reconcile(&mut self, selection: &BTreeSet<String>) {
        for group in &self.groups {
            if group.choices.is_empty() {
                continue;
            }
            if group.values().all(|v| selection.contains(v)) {
                self.selected_groups.insert(group.description.clone());
            } else {
                self.selected_groups.remove(&group.description);
            }
        }
    }
}
