use std::collections::BTreeMap;

use crate::types::Zaak;

/// Row checkboxes, keyed by record url
///
/// Keys are exactly the available records of the loaded set; unavailable
/// records never get an entry and so can never be selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    entries: BTreeMap<String, bool>,
}

impl SelectionState {
    /// Fresh selection for a newly loaded record set, everything unchecked
    pub fn for_zaken(zaken: &[Zaak]) -> Self {
        Self {
            entries: zaken
                .iter()
                .filter(|z| z.available)
                .map(|z| (z.url.clone(), false))
                .collect(),
        }
    }

    /// Flip one checkbox; returns false when `url` is not selectable
    pub fn toggle(&mut self, url: &str) -> bool {
        match self.entries.get_mut(url) {
            Some(checked) => {
                *checked = !*checked;
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, checked: bool) {
        for value in self.entries.values_mut() {
            *value = checked;
        }
    }

    /// The "select all" indicator: every selectable row is checked
    pub fn all_selected(&self) -> bool {
        !self.entries.is_empty() && self.entries.values().all(|&checked| checked)
    }

    pub fn is_selected(&self, url: &str) -> bool {
        self.entries.get(url).copied().unwrap_or(false)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn selected_count(&self) -> usize {
        self.entries.values().filter(|&&checked| checked).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(url, &checked)| (url.as_str(), checked))
    }
}
