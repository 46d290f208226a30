//! State and reducer for the case list.
//!
//! All state changes go through [`reduce_controller_state`], a pure function
//! from the current state and an action to the next state. The async driver
//! in the parent module only issues requests and feeds their completions
//! back in as actions.

use std::collections::BTreeSet;

use crate::query::{FilterState, FilterUpdate};
use crate::types::Zaak;

use super::selection::SelectionState;

/// Where the record table is in its load cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Messages to show in place of the table
    Error(Vec<String>),
}

/// Everything the case list shows and tracks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    pub status: LoadStatus,

    // Query
    /// Active user filters
    pub filters: FilterState,
    /// Sequence number of the most recently issued request
    pub latest_seq: u64,

    // Data
    /// Records of the last successful load, in server order
    pub zaken: Vec<Zaak>,
    pub selection: SelectionState,
    /// Organization filter choices; fixed once the first load succeeds
    pub bronorganisatie_choices: Option<Vec<String>>,
}

impl ControllerState {
    pub fn new(bronorganisatie_choices: Option<Vec<String>>) -> Self {
        Self {
            bronorganisatie_choices,
            ..Default::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error_messages(&self) -> Option<&[String]> {
        match &self.status {
            LoadStatus::Error(messages) => Some(messages),
            _ => None,
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selection.selected_count()
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.all_selected()
    }

    /// Selected records in load order, one per url
    pub fn selected_zaken(&self) -> Vec<&Zaak> {
        let mut seen = BTreeSet::new();
        self.zaken
            .iter()
            .filter(|z| self.selection.is_selected(&z.url) && seen.insert(z.url.as_str()))
            .collect()
    }

    pub fn find_zaak(&self, url: &str) -> Option<&Zaak> {
        self.zaken.iter().find(|z| z.url == url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerAction {
    // Requests
    /// A request was issued; `update` is merged into the filters first
    Issue {
        seq: u64,
        update: Option<FilterUpdate>,
    },
    /// The request `seq` returned records
    Loaded { seq: u64, zaken: Vec<Zaak> },
    /// The request `seq` failed
    Failed { seq: u64, messages: Vec<String> },

    // Selection
    ToggleSelection(String),
    ToggleSelectAll,
}

impl ControllerAction {
    /// Sequence number of a completion action
    pub fn completion_seq(&self) -> Option<u64> {
        match self {
            ControllerAction::Loaded { seq, .. } | ControllerAction::Failed { seq, .. } => {
                Some(*seq)
            }
            _ => None,
        }
    }
}

/// Whether a completion belongs to the latest issued request
pub fn is_current(state: &ControllerState, seq: u64) -> bool {
    seq == state.latest_seq
}

/// Pure state transition
pub fn reduce_controller_state(
    mut state: ControllerState,
    action: ControllerAction,
) -> ControllerState {
    match action {
        ControllerAction::Issue { seq, update } => {
            if seq <= state.latest_seq {
                return state;
            }
            if let Some(update) = update {
                state.filters.apply(update);
            }
            state.latest_seq = seq;
            state.status = LoadStatus::Loading;
        }

        ControllerAction::Loaded { seq, zaken } => {
            if !is_current(&state, seq) || !state.is_loading() {
                return state;
            }
            if state.bronorganisatie_choices.is_none() {
                state.bronorganisatie_choices = Some(distinct_bronorganisaties(&zaken));
            }
            state.selection = SelectionState::for_zaken(&zaken);
            state.zaken = zaken;
            state.status = LoadStatus::Loaded;
        }

        ControllerAction::Failed { seq, messages } => {
            if !is_current(&state, seq) || !state.is_loading() {
                return state;
            }
            state.zaken.clear();
            state.selection = SelectionState::default();
            state.status = LoadStatus::Error(messages);
        }

        ControllerAction::ToggleSelection(url) => {
            state.selection.toggle(&url);
        }

        ControllerAction::ToggleSelectAll => {
            let target = !state.selection.all_selected();
            state.selection.set_all(target);
        }
    }

    state
}

/// Distinct non-empty organization codes, sorted
fn distinct_bronorganisaties(zaken: &[Zaak]) -> Vec<String> {
    zaken
        .iter()
        .map(|z| z.bronorganisatie.as_str())
        .filter(|code| !code.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zaak(url: &str, available: bool, org: &str) -> Zaak {
        Zaak::new(url, format!("ZAAK-{url}"), "t1")
            .with_available(available)
            .with_bronorganisatie(org)
    }

    fn reduce_all(state: ControllerState, actions: Vec<ControllerAction>) -> ControllerState {
        actions.into_iter().fold(state, reduce_controller_state)
    }

    fn state_with_data() -> ControllerState {
        reduce_all(
            ControllerState::default(),
            vec![
                ControllerAction::Issue { seq: 1, update: None },
                ControllerAction::Loaded {
                    seq: 1,
                    zaken: vec![
                        zaak("A", true, "org1"),
                        zaak("B", true, "org2"),
                        zaak("C", false, "org1"),
                    ],
                },
            ],
        )
    }

    fn selection_of(state: &ControllerState) -> Vec<(String, bool)> {
        state
            .selection
            .iter()
            .map(|(url, checked)| (url.to_string(), checked))
            .collect()
    }

    // ========================================================================
    // Load Cycle Tests
    // ========================================================================

    #[test]
    fn test_initial_state_is_idle() {
        let state = ControllerState::default();
        assert_eq!(state.status, LoadStatus::Idle);
        assert_eq!(state.latest_seq, 0);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_issue_moves_to_loading() {
        let state = reduce_controller_state(
            ControllerState::default(),
            ControllerAction::Issue { seq: 1, update: None },
        );
        assert!(state.is_loading());
        assert_eq!(state.latest_seq, 1);
    }

    #[test]
    fn test_issue_with_old_seq_is_ignored() {
        let state = state_with_data();
        let next = reduce_controller_state(
            state.clone(),
            ControllerAction::Issue {
                seq: 1,
                update: Some(FilterUpdate::new().identificatie("x")),
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_loaded_sets_records_and_choices() {
        let state = state_with_data();
        assert_eq!(state.status, LoadStatus::Loaded);
        assert_eq!(state.zaken.len(), 3);
        assert_eq!(
            state.bronorganisatie_choices,
            Some(vec!["org1".to_string(), "org2".to_string()])
        );
    }

    #[test]
    fn test_bronorganisatie_choices_fixed_after_first_load() {
        let state = reduce_all(
            state_with_data(),
            vec![
                ControllerAction::Issue {
                    seq: 2,
                    update: Some(FilterUpdate::new().bronorganisaties(["org2"])),
                },
                ControllerAction::Loaded {
                    seq: 2,
                    zaken: vec![zaak("B", true, "org2")],
                },
            ],
        );
        assert_eq!(
            state.bronorganisatie_choices,
            Some(vec!["org1".to_string(), "org2".to_string()])
        );
    }

    #[test]
    fn test_preset_bronorganisatie_choices_are_kept() {
        let state = reduce_all(
            ControllerState::new(Some(vec!["preset".to_string()])),
            vec![
                ControllerAction::Issue { seq: 1, update: None },
                ControllerAction::Loaded {
                    seq: 1,
                    zaken: vec![zaak("A", true, "org1")],
                },
            ],
        );
        assert_eq!(
            state.bronorganisatie_choices,
            Some(vec!["preset".to_string()])
        );
    }

    #[test]
    fn test_failure_moves_to_error_and_clears_rows() {
        let state = reduce_all(
            state_with_data(),
            vec![
                ControllerAction::Issue { seq: 2, update: None },
                ControllerAction::Failed {
                    seq: 2,
                    messages: vec!["Zaken API unreachable".to_string()],
                },
            ],
        );
        assert_eq!(
            state.error_messages(),
            Some(&["Zaken API unreachable".to_string()][..])
        );
        assert!(state.zaken.is_empty());
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_success_after_error_clears_error() {
        let state = reduce_all(
            ControllerState::default(),
            vec![
                ControllerAction::Issue { seq: 1, update: None },
                ControllerAction::Failed {
                    seq: 1,
                    messages: vec!["boom".to_string()],
                },
                ControllerAction::Issue {
                    seq: 2,
                    update: Some(FilterUpdate::new().identificatie("1")),
                },
                ControllerAction::Loaded {
                    seq: 2,
                    zaken: vec![zaak("A", true, "org1")],
                },
            ],
        );
        assert_eq!(state.status, LoadStatus::Loaded);
        assert_eq!(state.filters.identificatie, "1");
        // First success after a failed initial load still derives choices
        assert_eq!(state.bronorganisatie_choices, Some(vec!["org1".to_string()]));
    }

    #[test]
    fn test_completion_while_not_loading_is_ignored() {
        let state = state_with_data();
        let next = reduce_controller_state(
            state.clone(),
            ControllerAction::Loaded {
                seq: 1,
                zaken: vec![],
            },
        );
        assert_eq!(next, state);
    }

    // ========================================================================
    // Selection Reset Tests
    // ========================================================================

    #[test]
    fn test_selection_reset_on_reload() {
        let mut state = state_with_data();
        state = reduce_controller_state(state, ControllerAction::ToggleSelectAll);
        assert_eq!(state.selected_count(), 2);

        state = reduce_all(
            state,
            vec![
                ControllerAction::Issue {
                    seq: 2,
                    update: Some(FilterUpdate::new().identificatie("B")),
                },
                ControllerAction::Loaded {
                    seq: 2,
                    zaken: vec![zaak("A", true, "org1"), zaak("D", true, "org1"), zaak("E", false, "org1")],
                },
            ],
        );

        assert_eq!(
            selection_of(&state),
            vec![("A".to_string(), false), ("D".to_string(), false)]
        );
    }

    #[test]
    fn test_selection_kept_while_loading() {
        let mut state = state_with_data();
        state = reduce_controller_state(state, ControllerAction::ToggleSelection("A".to_string()));
        state = reduce_controller_state(state, ControllerAction::Issue { seq: 2, update: None });
        assert!(state.selection.is_selected("A"));
    }

    // ========================================================================
    // Toggle Tests
    // ========================================================================

    #[test]
    fn test_toggle_selection() {
        let mut state = state_with_data();
        state = reduce_controller_state(state, ControllerAction::ToggleSelection("A".to_string()));
        assert!(state.selection.is_selected("A"));
        assert_eq!(state.selected_count(), 1);
        assert_eq!(state.selected_zaken()[0].url, "A");

        state = reduce_controller_state(state, ControllerAction::ToggleSelection("A".to_string()));
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_duplicate_url_is_selected_once() {
        let mut state = reduce_all(
            ControllerState::default(),
            vec![
                ControllerAction::Issue { seq: 1, update: None },
                ControllerAction::Loaded {
                    seq: 1,
                    zaken: vec![zaak("A", true, "org1"), zaak("A", true, "org1"), zaak("B", true, "org1")],
                },
            ],
        );
        state = reduce_controller_state(state, ControllerAction::ToggleSelection("A".to_string()));
        assert_eq!(state.selected_count(), 1);
        assert_eq!(state.selected_zaken().len(), 1);

        state = reduce_controller_state(state, ControllerAction::ToggleSelectAll);
        let urls: Vec<&str> = state.selected_zaken().iter().map(|z| z.url.as_str()).collect();
        assert_eq!(urls, vec!["A", "B"]);
        assert_eq!(state.selected_count(), urls.len());
    }

    #[test]
    fn test_find_zaak() {
        let state = state_with_data();
        assert_eq!(state.find_zaak("B").map(|z| z.identificatie.as_str()), Some("ZAAK-B"));
        assert!(state.find_zaak("ZAAK-B").is_none());
    }

    #[test]
    fn test_toggle_unavailable_never_changes_selection() {
        let state = state_with_data();
        for url in ["C", "missing", ""] {
            let next =
                reduce_controller_state(state.clone(), ControllerAction::ToggleSelection(url.to_string()));
            assert_eq!(next.selection, state.selection);
        }
    }

    #[test]
    fn test_toggle_select_all() {
        let mut state = state_with_data();
        state = reduce_controller_state(state, ControllerAction::ToggleSelectAll);
        assert!(state.is_all_selected());
        assert_eq!(state.selected_count(), 2);
        assert!(!state.selection.contains("C"));

        state = reduce_controller_state(state, ControllerAction::ToggleSelectAll);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_toggle_select_all_from_partial_selects_everything() {
        let mut state = state_with_data();
        state = reduce_controller_state(state, ControllerAction::ToggleSelection("B".to_string()));
        state = reduce_controller_state(state, ControllerAction::ToggleSelectAll);
        assert!(state.is_all_selected());
    }

    #[test]
    fn test_toggle_select_all_twice_restores_uniform_selection() {
        let none_selected = state_with_data();
        let all_selected = reduce_controller_state(none_selected.clone(), ControllerAction::ToggleSelectAll);

        for original in [none_selected, all_selected] {
            let twice = reduce_all(
                original.clone(),
                vec![ControllerAction::ToggleSelectAll, ControllerAction::ToggleSelectAll],
            );
            assert_eq!(twice.selection, original.selection);
        }
    }

    #[test]
    fn test_unchecking_one_clears_all_indicator() {
        let mut state = reduce_controller_state(state_with_data(), ControllerAction::ToggleSelectAll);
        state = reduce_controller_state(state, ControllerAction::ToggleSelection("A".to_string()));
        assert!(!state.is_all_selected());
    }

    // ========================================================================
    // Ordering Tests
    // ========================================================================

    #[test]
    fn test_out_of_order_response_is_dropped() {
        let state = reduce_all(
            ControllerState::default(),
            vec![
                ControllerAction::Issue { seq: 1, update: None },
                ControllerAction::Issue {
                    seq: 2,
                    update: Some(FilterUpdate::new().bronorganisaties(["org2"])),
                },
                ControllerAction::Loaded {
                    seq: 2,
                    zaken: vec![zaak("B", true, "org2")],
                },
                ControllerAction::Loaded {
                    seq: 1,
                    zaken: vec![zaak("A", true, "org1"), zaak("B", true, "org2")],
                },
            ],
        );
        assert_eq!(state.status, LoadStatus::Loaded);
        assert_eq!(state.zaken.len(), 1);
        assert_eq!(state.zaken[0].url, "B");
    }

    #[test]
    fn test_superseded_failure_is_dropped() {
        let state = reduce_all(
            ControllerState::default(),
            vec![
                ControllerAction::Issue { seq: 1, update: None },
                ControllerAction::Issue { seq: 2, update: None },
                ControllerAction::Failed {
                    seq: 1,
                    messages: vec!["stale".to_string()],
                },
            ],
        );
        assert!(state.is_loading());
    }

    #[test]
    fn test_completion_seq() {
        assert_eq!(
            ControllerAction::Failed { seq: 4, messages: vec![] }.completion_seq(),
            Some(4)
        );
        assert_eq!(ControllerAction::ToggleSelectAll.completion_seq(), None);
    }

    // ========================================================================
    // Example Scenario
    // ========================================================================

    #[test]
    fn test_filter_by_organisation_discards_prior_selection() {
        let mut state = state_with_data();
        assert_eq!(
            selection_of(&state),
            vec![("A".to_string(), false), ("B".to_string(), false)]
        );

        state = reduce_controller_state(state, ControllerAction::ToggleSelection("A".to_string()));
        assert_eq!(
            selection_of(&state),
            vec![("A".to_string(), true), ("B".to_string(), false)]
        );

        state = reduce_all(
            state,
            vec![
                ControllerAction::Issue {
                    seq: 2,
                    update: Some(FilterUpdate::new().bronorganisaties(["org1"])),
                },
                ControllerAction::Loaded {
                    seq: 2,
                    zaken: vec![zaak("B", true, "org2")],
                },
            ],
        );
        assert_eq!(selection_of(&state), vec![("B".to_string(), false)]);
    }
}
