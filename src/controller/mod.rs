//! Case list controller.
//!
//! The controller owns the list state and is driven from a single task.
//! Every load is spawned onto the runtime and tagged with a sequence
//! number; completions come back over a channel and only the one matching
//! the latest issued request is applied.

pub mod model;
pub mod selection;
pub mod submit;
pub mod zaaktype_select;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use crate::error::Result;
use crate::query::{BaseQuery, FilterUpdate, build_query_url};
use crate::remote::{FetchError, ZakenSource};
use crate::types::{ReviewerChoice, Zaak, ZaaktypeGroup};

pub use model::{ControllerAction, ControllerState, LoadStatus, reduce_controller_state};
pub use selection::SelectionState;
pub use submit::{
    DestructionListForm, FormSubmission, SubmitOptions, ZakenEncoding, archive_update_url,
    export_url, second_reviewer_choices,
};
pub use zaaktype_select::ZaaktypeSelector;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a case list needs to know about its page
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Records query endpoint, absolute URL
    pub zaken_endpoint: String,
    /// Fixed predicates of this list
    pub base_query: BaseQuery,
    /// Choices for the case type filter
    pub zaaktype_choices: Vec<ZaaktypeGroup>,
    /// Choices for the organization filter; derived from the first load when empty
    pub bronorganisatie_choices: Vec<String>,
    pub reviewers: Vec<ReviewerChoice>,
    /// Case types that need only one reviewer
    pub short_review_zaaktypes: BTreeSet<String>,
    pub zaken_encoding: ZakenEncoding,
    pub csrf_token: Option<String>,
    pub remote_timeout: Duration,
}

impl ControllerConfig {
    pub fn new(zaken_endpoint: impl Into<String>, base_query: BaseQuery) -> Self {
        Self {
            zaken_endpoint: zaken_endpoint.into(),
            base_query,
            zaaktype_choices: Vec::new(),
            bronorganisatie_choices: Vec::new(),
            reviewers: Vec::new(),
            short_review_zaaktypes: BTreeSet::new(),
            zaken_encoding: ZakenEncoding::default(),
            csrf_token: None,
            remote_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }
}

/// What happened to a completion pulled off the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The completion belonged to the latest request and was applied
    Applied(u64),
    /// A newer request had been issued; the completion was dropped
    Stale(u64),
}

type Completion = (u64, std::result::Result<Vec<Zaak>, FetchError>);

pub struct CaseListController<S: ZakenSource> {
    source: Arc<S>,
    config: ControllerConfig,
    state: ControllerState,
    next_seq: u64,
    in_flight: usize,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: ZakenSource> CaseListController<S> {
    pub fn new(source: S, config: ControllerConfig) -> Self {
        Self::with_shared_source(Arc::new(source), config)
    }

    pub fn with_shared_source(source: Arc<S>, config: ControllerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let choices = Some(config.bronorganisatie_choices.clone()).filter(|c| !c.is_empty());
        Self {
            source,
            config,
            state: ControllerState::new(choices),
            next_seq: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Issue the initial load with empty filters
    pub fn initialize(&mut self) -> u64 {
        self.issue(None)
    }

    /// Merge a filter change and reload
    pub fn set_filter(&mut self, update: FilterUpdate) -> u64 {
        self.issue(Some(update))
    }

    pub fn toggle_selection(&mut self, url: &str) {
        self.dispatch(ControllerAction::ToggleSelection(url.to_string()));
    }

    pub fn toggle_select_all(&mut self) {
        self.dispatch(ControllerAction::ToggleSelectAll);
    }

    pub fn selected_count(&self) -> usize {
        self.state.selected_count()
    }

    pub fn is_all_selected(&self) -> bool {
        self.state.is_all_selected()
    }

    pub fn selected_zaken(&self) -> Vec<&Zaak> {
        self.state.selected_zaken()
    }

    /// Build the destruction list form for the current selection
    pub fn submit(&self, form: &DestructionListForm) -> Result<FormSubmission> {
        let options = SubmitOptions {
            short_review_zaaktypes: &self.config.short_review_zaaktypes,
            reviewers: &self.config.reviewers,
            encoding: self.config.zaken_encoding,
            csrf_token: self.config.csrf_token.as_deref(),
        };
        submit::build_submission(form, &self.state.selected_zaken(), &options)
    }

    /// Apply the next completion; `None` when nothing is in flight
    pub async fn next_event(&mut self) -> Option<EventOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let (seq, result) = self.rx.recv().await?;
        self.in_flight -= 1;

        if !model::is_current(&self.state, seq) {
            tracing::debug!(seq, latest = self.state.latest_seq, "dropping stale completion");
            return Some(EventOutcome::Stale(seq));
        }

        let action = match result {
            Ok(zaken) => {
                tracing::debug!(seq, count = zaken.len(), "zaken loaded");
                ControllerAction::Loaded { seq, zaken }
            }
            Err(error) => {
                tracing::warn!(seq, %error, "loading zaken failed");
                ControllerAction::Failed {
                    seq,
                    messages: error.messages(),
                }
            }
        };
        self.dispatch(action);
        Some(EventOutcome::Applied(seq))
    }

    /// Apply completions until the latest request has resolved
    pub async fn settle(&mut self) -> &ControllerState {
        while self.state.is_loading() {
            if self.next_event().await.is_none() {
                break;
            }
        }
        &self.state
    }

    fn dispatch(&mut self, action: ControllerAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce_controller_state(state, action);
    }

    fn issue(&mut self, update: Option<FilterUpdate>) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.dispatch(ControllerAction::Issue { seq, update });

        let endpoint = match Url::parse(&self.config.zaken_endpoint) {
            Ok(url) => url,
            Err(e) => {
                let message = format!(
                    "Invalid records endpoint '{}': {}",
                    self.config.zaken_endpoint, e
                );
                tracing::warn!("{message}");
                self.dispatch(ControllerAction::Failed {
                    seq,
                    messages: vec![message],
                });
                return seq;
            }
        };

        let url = build_query_url(&endpoint, &self.config.base_query, &self.state.filters);
        tracing::debug!(seq, %url, "issuing zaken query");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let timeout = self.config.remote_timeout;
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, source.fetch_zaken(url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout.as_secs())),
            };
            // The receiver lives as long as the controller
            let _ = tx.send((seq, result));
        });

        seq
    }
}
