//! CLI command implementations.
//!
//! Every list command follows the same path: load configuration, obtain the
//! page bootstrap (fetched, or from `--bootstrap`), build a controller over
//! the HTTP client and let it settle.

mod config;
mod create_list;
mod export;
mod list;
mod zaaktypes;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use create_list::{CreateListOptions, cmd_create_list};
pub use export::cmd_export;
pub use list::cmd_list;
pub use zaaktypes::cmd_zaaktypes;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use jiff::civil::Date;
use serde_json::json;
use url::Url;

use crate::bootstrap::{Bootstrap, ListPreset};
use crate::config::Config;
use crate::controller::{CaseListController, ControllerConfig, ZaaktypeSelector};
use crate::error::{ArchiefError, Result};
use crate::query::FilterUpdate;
use crate::remote::HttpZakenClient;
use crate::types::ZaaktypeGroup;

/// Print a JSON value to stdout
pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Command result with a JSON form and a human form
pub struct CommandOutput {
    json: serde_json::Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: serde_json::Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, json: bool) -> Result<()> {
        match (json, self.text) {
            (false, Some(text)) => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

/// Filter flags shared by the list commands
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub zaaktypen: Vec<String>,
    /// Group descriptions whose case types are all added
    pub zaaktype_groups: Vec<String>,
    pub bronorganisaties: Vec<String>,
    pub identificatie: Option<String>,
    pub startdatum: Option<Date>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.zaaktypen.is_empty()
            && self.zaaktype_groups.is_empty()
            && self.bronorganisaties.is_empty()
            && self.identificatie.is_none()
            && self.startdatum.is_none()
    }

    /// Turn the flags into one filter update
    ///
    /// Groups go through the case type selector, the same way checking a
    /// group box would.
    pub fn to_update(&self, groups: &[ZaaktypeGroup]) -> Result<FilterUpdate> {
        let mut update = FilterUpdate::new();

        if !self.zaaktypen.is_empty() || !self.zaaktype_groups.is_empty() {
            let mut selection: BTreeSet<String> = self.zaaktypen.iter().cloned().collect();
            let mut selector = ZaaktypeSelector::new(groups.to_vec(), &selection);
            for key in &self.zaaktype_groups {
                if selector.group(key).is_none() {
                    return Err(ArchiefError::InvalidQuery(format!(
                        "unknown zaaktype group '{key}'"
                    )));
                }
                if !selector.is_group_selected(key) {
                    selection = selector.toggle_group(key, &selection);
                }
            }
            update.zaaktypen = Some(selection);
        }
        if !self.bronorganisaties.is_empty() {
            update = update.bronorganisaties(self.bronorganisaties.iter().cloned());
        }
        if let Some(identificatie) = &self.identificatie {
            update = update.identificatie(identificatie.clone());
        }
        if self.startdatum.is_some() {
            update = update.startdatum(self.startdatum);
        }
        Ok(update)
    }
}

/// Everything a list command needs once the page is bootstrapped
pub struct ListSession {
    pub config: Config,
    pub client: Arc<HttpZakenClient>,
    pub bootstrap: Bootstrap,
    /// URL of the page hosting the list; relative page URLs resolve against it
    pub page_url: Url,
    pub preset: ListPreset,
}

impl ListSession {
    /// Load config and the page bootstrap for `preset`
    pub async fn open(preset: ListPreset, bootstrap_file: Option<&Path>) -> Result<Self> {
        let config = Config::load()?;
        let client = Arc::new(HttpZakenClient::from_config(&config)?);
        let page_path = match preset {
            ListPreset::Destruction => &config.endpoints.create_list_page,
            ListPreset::WithoutArchiveDate => &config.endpoints.no_archive_date_page,
        };

        let (bootstrap, page_url) = match bootstrap_file {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    ArchiefError::Bootstrap(format!("failed to read {}: {e}", path.display()))
                })?;
                let bootstrap = Bootstrap::from_json(&content)?;
                let page_url = match config.resolve(page_path) {
                    Ok(url) => url,
                    Err(e) => standalone_base(&bootstrap).ok_or(e)?,
                };
                (bootstrap, page_url)
            }
            None => {
                let page_url = config.resolve(page_path)?;
                let html = client.fetch_page(page_url.clone()).await?;
                (Bootstrap::from_page(&html, preset.mount_id())?, page_url)
            }
        };

        Ok(Self {
            config,
            client,
            bootstrap,
            page_url,
            preset,
        })
    }

    /// Controller configuration: page data first, local config as fallback
    pub fn controller_config(&self) -> Result<ControllerConfig> {
        let mut config = self.bootstrap.controller_config(self.preset, &self.page_url)?;
        config.remote_timeout = Duration::from_secs(self.config.remote_timeout.max(1));
        config.zaken_encoding = self.config.zaken_encoding;
        if let Some(token) = self.config.csrf_token() {
            config.csrf_token = Some(token);
        }
        if config.short_review_zaaktypes.is_empty() {
            config.short_review_zaaktypes =
                self.config.short_review_zaaktypes.iter().cloned().collect();
        }
        Ok(config)
    }

    /// Run the initial load, then apply `filters` if any, and settle
    pub async fn load(
        &self,
        filters: &FilterOptions,
    ) -> Result<CaseListController<HttpZakenClient>> {
        let config = self.controller_config()?;
        let update = filters.to_update(&config.zaaktype_choices)?;
        let mut controller = CaseListController::with_shared_source(Arc::clone(&self.client), config);

        controller.initialize();
        controller.settle().await;
        if !update.is_empty() {
            controller.set_filter(update);
            controller.settle().await;
        }
        Ok(controller)
    }
}

/// Without a configured server, absolute URLs in the bootstrap file still work
fn standalone_base(bootstrap: &Bootstrap) -> Option<Url> {
    bootstrap
        .dataset
        .zaken_url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
}

/// Fail with the controller's messages when the load did not succeed
pub(crate) fn ensure_loaded(controller: &CaseListController<HttpZakenClient>) -> Result<()> {
    match controller.state().error_messages() {
        Some(messages) => Err(ArchiefError::LoadFailed(messages.to_vec())),
        None => Ok(()),
    }
}

/// Check the rows named on the command line
///
/// Rows are matched by identificatie or url; unknown or locked rows are
/// errors rather than silently skipped.
pub(crate) fn select_zaken(
    controller: &mut CaseListController<HttpZakenClient>,
    wanted: &[String],
    all: bool,
) -> Result<()> {
    if all {
        if !controller.is_all_selected() {
            controller.toggle_select_all();
        }
        return Ok(());
    }

    for key in wanted {
        let state = controller.state();
        let zaak = state
            .find_zaak(key)
            .or_else(|| state.zaken.iter().find(|z| z.identificatie == *key))
            .ok_or_else(|| ArchiefError::ZaakNotFound(key.clone()))?;
        if !zaak.available {
            return Err(ArchiefError::ZaakUnavailable(key.clone()));
        }
        let url = zaak.url.clone();
        if !controller.state().selection.is_selected(&url) {
            controller.toggle_selection(&url);
        }
    }
    Ok(())
}

pub(crate) fn state_json(controller: &CaseListController<HttpZakenClient>) -> serde_json::Value {
    let state = controller.state();
    let selected: Vec<&str> = state
        .selected_zaken()
        .iter()
        .map(|z| z.url.as_str())
        .collect();
    json!({
        "status": match &state.status {
            crate::controller::LoadStatus::Idle => "idle",
            crate::controller::LoadStatus::Loading => "loading",
            crate::controller::LoadStatus::Loaded => "loaded",
            crate::controller::LoadStatus::Error(_) => "error",
        },
        "errors": state.error_messages().unwrap_or_default(),
        "zaken": state.zaken,
        "selected": selected,
        "bronorganisaties": state.bronorganisatie_choices.clone().unwrap_or_default(),
    })
}
