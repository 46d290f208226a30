//! Create a destruction list from selected records.

use std::path::Path;

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, FilterOptions, ListSession, ensure_loaded, select_zaken};
use crate::bootstrap::ListPreset;
use crate::controller::DestructionListForm;
use crate::controller::submit::FIELD_CSRF;
use crate::display::format_selection_summary;
use crate::error::Result;

pub struct CreateListOptions {
    pub name: String,
    pub reviewer_1: Option<String>,
    pub reviewer_2: Option<String>,
    pub contains_sensitive_info: bool,
    /// Records to include, by identificatie or url
    pub zaken: Vec<String>,
    pub all: bool,
    /// Print the form instead of posting it
    pub dry_run: bool,
    pub filters: FilterOptions,
}

pub async fn cmd_create_list(
    options: CreateListOptions,
    bootstrap_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let session = ListSession::open(ListPreset::Destruction, bootstrap_file).await?;
    let mut controller = session.load(&options.filters).await?;
    ensure_loaded(&controller)?;

    select_zaken(&mut controller, &options.zaken, options.all)?;

    let form = DestructionListForm::new(options.name.clone())
        .with_reviewers(options.reviewer_1.clone(), options.reviewer_2.clone())
        .with_sensitive_info(options.contains_sensitive_info);
    let submission = controller.submit(&form)?;
    let action = session.bootstrap.form_action(&session.page_url)?;
    let selected = controller.selected_count();

    if options.dry_run {
        let fields: Vec<serde_json::Value> = submission
            .fields()
            .iter()
            .filter(|(name, _)| name != FIELD_CSRF)
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect();
        let mut text = format!(
            "{} {}\n{}\n",
            "Would post to".dimmed(),
            action,
            format_selection_summary(controller.state())
        );
        for (name, value) in submission.fields() {
            if name == FIELD_CSRF {
                continue;
            }
            text.push_str(&format!("  {} = {}\n", name.cyan(), value));
        }
        return CommandOutput::new(json!({
            "action": "create_list",
            "dry_run": true,
            "url": action.as_str(),
            "selected": selected,
            "fields": fields,
        }))
        .with_text(text.trim_end().to_string())
        .print(json);
    }

    let response = session.client.post_form(action.clone(), submission.fields()).await?;
    tracing::info!(status = response.status, "destruction list created");

    let text = match &response.location {
        Some(location) => format!(
            "Created destruction list {} with {selected} zaken ({})",
            options.name.cyan(),
            location.dimmed()
        ),
        None => format!(
            "Created destruction list {} with {selected} zaken",
            options.name.cyan()
        ),
    };

    CommandOutput::new(json!({
        "action": "create_list",
        "dry_run": false,
        "name": options.name,
        "selected": selected,
        "status": response.status,
        "location": response.location,
    }))
    .with_text(text)
    .print(json)
}
