use std::path::Path;

use owo_colors::OwoColorize;

use super::{CommandOutput, FilterOptions, ListSession, ensure_loaded, state_json};
use crate::bootstrap::ListPreset;
use crate::display::{format_selection_summary, render_case_list};
use crate::error::Result;

/// Load and show a case list
pub async fn cmd_list(
    preset: ListPreset,
    filters: &FilterOptions,
    bootstrap_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let session = ListSession::open(preset, bootstrap_file).await?;
    let controller = session.load(filters).await?;
    let update_endpoint = session.bootstrap.archive_update_endpoint(&session.page_url)?;

    let state = controller.state();
    let mut text = render_case_list(state, preset, update_endpoint.as_ref());
    if state.error_messages().is_none() {
        text.push_str(&format!("\n{}", format_selection_summary(state)));
        if let Some(choices) = &state.bronorganisatie_choices
            && !choices.is_empty()
        {
            text.push_str(&format!(
                "\n{} {}",
                "Bronorganisaties:".dimmed(),
                choices.join(", ")
            ));
        }
    }

    CommandOutput::new(state_json(&controller))
        .with_text(text)
        .print(json)?;

    ensure_loaded(&controller)
}
