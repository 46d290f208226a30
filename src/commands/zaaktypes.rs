use std::collections::BTreeSet;
use std::path::Path;

use serde_json::json;

use super::{CommandOutput, ListSession};
use crate::bootstrap::ListPreset;
use crate::controller::ZaaktypeSelector;
use crate::display::render_zaaktype_tree;
use crate::error::Result;

/// Show the case type tree with group state for a selection
pub async fn cmd_zaaktypes(
    preset: ListPreset,
    selected: &[String],
    expand_all: bool,
    bootstrap_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let session = ListSession::open(preset, bootstrap_file).await?;
    let selection: BTreeSet<String> = selected.iter().cloned().collect();
    let mut selector = ZaaktypeSelector::new(session.bootstrap.zaaktype_choices.clone(), &selection);
    if expand_all {
        selector.expand_all();
    }

    let groups: Vec<serde_json::Value> = selector
        .groups()
        .iter()
        .map(|group| {
            json!({
                "description": group.description,
                "selected": selector.is_group_selected(&group.description),
                "choices": group.choices.iter().map(|c| json!({
                    "value": c.value,
                    "label": c.label,
                    "selected": selection.contains(&c.value),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    let text = if selector.groups().is_empty() {
        "No zaaktypes available.".to_string()
    } else {
        render_zaaktype_tree(&selector, &selection)
    };

    CommandOutput::new(json!({ "groups": groups }))
        .with_text(text)
        .print(json)
}
