//! Terminal rendering of case lists and the case type tree.

use std::collections::BTreeSet;

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use url::Url;

use crate::bootstrap::ListPreset;
use crate::controller::submit::archive_update_url;
use crate::controller::{ControllerState, LoadStatus, ZaaktypeSelector};
use crate::types::Zaak;

const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";
const LOCKED: &str = " - ";

#[derive(Tabled)]
struct DestructionRow {
    #[tabled(rename = "")]
    checkbox: String,
    #[tabled(rename = "Identificatie")]
    identificatie: String,
    #[tabled(rename = "Zaaktype")]
    zaaktype: String,
    #[tabled(rename = "Omschrijving")]
    omschrijving: String,
    #[tabled(rename = "Bronorganisatie")]
    bronorganisatie: String,
    #[tabled(rename = "Startdatum")]
    startdatum: String,
    #[tabled(rename = "Archiefactiedatum")]
    archiefactiedatum: String,
    #[tabled(rename = "Archiefgegevens")]
    update_link: String,
}

#[derive(Tabled)]
struct NoArchiveDateRow {
    #[tabled(rename = "")]
    checkbox: String,
    #[tabled(rename = "Identificatie")]
    identificatie: String,
    #[tabled(rename = "Zaaktype")]
    zaaktype: String,
    #[tabled(rename = "Looptijd")]
    looptijd: String,
    #[tabled(rename = "Verantwoordelijke organisatie")]
    verantwoordelijke_organisatie: String,
    #[tabled(rename = "Resultaattype")]
    resultaattype: String,
    #[tabled(rename = "Bewaartermijn")]
    bewaartermijn: String,
    #[tabled(rename = "Relevante andere zaken")]
    relevante_andere_zaken: String,
    #[tabled(rename = "Archiefgegevens")]
    update_link: String,
}

fn checkbox(state: &ControllerState, zaak: &Zaak) -> String {
    if !state.selection.contains(&zaak.url) {
        LOCKED.to_string()
    } else if state.selection.is_selected(&zaak.url) {
        CHECKED.to_string()
    } else {
        UNCHECKED.to_string()
    }
}

fn date_or_dash(date: Option<jiff::civil::Date>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn update_link(endpoint: Option<&Url>, zaak: &Zaak) -> String {
    endpoint
        .and_then(|e| archive_update_url(e, zaak))
        .map(|u| u.to_string())
        .unwrap_or_default()
}

fn zaaktype_label(zaak: &Zaak) -> String {
    if zaak.zaaktype.omschrijving.is_empty() {
        zaak.zaaktype.url.clone()
    } else {
        zaak.zaaktype.omschrijving.clone()
    }
}

/// Render the case list: a status line while loading, messages on error,
/// the table otherwise
pub fn render_case_list(
    state: &ControllerState,
    preset: ListPreset,
    update_endpoint: Option<&Url>,
) -> String {
    match &state.status {
        LoadStatus::Idle => "Not loaded".dimmed().to_string(),
        LoadStatus::Loading => "Loading...".dimmed().to_string(),
        LoadStatus::Error(messages) => format_error_messages(messages),
        LoadStatus::Loaded if state.zaken.is_empty() => "No zaken found.".to_string(),
        LoadStatus::Loaded => {
            let mut table = match preset {
                ListPreset::Destruction => Table::new(state.zaken.iter().map(|zaak| {
                    DestructionRow {
                        checkbox: checkbox(state, zaak),
                        identificatie: zaak.identificatie.clone(),
                        zaaktype: zaaktype_label(zaak),
                        omschrijving: zaak.omschrijving.clone(),
                        bronorganisatie: zaak.bronorganisatie.clone(),
                        startdatum: date_or_dash(zaak.startdatum),
                        archiefactiedatum: date_or_dash(zaak.archiefactiedatum),
                        update_link: update_link(update_endpoint, zaak),
                    }
                })),
                ListPreset::WithoutArchiveDate => Table::new(state.zaken.iter().map(|zaak| {
                    NoArchiveDateRow {
                        checkbox: checkbox(state, zaak),
                        identificatie: zaak.identificatie.clone(),
                        zaaktype: zaaktype_label(zaak),
                        looptijd: zaak.looptijd.clone().unwrap_or_default(),
                        verantwoordelijke_organisatie: zaak
                            .verantwoordelijke_organisatie
                            .clone()
                            .unwrap_or_default(),
                        resultaattype: zaak
                            .resultaat
                            .as_ref()
                            .and_then(|r| r.resultaattype.as_ref())
                            .map(|t| t.omschrijving.clone())
                            .unwrap_or_default(),
                        bewaartermijn: zaak.bewaartermijn().unwrap_or_default().to_string(),
                        relevante_andere_zaken: if zaak.has_related_zaken() {
                            "Ja".to_string()
                        } else {
                            "Nee".to_string()
                        },
                        update_link: update_link(update_endpoint, zaak),
                    }
                })),
            };
            table.with(Style::rounded());
            table.to_string()
        }
    }
}

/// One line summarizing the selection, as shown above the submit button
pub fn format_selection_summary(state: &ControllerState) -> String {
    let count = state.selected_count();
    let total = state.selection.len();
    let summary = format!("{count} of {total} selectable zaken selected");
    if count == 0 {
        summary.dimmed().to_string()
    } else {
        summary.green().to_string()
    }
}

pub fn format_error_messages(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!("{} {}", "Error:".red().bold(), m))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the case type tree with group and item checkboxes
///
/// Items are listed only under expanded groups.
pub fn render_zaaktype_tree(selector: &ZaaktypeSelector, selection: &BTreeSet<String>) -> String {
    let mut lines = Vec::new();
    for group in selector.groups() {
        let mark = if selector.is_group_selected(&group.description) {
            CHECKED
        } else {
            UNCHECKED
        };
        let arrow = if selector.is_expanded(&group.description) {
            "v"
        } else {
            ">"
        };
        lines.push(format!(
            "{arrow} {mark} {} {}",
            group.description.bold(),
            format!("({})", group.choices.len()).dimmed()
        ));

        if selector.is_expanded(&group.description) {
            for choice in &group.choices {
                let mark = if selection.contains(&choice.value) {
                    CHECKED
                } else {
                    UNCHECKED
                };
                lines.push(format!("      {mark} {}", choice.label));
            }
        }
    }
    lines.join("\n")
}
