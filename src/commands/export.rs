use std::path::Path;

use serde_json::json;

use super::{CommandOutput, FilterOptions, ListSession, ensure_loaded, select_zaken};
use crate::bootstrap::ListPreset;
use crate::controller::export_url;
use crate::error::{ArchiefError, Result};

/// Print the export link for records without an archive action date
pub async fn cmd_export(
    zaken: &[String],
    all: bool,
    filters: &FilterOptions,
    bootstrap_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let session = ListSession::open(ListPreset::WithoutArchiveDate, bootstrap_file).await?;
    let endpoint = session
        .bootstrap
        .export_endpoint(&session.page_url)?
        .ok_or_else(|| ArchiefError::Bootstrap("page does not provide an export url".to_string()))?;

    let mut controller = session.load(filters).await?;
    ensure_loaded(&controller)?;
    select_zaken(&mut controller, zaken, all)?;

    let selected = controller.selected_zaken();
    let url = export_url(&endpoint, &selected).ok_or(ArchiefError::NothingSelected)?;

    CommandOutput::new(json!({
        "url": url.as_str(),
        "selected": selected.len(),
    }))
    .with_text(url.to_string())
    .print(json)
}
