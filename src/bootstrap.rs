//! Page bootstrap data.
//!
//! The server renders each list page with a few `application/json` script
//! blocks and a mount node whose `data-*` attributes carry endpoint URLs.
//! The same data can also be supplied as one JSON document, e.g. saved from
//! a page earlier, so the CLI can run without fetching the page.

use std::collections::BTreeSet;

use jiff::civil::Date;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::controller::ControllerConfig;
use crate::error::{ArchiefError, Result};
use crate::query::BaseQuery;
use crate::types::{ReviewerChoice, ZaaktypeGroup, parse_date};

pub const ZAAKTYPE_CHOICES_ID: &str = "zaaktype-choices";
pub const REVIEWER_CHOICES_ID: &str = "reviewer-choices";
pub const SHORT_REVIEW_ZAAKTYPES_ID: &str = "short-review-zaaktypes";

/// Which case list a page hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPreset {
    /// Records due for destruction, on the destruction list create page
    Destruction,
    /// Closed records without an archive action date
    WithoutArchiveDate,
}

impl ListPreset {
    pub fn mount_id(self) -> &'static str {
        match self {
            ListPreset::Destruction => "react-destruction-list",
            ListPreset::WithoutArchiveDate => "react-zaken-without-archive-date",
        }
    }
}

/// The mount node's `data-*` attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDataset {
    #[serde(default)]
    pub zaken_url: Option<String>,
    /// Form action of the create page
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub current_date: Option<String>,
    #[serde(default)]
    pub archive_update_url: Option<String>,
    #[serde(default)]
    pub export_zaken_url: Option<String>,
    #[serde(default)]
    pub csrftoken: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Bootstrap {
    #[serde(rename = "zaaktype-choices", default)]
    pub zaaktype_choices: Vec<ZaaktypeGroup>,
    #[serde(rename = "reviewer-choices", default)]
    pub reviewers: Vec<ReviewerChoice>,
    #[serde(rename = "short-review-zaaktypes", default)]
    pub short_review_zaaktypes: Vec<String>,
    #[serde(default)]
    pub dataset: PageDataset,
}

impl Bootstrap {
    /// Parse a bootstrap JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let bootstrap: Bootstrap = serde_json::from_str(json)
            .map_err(|e| ArchiefError::Bootstrap(format!("invalid bootstrap JSON: {e}")))?;
        Ok(bootstrap.without_placeholders())
    }

    /// Extract bootstrap data from a server-rendered page
    ///
    /// Script blocks that are absent yield empty lists; a missing mount
    /// node is an error since it carries the records endpoint.
    pub fn from_page(html: &str, mount_id: &str) -> Result<Self> {
        let dataset = extract_dataset(html, mount_id)?;

        let bootstrap = Bootstrap {
            zaaktype_choices: json_script(html, ZAAKTYPE_CHOICES_ID)?.unwrap_or_default(),
            reviewers: json_script(html, REVIEWER_CHOICES_ID)?.unwrap_or_default(),
            short_review_zaaktypes: json_script(html, SHORT_REVIEW_ZAAKTYPES_ID)?
                .unwrap_or_default(),
            dataset,
        };
        Ok(bootstrap.without_placeholders())
    }

    fn without_placeholders(mut self) -> Self {
        self.reviewers.retain(|r| !r.is_placeholder());
        self
    }

    /// The date cutoff for the destruction list, today when the page gave none
    pub fn current_date(&self) -> Result<Date> {
        match self.dataset.current_date.as_deref().filter(|d| !d.is_empty()) {
            Some(date) => parse_date(date),
            None => Ok(jiff::Zoned::now().date()),
        }
    }

    pub fn base_query(&self, preset: ListPreset) -> Result<BaseQuery> {
        Ok(match preset {
            ListPreset::Destruction => BaseQuery::destruction(self.current_date()?),
            ListPreset::WithoutArchiveDate => BaseQuery::without_archive_date(),
        })
    }

    /// Records endpoint resolved against `base`
    pub fn zaken_endpoint(&self, base: &Url) -> Result<Url> {
        let raw = self.dataset.zaken_url.as_deref().ok_or_else(|| {
            ArchiefError::Bootstrap("page does not provide a zaken url".to_string())
        })?;
        Ok(base.join(raw)?)
    }

    /// Form action of the create page; `base` itself when the page gave none
    pub fn form_action(&self, base: &Url) -> Result<Url> {
        match self.dataset.url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => Ok(base.join(url)?),
            None => Ok(base.clone()),
        }
    }

    pub fn export_endpoint(&self, base: &Url) -> Result<Option<Url>> {
        resolve_optional(base, self.dataset.export_zaken_url.as_deref())
    }

    pub fn archive_update_endpoint(&self, base: &Url) -> Result<Option<Url>> {
        resolve_optional(base, self.dataset.archive_update_url.as_deref())
    }

    /// Controller configuration for the list this page hosts
    pub fn controller_config(&self, preset: ListPreset, base: &Url) -> Result<ControllerConfig> {
        let mut config =
            ControllerConfig::new(self.zaken_endpoint(base)?.to_string(), self.base_query(preset)?);
        config.zaaktype_choices = self.zaaktype_choices.clone();
        config.reviewers = self.reviewers.clone();
        config.short_review_zaaktypes = self
            .short_review_zaaktypes
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>();
        config.csrf_token = self.dataset.csrftoken.clone().filter(|t| !t.is_empty());
        Ok(config)
    }
}

fn resolve_optional(base: &Url, raw: Option<&str>) -> Result<Option<Url>> {
    match raw.filter(|u| !u.is_empty()) {
        Some(url) => Ok(Some(base.join(url)?)),
        None => Ok(None),
    }
}

fn build_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ArchiefError::Other(format!("invalid pattern: {e}")))
}

/// Parse the `<script id=".." type="application/json">` block with `id`
fn json_script<T: serde::de::DeserializeOwned>(html: &str, id: &str) -> Result<Option<T>> {
    let pattern = format!(
        r#"(?is)<script\b[^>]*\sid\s*=\s*["']{}["'][^>]*>(.*?)</script>"#,
        regex::escape(id)
    );
    let Some(captures) = build_regex(&pattern)?.captures(html) else {
        return Ok(None);
    };
    let body = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    serde_json::from_str(body.trim())
        .map(Some)
        .map_err(|e| ArchiefError::Bootstrap(format!("script '{id}' is not valid JSON: {e}")))
}

/// Collect the `data-*` attributes of the element with `id`
fn extract_dataset(html: &str, mount_id: &str) -> Result<PageDataset> {
    let pattern = format!(
        r#"(?is)<[a-z][a-z0-9]*\b[^>]*\sid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(mount_id)
    );
    let tag = build_regex(&pattern)?
        .find(html)
        .ok_or_else(|| ArchiefError::Bootstrap(format!("mount node '{mount_id}' not found")))?;

    let attribute = build_regex(r#"(?i)\bdata-([a-z0-9-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?;
    let mut map = serde_json::Map::new();
    for captures in attribute.captures_iter(tag.as_str()) {
        let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = captures
            .get(2)
            .or_else(|| captures.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        map.insert(
            dataset_key(name),
            serde_json::Value::String(unescape_html(value)),
        );
    }

    serde_json::from_value(serde_json::Value::Object(map))
        .map_err(|e| ArchiefError::Bootstrap(format!("invalid dataset: {e}")))
}

/// `data-zaken-url` is exposed to scripts as `dataset.zakenUrl`
fn dataset_key(attribute: &str) -> String {
    let mut key = String::with_capacity(attribute.len());
    let mut upper = false;
    for c in attribute.to_lowercase().chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            key.extend(c.to_uppercase());
            upper = false;
        } else {
            key.push(c);
        }
    }
    key
}

fn unescape_html(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
