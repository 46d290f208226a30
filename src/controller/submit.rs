//! Destruction list form and record links.
//!
//! Nothing here talks to the network: the result is the list of fields a
//! browser would post, or a URL a browser would follow.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ArchiefError, Result};
use crate::types::{ReviewerChoice, Zaak};

pub const FIELD_NAME: &str = "name";
pub const FIELD_ZAKEN: &str = "zaken";
pub const FIELD_ZAKEN_IDENTIFICATIES: &str = "zaken_identificaties";
pub const FIELD_REVIEWER_1: &str = "reviewer_1";
pub const FIELD_REVIEWER_2: &str = "reviewer_2";
pub const FIELD_CONTAINS_SENSITIVE_INFO: &str = "contains_sensitive_info";
pub const FIELD_CSRF: &str = "csrfmiddlewaretoken";

/// How the selected records are put in the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZakenEncoding {
    /// One comma-joined field per list, as the server's form splits it
    #[default]
    Joined,
    /// One field per record
    Repeated,
}

impl std::str::FromStr for ZakenEncoding {
    type Err = ArchiefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "joined" => Ok(ZakenEncoding::Joined),
            "repeated" => Ok(ZakenEncoding::Repeated),
            other => Err(ArchiefError::Config(format!(
                "invalid zaken_encoding '{other}': expected 'joined' or 'repeated'"
            ))),
        }
    }
}

impl std::fmt::Display for ZakenEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZakenEncoding::Joined => write!(f, "joined"),
            ZakenEncoding::Repeated => write!(f, "repeated"),
        }
    }
}

/// User-entered metadata of a new destruction list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestructionListForm {
    pub name: String,
    pub reviewer_1: Option<String>,
    pub reviewer_2: Option<String>,
    pub contains_sensitive_info: bool,
}

impl Default for DestructionListForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            reviewer_1: None,
            reviewer_2: None,
            contains_sensitive_info: true,
        }
    }
}

impl DestructionListForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_reviewers(mut self, first: Option<String>, second: Option<String>) -> Self {
        self.reviewer_1 = first.filter(|s| !s.is_empty());
        self.reviewer_2 = second.filter(|s| !s.is_empty());
        self
    }

    pub fn with_sensitive_info(mut self, contains_sensitive_info: bool) -> Self {
        self.contains_sensitive_info = contains_sensitive_info;
        self
    }
}

static NO_SHORT_REVIEW: BTreeSet<String> = BTreeSet::new();

/// Rules and extras that apply to every submission of one page
#[derive(Debug, Clone)]
pub struct SubmitOptions<'a> {
    /// Case types whose lists need only one reviewer
    pub short_review_zaaktypes: &'a BTreeSet<String>,
    /// Known reviewers; when non-empty, chosen ids must be among them
    pub reviewers: &'a [ReviewerChoice],
    pub encoding: ZakenEncoding,
    pub csrf_token: Option<&'a str>,
}

impl Default for SubmitOptions<'_> {
    fn default() -> Self {
        Self {
            short_review_zaaktypes: &NO_SHORT_REVIEW,
            reviewers: &[],
            encoding: ZakenEncoding::default(),
            csrf_token: None,
        }
    }
}

/// Encoded form fields, in posting order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    fields: Vec<(String, String)>,
}

impl FormSubmission {
    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.fields.push((name.to_string(), value.into()));
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// `application/x-www-form-urlencoded` body
    pub fn to_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

/// Whether any selected record's case type needs the full review
pub fn requires_second_reviewer(selected: &[&Zaak], short_review: &BTreeSet<String>) -> bool {
    selected
        .iter()
        .any(|z| !short_review.contains(&z.zaaktype.url))
}

/// Reviewers that may be chosen second, given the first choice
pub fn second_reviewer_choices<'a>(
    reviewers: &'a [ReviewerChoice],
    reviewer_1: Option<&str>,
) -> Vec<&'a ReviewerChoice> {
    reviewers
        .iter()
        .filter(|r| Some(r.id.as_str()) != reviewer_1)
        .collect()
}

/// Validate the form against the selection and encode it
pub fn build_submission(
    form: &DestructionListForm,
    selected: &[&Zaak],
    options: &SubmitOptions<'_>,
) -> Result<FormSubmission> {
    if selected.is_empty() {
        return Err(ArchiefError::NothingSelected);
    }

    let name = form.name.trim();
    if name.is_empty() {
        return Err(ArchiefError::InvalidForm("a name is required".to_string()));
    }

    let reviewer_1 = form.reviewer_1.as_deref().filter(|s| !s.is_empty());
    let reviewer_2 = form.reviewer_2.as_deref().filter(|s| !s.is_empty());

    let Some(reviewer_1) = reviewer_1 else {
        let message = if reviewer_2.is_some() {
            "the second reviewer can only be chosen after the first"
        } else {
            "a first reviewer is required"
        };
        return Err(ArchiefError::InvalidForm(message.to_string()));
    };
    check_known_reviewer(reviewer_1, options.reviewers)?;

    if let Some(reviewer_2) = reviewer_2 {
        if reviewer_2 == reviewer_1 {
            return Err(ArchiefError::InvalidForm(
                "the second reviewer must differ from the first".to_string(),
            ));
        }
        check_known_reviewer(reviewer_2, options.reviewers)?;
    } else if requires_second_reviewer(selected, options.short_review_zaaktypes) {
        return Err(ArchiefError::InvalidForm(
            "a second reviewer is required for the selected zaaktypes".to_string(),
        ));
    }

    let mut submission = FormSubmission::default();
    if let Some(token) = options.csrf_token {
        submission.push(FIELD_CSRF, token);
    }
    submission.push(FIELD_NAME, name);

    match options.encoding {
        ZakenEncoding::Joined => {
            submission.push(FIELD_ZAKEN, join(selected.iter().map(|z| z.url.as_str())));
            submission.push(
                FIELD_ZAKEN_IDENTIFICATIES,
                join(selected.iter().map(|z| z.identificatie.as_str())),
            );
        }
        ZakenEncoding::Repeated => {
            for zaak in selected {
                submission.push(FIELD_ZAKEN, zaak.url.as_str());
            }
            for zaak in selected {
                submission.push(FIELD_ZAKEN_IDENTIFICATIES, zaak.identificatie.as_str());
            }
        }
    }

    submission.push(FIELD_REVIEWER_1, reviewer_1);
    if let Some(reviewer_2) = reviewer_2 {
        submission.push(FIELD_REVIEWER_2, reviewer_2);
    }
    if form.contains_sensitive_info {
        submission.push(FIELD_CONTAINS_SENSITIVE_INFO, "on");
    }

    Ok(submission)
}

fn check_known_reviewer(id: &str, reviewers: &[ReviewerChoice]) -> Result<()> {
    if reviewers.is_empty() || reviewers.iter().any(|r| r.id == id) {
        Ok(())
    } else {
        Err(ArchiefError::InvalidForm(format!("unknown reviewer '{id}'")))
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(",")
}

/// Link that downloads the selected records; `None` without a selection
pub fn export_url(endpoint: &Url, selected: &[&Zaak]) -> Option<Url> {
    if selected.is_empty() {
        return None;
    }
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("zaken_urls", &join(selected.iter().map(|z| z.url.as_str())));
    Some(url)
}

/// Link to the archive metadata editor, only for records that can be edited
pub fn archive_update_url(endpoint: &Url, zaak: &Zaak) -> Option<Url> {
    if !zaak.available {
        return None;
    }
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("url", &zaak.url);
    Some(url)
}
