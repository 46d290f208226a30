//! Query construction for the records endpoint.
//!
//! A request is the combination of a fixed [`BaseQuery`] (the screen's
//! predicate, e.g. "destroy, due before today") and the user's
//! [`FilterState`]. Filter parameters replace base parameters with the same
//! key, matching `URLSearchParams.set`.

use std::collections::BTreeSet;

use jiff::civil::Date;
use serde::Deserialize;
use url::Url;

use crate::error::{ArchiefError, Result};
use crate::remote::error::FetchError;
use crate::types::{Zaak, parse_date};

pub const PARAM_ZAAKTYPE_IN: &str = "zaaktype__in";
pub const PARAM_BRONORGANISATIE_IN: &str = "bronorganisatie__in";
pub const PARAM_IDENTIFICATIE: &str = "identificatie";
pub const PARAM_STARTDATUM_GTE: &str = "startdatum__gte";

const LIST_SEPARATOR: char = ',';

/// Fixed predicates a screen always sends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseQuery {
    params: Vec<(String, String)>,
}

impl BaseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records nominated for destruction whose action date lies before `cutoff`
    pub fn destruction(cutoff: Date) -> Self {
        Self::new()
            .with("archiefnominatie", "vernietigen")
            .with("archiefactiedatum__lt", cutoff.to_string())
            .with("ordering", "registratiedatum,startdatum,identificatie")
    }

    /// Closed records that have no action date yet
    pub fn without_archive_date() -> Self {
        Self::new()
            .with("archiefactiedatum__isnull", "true")
            .with("einddatum__isnull", "false")
            .with("sort_by_zaaktype", "true")
    }

    /// Parse a `key=value&key=value` string, as stored in configuration
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim().trim_start_matches('?');
        let mut query = Self::new();
        for (key, value) in url::form_urlencoded::parse(s.as_bytes()) {
            if key.is_empty() {
                return Err(ArchiefError::InvalidQuery(format!(
                    "empty parameter name in '{s}'"
                )));
            }
            query = query.with(key, value);
        }
        Ok(query)
    }

    /// Set a parameter, replacing an earlier value for the same key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_param(&mut self.params, key.into(), value.into());
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The user-controlled filters of a case list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub zaaktypen: BTreeSet<String>,
    pub bronorganisaties: BTreeSet<String>,
    pub identificatie: String,
    pub startdatum: Option<Date>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.zaaktypen.is_empty()
            && self.bronorganisaties.is_empty()
            && self.identificatie.is_empty()
            && self.startdatum.is_none()
    }

    /// Merge a partial update; fields absent from the update are kept
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(zaaktypen) = update.zaaktypen {
            self.zaaktypen = zaaktypen;
        }
        if let Some(bronorganisaties) = update.bronorganisaties {
            self.bronorganisaties = bronorganisaties;
        }
        if let Some(identificatie) = update.identificatie {
            self.identificatie = identificatie;
        }
        if let Some(startdatum) = update.startdatum {
            self.startdatum = startdatum;
        }
    }

    /// Encode as query parameters; empty fields are omitted
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.zaaktypen.is_empty() {
            params.push((PARAM_ZAAKTYPE_IN, join_list(&self.zaaktypen)));
        }
        if !self.bronorganisaties.is_empty() {
            params.push((PARAM_BRONORGANISATIE_IN, join_list(&self.bronorganisaties)));
        }
        if !self.identificatie.is_empty() {
            params.push((PARAM_IDENTIFICATIE, self.identificatie.clone()));
        }
        if let Some(date) = self.startdatum {
            params.push((PARAM_STARTDATUM_GTE, date.to_string()));
        }
        params
    }

    /// Decode from query parameters, ignoring keys that are not filters
    pub fn from_params<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                PARAM_ZAAKTYPE_IN => filters.zaaktypen = split_list(value),
                PARAM_BRONORGANISATIE_IN => filters.bronorganisaties = split_list(value),
                PARAM_IDENTIFICATIE => filters.identificatie = value.to_string(),
                PARAM_STARTDATUM_GTE if !value.is_empty() => {
                    filters.startdatum = Some(parse_date(value)?);
                }
                _ => {}
            }
        }
        Ok(filters)
    }
}

/// A partial filter change; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub zaaktypen: Option<BTreeSet<String>>,
    pub bronorganisaties: Option<BTreeSet<String>>,
    pub identificatie: Option<String>,
    pub startdatum: Option<Option<Date>>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zaaktypen<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zaaktypen = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn bronorganisaties<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bronorganisaties = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn identificatie(mut self, value: impl Into<String>) -> Self {
        self.identificatie = Some(value.into());
        self
    }

    pub fn startdatum(mut self, value: Option<Date>) -> Self {
        self.startdatum = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.zaaktypen.is_none()
            && self.bronorganisaties.is_none()
            && self.identificatie.is_none()
            && self.startdatum.is_none()
    }
}

/// Everything needed to issue one request against the records endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZakenQuery {
    pub base: BaseQuery,
    pub filters: FilterState,
}

impl ZakenQuery {
    pub fn new(base: BaseQuery, filters: FilterState) -> Self {
        Self { base, filters }
    }

    /// Base parameters overlaid with filter parameters
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = self.base.params().to_vec();
        for (key, value) in self.filters.to_params() {
            set_param(&mut params, key.to_string(), value);
        }
        params
    }
}

/// Build the request URL; parameters already on `endpoint` are kept unless overridden
pub fn build_query_url(endpoint: &Url, base: &BaseQuery, filters: &FilterState) -> Url {
    let mut params: Vec<(String, String)> = endpoint
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    for (key, value) in ZakenQuery::new(base.clone(), filters.clone()).params() {
        set_param(&mut params, key, value);
    }

    let mut url = endpoint.clone();
    url.set_query(None);
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    url
}

fn set_param(params: &mut Vec<(String, String)>, key: String, value: String) {
    params.retain(|(k, _)| *k != key);
    params.push((key, value));
}

fn join_list(values: &BTreeSet<String>) -> String {
    values
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

fn split_list(value: &str) -> BTreeSet<String> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
struct ZakenPayload {
    #[serde(default)]
    zaken: Option<Vec<Zaak>>,
    #[serde(default)]
    error: Option<ErrorField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    One(String),
    Many(Vec<String>),
}

impl ErrorField {
    fn into_messages(self) -> Vec<String> {
        match self {
            ErrorField::One(msg) => vec![msg],
            ErrorField::Many(msgs) => msgs,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorField>,
    #[serde(default)]
    detail: Option<String>,
}

/// Interpret a records endpoint response
///
/// A success status with an `error` key is an application error; a
/// non-success status carries whatever message the body offers.
pub fn parse_zaken_response(status: u16, body: &str) -> std::result::Result<Vec<Zaak>, FetchError> {
    if !(200..300).contains(&status) {
        let messages = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| match (b.error, b.detail) {
                (Some(error), _) => error.into_messages(),
                (None, Some(detail)) => vec![detail],
                (None, None) => Vec::new(),
            })
            .unwrap_or_default();
        return Err(FetchError::Status { status, messages });
    }

    let payload: ZakenPayload = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    if let Some(error) = payload.error {
        return Err(FetchError::Application(error.into_messages()));
    }

    payload
        .zaken
        .ok_or_else(|| FetchError::InvalidResponse("response has no 'zaken' array".to_string()))
}
