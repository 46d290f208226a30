//! Record types shared by the controller, the HTTP client and the CLI.
//!
//! Field names follow the server's camelCase JSON. Everything that the
//! server may leave out is defaulted so a sparse payload still parses.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ArchiefError, Result};

/// A case record ("zaak") as returned by the records endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zaak {
    /// Stable identity of the record
    pub url: String,
    /// Human-readable identifier
    pub identificatie: String,
    #[serde(default)]
    pub omschrijving: String,
    pub zaaktype: Zaaktype,
    #[serde(default)]
    pub bronorganisatie: String,
    #[serde(default)]
    pub startdatum: Option<Date>,
    #[serde(default)]
    pub einddatum: Option<Date>,
    #[serde(default)]
    pub archiefnominatie: Option<Archiefnominatie>,
    #[serde(default)]
    pub archiefactiedatum: Option<Date>,
    /// False when another process holds the record
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub looptijd: Option<String>,
    #[serde(default)]
    pub verantwoordelijke_organisatie: Option<String>,
    #[serde(default)]
    pub resultaat: Option<Resultaat>,
    #[serde(default)]
    pub relevante_andere_zaken: Vec<serde_json::Value>,
}

fn default_available() -> bool {
    true
}

impl Zaak {
    pub fn new(
        url: impl Into<String>,
        identificatie: impl Into<String>,
        zaaktype: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            identificatie: identificatie.into(),
            omschrijving: String::new(),
            zaaktype: Zaaktype::new(zaaktype),
            bronorganisatie: String::new(),
            startdatum: None,
            einddatum: None,
            archiefnominatie: None,
            archiefactiedatum: None,
            available: true,
            looptijd: None,
            verantwoordelijke_organisatie: None,
            resultaat: None,
            relevante_andere_zaken: Vec::new(),
        }
    }

    pub fn with_bronorganisatie(mut self, bronorganisatie: impl Into<String>) -> Self {
        self.bronorganisatie = bronorganisatie.into();
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Retention period of the result type, if the server resolved one
    pub fn bewaartermijn(&self) -> Option<&str> {
        self.resultaat
            .as_ref()
            .and_then(|r| r.resultaattype.as_ref())
            .and_then(|t| t.archiefactietermijn.as_deref())
    }

    pub fn has_related_zaken(&self) -> bool {
        !self.relevante_andere_zaken.is_empty()
    }
}

/// Case type embedded in a zaak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zaaktype {
    pub url: String,
    #[serde(default)]
    pub omschrijving: String,
    #[serde(default)]
    pub versiedatum: Option<String>,
    #[serde(default)]
    pub processtype: Option<Processtype>,
}

impl Zaaktype {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            omschrijving: String::new(),
            versiedatum: None,
            processtype: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processtype {
    #[serde(default, deserialize_with = "string_or_number")]
    pub nummer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resultaat {
    #[serde(default)]
    pub resultaattype: Option<Resultaattype>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resultaattype {
    #[serde(default)]
    pub omschrijving: String,
    #[serde(default)]
    pub archiefactietermijn: Option<String>,
}

/// Disposition decision for a zaak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archiefnominatie {
    Vernietigen,
    BlijvendBewaren,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for Archiefnominatie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archiefnominatie::Vernietigen => write!(f, "vernietigen"),
            Archiefnominatie::BlijvendBewaren => write!(f, "blijvend_bewaren"),
            Archiefnominatie::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One selectable case type version inside a group
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ZaaktypeChoice {
    pub value: String,
    pub label: String,
}

impl From<(String, String)> for ZaaktypeChoice {
    fn from((value, label): (String, String)) -> Self {
        Self { value, label }
    }
}

impl From<ZaaktypeChoice> for (String, String) {
    fn from(choice: ZaaktypeChoice) -> Self {
        (choice.value, choice.label)
    }
}

/// A group of case type versions sharing a description
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(
    from = "(String, Vec<ZaaktypeChoice>)",
    into = "(String, Vec<ZaaktypeChoice>)"
)]
pub struct ZaaktypeGroup {
    pub description: String,
    pub choices: Vec<ZaaktypeChoice>,
}

impl ZaaktypeGroup {
    pub fn new(description: impl Into<String>, choices: Vec<ZaaktypeChoice>) -> Self {
        Self {
            description: description.into(),
            choices,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|c| c.value.as_str())
    }
}

impl From<(String, Vec<ZaaktypeChoice>)> for ZaaktypeGroup {
    fn from((description, choices): (String, Vec<ZaaktypeChoice>)) -> Self {
        Self {
            description,
            choices,
        }
    }
}

impl From<ZaaktypeGroup> for (String, Vec<ZaaktypeChoice>) {
    fn from(group: ZaaktypeGroup) -> Self {
        (group.description, group.choices)
    }
}

/// A user that can review a destruction list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerChoice {
    pub id: String,
    pub display: String,
}

impl<'de> Deserialize<'de> for ReviewerChoice {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (id, display): (serde_json::Value, String) = Deserialize::deserialize(deserializer)?;
        let id = match id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Null => String::new(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "reviewer id must be a string or number, got {other}"
                )));
            }
        };
        Ok(Self { id, display })
    }
}

impl ReviewerChoice {
    /// The "-----" entry Django prepends to choice lists
    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Parse a `YYYY-MM-DD` date as used by the records API
pub fn parse_date(s: &str) -> Result<Date> {
    Date::from_str(s.trim()).map_err(|_| ArchiefError::InvalidDate(s.to_string()))
}
