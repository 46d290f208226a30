//! HTTP client for the records-retention server.
//!
//! # Security Note - Logging
//!
//! The session cookie and CSRF token are wrapped in [`RedactedHeader`] when
//! they are attached to a request, so debug logging of request headers shows
//! `[REDACTED]` instead of the credentials.

use std::fmt;
use std::time::Duration;

use reqwest::header;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretBox};
use url::Url;

use crate::config::Config;
use crate::error::{ArchiefError, Result};
use crate::query::parse_zaken_response;
use crate::types::Zaak;

use super::ZakenSource;
use super::error::FetchError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Wrapper for sensitive header values that redacts the value when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn new(value: String) -> Self {
        Self { value }
    }

    fn as_header_value(&self) -> std::result::Result<header::HeaderValue, FetchError> {
        let mut value = header::HeaderValue::from_str(&self.value).map_err(|_| {
            FetchError::Transport("credentials contain invalid header characters".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of a posted form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
    pub status: u16,
    /// Where the server redirected to after accepting the form
    pub location: Option<String>,
}

/// Session-authenticated client for the server's JSON endpoints and forms
pub struct HttpZakenClient {
    client: Client,
    session_id: Option<SecretBox<String>>,
    csrf_token: Option<SecretBox<String>>,
}

impl HttpZakenClient {
    /// Create a client from configuration
    ///
    /// The total request timeout is `remote_timeout`; redirects are not
    /// followed so an expired session surfaces as a status error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.remote_timeout.max(1)))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            session_id: config.session_id().map(|s| SecretBox::new(Box::new(s))),
            csrf_token: config.csrf_token().map(|s| SecretBox::new(Box::new(s))),
        })
    }

    /// Create an unauthenticated client, used against local servers in tests
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            session_id: None,
            csrf_token: None,
        })
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(SecretBox::new(Box::new(session_id.into())));
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(SecretBox::new(Box::new(token.into())));
        self
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_ref().map(|t| t.expose_secret().as_str())
    }

    fn cookie_header(&self) -> Option<RedactedHeader> {
        let mut cookies = Vec::new();
        if let Some(session) = &self.session_id {
            cookies.push(format!("sessionid={}", session.expose_secret()));
        }
        if let Some(token) = &self.csrf_token {
            cookies.push(format!("csrftoken={}", token.expose_secret()));
        }
        if cookies.is_empty() {
            None
        } else {
            Some(RedactedHeader::new(cookies.join("; ")))
        }
    }

    fn get(&self, url: Url) -> std::result::Result<reqwest::RequestBuilder, FetchError> {
        let mut request = self.client.get(url);
        if let Some(cookie) = self.cookie_header() {
            request = request.header(header::COOKIE, cookie.as_header_value()?);
        }
        Ok(request)
    }

    /// Fetch a server-rendered page, for bootstrap extraction
    pub async fn fetch_page(&self, url: Url) -> Result<String> {
        tracing::debug!(%url, "fetching page");
        let response = self
            .get(url)?
            .header(header::ACCEPT, "text/html")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "page request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                messages: redirect_hint(status),
            }
            .into());
        }

        Ok(response.text().await?)
    }

    /// Post a form the way the browser does, with the CSRF token and referer
    ///
    /// Django answers an accepted form with a redirect; a 200 means the form
    /// was re-rendered with validation errors.
    pub async fn post_form(&self, url: Url, fields: &[(String, String)]) -> Result<FormResponse> {
        let mut request = self
            .client
            .post(url.clone())
            .header(header::REFERER, url.as_str())
            .form(fields);
        if let Some(cookie) = self.cookie_header() {
            request = request.header(header::COOKIE, cookie.as_header_value()?);
        }
        if let Some(token) = &self.csrf_token {
            let token = RedactedHeader::new(token.expose_secret().clone());
            request = request.header("X-CSRFToken", token.as_header_value()?);
        }

        tracing::info!(%url, fields = fields.len(), "posting form");
        let response = request.send().await?;
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if status.is_redirection() {
            return Ok(FormResponse {
                status: status.as_u16(),
                location,
            });
        }
        if status.is_success() {
            return Err(ArchiefError::InvalidForm(
                "the server rejected the form; check the field values".to_string(),
            ));
        }

        tracing::warn!(status = status.as_u16(), "form post rejected");
        Err(FetchError::Status {
            status: status.as_u16(),
            messages: Vec::new(),
        }
        .into())
    }
}

impl ZakenSource for HttpZakenClient {
    async fn fetch_zaken(&self, url: Url) -> std::result::Result<Vec<Zaak>, FetchError> {
        tracing::debug!(%url, "fetching zaken");
        let response = self
            .get(url)?
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "zaken response");

        match parse_zaken_response(status.as_u16(), &body) {
            Err(FetchError::Status { status: code, messages }) if messages.is_empty() => {
                tracing::warn!(status = code, "zaken request rejected");
                Err(FetchError::Status {
                    status: code,
                    messages: redirect_hint(status),
                })
            }
            other => other,
        }
    }
}

/// Unauthenticated requests are redirected to the login page
fn redirect_hint(status: StatusCode) -> Vec<String> {
    if status.is_redirection() || status == StatusCode::FORBIDDEN {
        vec!["Not logged in or session expired; set a valid session id.".to_string()]
    } else {
        Vec::new()
    }
}
