//! Access to the records-retention server.
//!
//! The controller only depends on [`ZakenSource`]; [`HttpZakenClient`] is the
//! production implementation and tests substitute in-memory sources.

pub mod client;
pub mod error;

use url::Url;

use crate::types::Zaak;

pub use client::{FormResponse, HttpZakenClient};
pub use error::{FetchError, GENERIC_ERROR_MESSAGE};

/// Anything that can answer a records query
pub trait ZakenSource: Send + Sync + 'static {
    /// Fetch the records matching a fully built query URL
    fn fetch_zaken(
        &self,
        url: Url,
    ) -> impl std::future::Future<Output = std::result::Result<Vec<Zaak>, FetchError>> + Send;
}
