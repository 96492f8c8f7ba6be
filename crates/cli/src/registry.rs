//! Hydro-Québec tree registry client.
//!
//! Two endpoints under the configured base URL:
//! - `partiel/{index}/{page_size}`: a page of complete records. An empty
//!   page (or empty body) ends the listing.
//! - `arbre/{numero}`: one detail sheet.
//!
//! Responses go through the same JSON row decoder as local files, so keys
//! come out normalized (`numeroFiche` → `numerofiche`).

use std::time::Duration;

use verger_config::settings::HydroQuebecSettings;
use verger_core::Row;
use verger_recon::DetailFetcher;

use crate::exit_codes;
use crate::CliError;

const USER_AGENT: &str = concat!("verger/", env!("CARGO_PKG_VERSION"));

pub struct RegistryClient {
    http: reqwest::blocking::Client,
    base_url: String,
    page_size: usize,
    page_timeout: Duration,
    detail_timeout: Duration,
}

impl RegistryClient {
    pub fn new(settings: &HydroQuebecSettings) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError::fetch(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: settings.page_size.max(1),
            page_timeout: Duration::from_secs(settings.page_timeout_secs),
            detail_timeout: Duration::from_secs(settings.detail_timeout_secs),
        })
    }

    /// One `partiel` page starting at record `index`.
    pub fn fetch_page(&self, index: usize) -> Result<Vec<Row>, CliError> {
        let url = format!("{}/partiel/{index}/{}", self.base_url, self.page_size);
        let body = self.get(&url, self.page_timeout)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        verger_io::json::parse(&body).map_err(|e| CliError::fetch(format!("{url}: {e}")))
    }

    /// Walk pages until an empty one. `limit == 0` fetches everything.
    pub fn fetch_all(&self, limit: usize) -> Result<Vec<Row>, CliError> {
        let mut rows = Vec::new();
        let mut index = 0;
        loop {
            let page = self.fetch_page(index)?;
            if page.is_empty() {
                break;
            }
            index += page.len();
            tracing::debug!(
                "registry page {}-{}: {} records (total {})",
                index - page.len(),
                index,
                page.len(),
                rows.len() + page.len()
            );
            rows.extend(page);
            if limit > 0 && rows.len() >= limit {
                rows.truncate(limit);
                break;
            }
        }
        tracing::info!("fetched {} records from the Hydro-Québec registry", rows.len());
        Ok(rows)
    }

    pub fn fetch_sheet(&self, sheet_number: &str) -> Result<Row, CliError> {
        let url = format!("{}/arbre/{sheet_number}", self.base_url);
        let body = self.get(&url, self.detail_timeout)?;
        verger_io::json::parse(&body)
            .map_err(|e| CliError::fetch(format!("{url}: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| CliError::fetch(format!("{url}: empty detail sheet")))
    }

    fn get(&self, url: &str, timeout: Duration) -> Result<String, CliError> {
        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .timeout(timeout)
            .send()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_FETCH,
                message: format!("cannot reach the Hydro-Québec registry: {e}"),
                hint: Some("save the listing from a browser and pass it with --file".to_string()),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CliError::fetch(format!("{url}: HTTP {}", status.as_u16())));
        }
        resp.text().map_err(|e| CliError::fetch(format!("{url}: {e}")))
    }
}

impl DetailFetcher for RegistryClient {
    fn fetch_detail(&self, sheet_number: &str) -> Option<Row> {
        match self.fetch_sheet(sheet_number) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::debug!("detail sheet {sheet_number} unavailable: {}", e.message);
                None
            }
        }
    }
}
