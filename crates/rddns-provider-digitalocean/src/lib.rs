// # DigitalOcean DNS Registrar
//
// This crate provides a DigitalOcean implementation of `DnsRegistrar` for
// the rddns synchronizer.
//
// ## Behavior
//
// - One instance is scoped to one domain
// - `list_records` follows pagination until every record is fetched
// - `update_record` issues exactly one PUT per call
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - Dry-run mode for safe testing
// - NO retry logic, NO caching, NO background tasks
//
// ## Security Requirements
//
// - Access token NEVER appears in logs
// - Provider MUST fail fast if the token is empty
//
// ## API Reference
//
// - DigitalOcean API v2: https://docs.digitalocean.com/reference/api/
// - List Domain Records: GET `/domains/:domain/records`
// - Update Domain Record: PUT `/domains/:domain/records/:record_id`

use async_trait::async_trait;
use rddns_core::records::{DomainRecord, RecordId, RecordUpdate};
use rddns_core::traits::DnsRegistrar;
use rddns_core::{Error, Result, SyncConfig};
use serde::Deserialize;
use std::time::Duration;

/// DigitalOcean API base URL
const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size requested when listing records (API maximum is 200)
const RECORDS_PER_PAGE: u32 = 200;

const PROVIDER_NAME: &str = "digitalocean";

/// One page of `GET /domains/:domain/records`
#[derive(Debug, Deserialize)]
struct RecordsPage {
    domain_records: Vec<DomainRecord>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    pages: Option<Pages>,
}

#[derive(Debug, Default, Deserialize)]
struct Pages {
    #[serde(default)]
    next: Option<String>,
}

impl RecordsPage {
    fn next_page(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.pages.as_ref())
            .and_then(|pages| pages.next.as_deref())
    }
}

/// Body of `PUT /domains/:domain/records/:id` responses
#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    domain_record: DomainRecord,
}

/// DigitalOcean DNS registrar
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the registrar will:
/// - Perform all GET requests (record listing)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records, answering as if the update succeeded
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the access token.
pub struct DigitalOceanRegistrar {
    /// DigitalOcean personal access token
    /// ⚠️ NEVER log this value
    access_token: String,

    /// Domain whose records are managed
    domain: String,

    /// API base URL (overridable for testing)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the access token
impl std::fmt::Debug for DigitalOceanRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanRegistrar")
            .field("access_token", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl DigitalOceanRegistrar {
    /// Create a new DigitalOcean registrar
    ///
    /// # Parameters
    ///
    /// - `access_token`: Token with read/write scope on domains
    /// - `domain`: Domain whose records are managed (e.g. "example.com")
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token or domain is empty, and an
    /// HTTP error if the client cannot be built.
    pub fn new(
        access_token: impl Into<String>,
        domain: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let access_token = access_token.into();
        let domain = domain.into();

        if access_token.is_empty() {
            return Err(Error::config("DigitalOcean access token cannot be empty"));
        }
        if domain.is_empty() {
            return Err(Error::config("DigitalOcean domain cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            access_token,
            domain,
            base_url: DIGITALOCEAN_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a registrar from the synchronizer configuration
    pub fn from_config(config: &SyncConfig, dry_run: bool) -> Result<Self> {
        if dry_run {
            tracing::warn!(
                "DigitalOcean registrar running in DRY-RUN mode - no changes will be made"
            );
        }
        Self::new(config.access_token.clone(), config.domain_name.clone(), dry_run)
    }

    /// Point the registrar at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether updates are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self) -> String {
        format!("{}/domains/{}/records", self.base_url, self.domain)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}", self.records_url(), id)
    }

    async fn get_page(&self, url: &str) -> Result<RecordsPage> {
        tracing::debug!(url, method = "GET", "Sending request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response, "Record listing").await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a non-success response to an error
async fn status_error(response: reqwest::Response, action: &str) -> Error {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid access token or insufficient scope. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{}: {} - {}", action, status, error_text)),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!(
                "DigitalOcean server error (transient): {} - {}",
                status, error_text
            ),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", action, status, error_text),
        ),
    }
}

#[async_trait]
impl DnsRegistrar for DigitalOceanRegistrar {
    /// List every record of the domain
    ///
    /// # API Calls
    ///
    /// ```http
    /// GET /domains/:domain/records?per_page=200
    /// Authorization: Bearer <token>
    /// ```
    ///
    /// followed by each `links.pages.next` URL until none is returned.
    async fn list_records(&self) -> Result<Vec<DomainRecord>> {
        let mut url = format!("{}?per_page={}", self.records_url(), RECORDS_PER_PAGE);
        let mut records = Vec::new();

        loop {
            let page = self.get_page(&url).await?;
            let next = page.next_page().map(str::to_string);
            records.extend(page.domain_records);

            match next {
                Some(next) if next != url => url = next,
                _ => break,
            }
        }

        tracing::debug!(
            domain = %self.domain,
            count = records.len(),
            "Listed DNS records"
        );
        Ok(records)
    }

    /// Replace a record's type, name and data
    ///
    /// # API Call (skipped in dry-run mode)
    ///
    /// ```http
    /// PUT /domains/:domain/records/:record_id
    /// { "type": "A", "name": "www", "data": "203.0.113.5" }
    /// ```
    async fn update_record(&self, id: &RecordId, update: &RecordUpdate) -> Result<DomainRecord> {
        let url = self.record_url(id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::json!(update)
            );
            return Ok(DomainRecord::new(
                id.clone(),
                update.record_type.clone(),
                update.name.clone(),
                update.data.clone(),
            ));
        }

        tracing::debug!(url = %url, method = "PUT", "Sending request");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
            .json(update)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response, "Record update").await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;
        let envelope: RecordEnvelope = serde_json::from_str(&body)?;

        tracing::info!(
            "DNS record updated successfully: {} -> {}",
            envelope.domain_record.name,
            envelope.domain_record.data
        );
        Ok(envelope.domain_record)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
