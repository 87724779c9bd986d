//! Page sources for the harvester.
//!
//! [`PageSource`] is the seam between the cursor loop and the network. The
//! production implementation is [`CrossrefClient`]; tests plug in canned pages.

use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};

/// User agent prefix for API requests. The contact identifier is appended.
const USER_AGENT_PREFIX: &str = concat!("affil-recon/", env!("CARGO_PKG_VERSION"));

/// Longest error-body excerpt kept in [`HarvestError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// One page of raw work items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorksPage {
    /// Raw items; parsed one by one so a bad item cannot sink the page.
    pub items: Vec<serde_json::Value>,
    /// Cursor for the following page. `None` means the source is exhausted.
    pub next_cursor: Option<String>,
    /// Total result count reported by the API, if any.
    pub total_results: Option<u64>,
}

/// Anything that can return a page of works for a cursor.
pub trait PageSource {
    /// Fetches the page starting at `cursor`.
    ///
    /// # Errors
    ///
    /// Transient failures satisfy [`HarvestError::is_transient`]; anything
    /// else ends the harvest.
    fn fetch_page(&self, cursor: &str) -> Result<WorksPage>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn fetch_page(&self, cursor: &str) -> Result<WorksPage> {
        (**self).fetch_page(cursor)
    }
}

/// Blocking client for the Crossref works endpoint.
#[derive(Debug, Clone)]
pub struct CrossrefClient {
    http: Client,
    endpoint: Url,
    filter: String,
    mailto: String,
    rows: u32,
}

impl CrossrefClient {
    /// Builds a client from harvest parameters.
    ///
    /// # Errors
    ///
    /// Fails if the endpoint is not a valid URL or the HTTP client cannot be built.
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let endpoint = Url::parse(config.endpoint.trim()).map_err(|e| {
            HarvestError::InvalidConfig(format!("invalid endpoint {}: {e}", config.endpoint))
        })?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("{USER_AGENT_PREFIX} (mailto:{})", config.mailto))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            filter: config.filter.clone(),
            mailto: config.mailto.clone(),
            rows: config.rows,
        })
    }

    /// Request URL for a cursor.
    pub fn page_url(&self, cursor: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("filter", &self.filter)
            .append_pair("rows", &self.rows.to_string())
            .append_pair("cursor", cursor)
            .append_pair("mailto", &self.mailto);
        url
    }
}

impl PageSource for CrossrefClient {
    fn fetch_page(&self, cursor: &str) -> Result<WorksPage> {
        let url = self.page_url(cursor);
        debug!(%url, "requesting page");

        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(HarvestError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let body = response.text()?;
        parse_page(&body)
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
    #[serde(default, rename = "next-cursor")]
    next_cursor: Option<String>,
    #[serde(default, rename = "total-results")]
    total_results: Option<u64>,
}

/// Parses a works response body into a page.
///
/// # Errors
///
/// [`HarvestError::Decode`] for invalid JSON, [`HarvestError::MalformedPage`]
/// when `message.items` is missing.
pub fn parse_page(body: &str) -> Result<WorksPage> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| HarvestError::Decode(e.to_string()))?;
    let message = envelope
        .message
        .ok_or_else(|| HarvestError::MalformedPage("missing `message`".to_string()))?;
    let items = message
        .items
        .ok_or_else(|| HarvestError::MalformedPage("missing `message.items`".to_string()))?;

    Ok(WorksPage {
        items,
        next_cursor: message.next_cursor.filter(|c| !c.is_empty()),
        total_results: message.total_results,
    })
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("{cut}...")
}
