//! PostgREST backend.
//!
//! Talks to a PostgREST-compatible REST surface (for example a Supabase
//! project) over HTTP. Requests are translated as follows:
//!
//! | Request part | Query string |
//! |--------------|--------------|
//! | embeds | `select=*,lab:labs(*),test:tests(*)` |
//! | `Filter::Eq` | `city=eq.Jaipur` |
//! | `Filter::Contains` | `name=ilike.*sugar*`, wildcards escaped |
//! | `Order` | `order=name.asc` |
//! | limit | `limit=1` |
//!
//! Non-2xx responses carry a JSON error body (`code`, `message`, `details`,
//! `hint`) which is surfaced as [`StorageError::QueryFailed`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::core::QueryBackend;
use crate::error::{BackendErrorBody, QueryOutcome, StorageError, StorageResult};
use crate::query::{Filter, InsertRequest, SelectRequest, Table};

/// Path under the project URL where the REST surface is mounted.
pub const DEFAULT_REST_PATH: &str = "rest/v1";

/// Connection settings for a PostgREST backend.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub base_url: String,
    /// Path of the REST surface under `base_url`.
    pub rest_path: String,
    /// Anonymous/public API key, sent as `apikey` and bearer token.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for PostgrestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            rest_path: DEFAULT_REST_PATH.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for a PostgREST surface.
#[derive(Debug, Clone)]
pub struct PostgrestBackend {
    client: Client,
    root: Url,
}

impl PostgrestBackend {
    /// Builds a backend from configuration.
    pub fn new(config: PostgrestConfig) -> StorageResult<Self> {
        let root = rest_root(&config.base_url, &config.rest_path)?;

        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let invalid = |_| StorageError::InvalidQuery {
                message: "API key contains characters not allowed in a header".to_string(),
            };
            headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid)?);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid)?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, root })
    }

    /// The REST root every table URL is resolved against.
    pub fn root(&self) -> &Url {
        &self.root
    }

    async fn read_rows(table: Table, response: Response) -> StorageResult<Vec<Value>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(table = %table, status = %status, "Backend returned an error");
            return QueryOutcome::<Vec<Value>>::failed(parse_error_body(status, &body))
                .into_result(table);
        }

        let rows: Vec<Value> = serde_json::from_str(&body).map_err(|e| StorageError::Decode {
            table,
            message: format!("response is not a row array: {}", e),
        })?;
        Ok(rows)
    }
}

#[async_trait]
impl QueryBackend for PostgrestBackend {
    fn backend_name(&self) -> &'static str {
        "postgrest"
    }

    async fn select(&self, request: &SelectRequest) -> StorageResult<Vec<Value>> {
        let url = select_url(&self.root, request)?;
        debug!(url = %url, "PostgREST select");

        let response = self.client.get(url).send().await?;
        Self::read_rows(request.table, response).await
    }

    async fn insert(&self, request: InsertRequest) -> StorageResult<Vec<Value>> {
        let url = table_url(&self.root, request.table)?;
        debug!(url = %url, rows = request.rows.len(), "PostgREST insert");

        let response = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&request.rows)
            .send()
            .await?;
        Self::read_rows(request.table, response).await
    }
}

fn rest_root(base_url: &str, rest_path: &str) -> StorageResult<Url> {
    let mut base = base_url.trim_end_matches('/').to_string();
    base.push('/');
    let path = rest_path.trim_matches('/');
    if !path.is_empty() {
        base.push_str(path);
        base.push('/');
    }
    Url::parse(&base).map_err(|e| StorageError::InvalidQuery {
        message: format!("invalid backend URL '{}': {}", base_url, e),
    })
}

fn table_url(root: &Url, table: Table) -> StorageResult<Url> {
    root.join(table.as_str())
        .map_err(|e| StorageError::InvalidQuery {
            message: format!("cannot build URL for {}: {}", table, e),
        })
}

/// Builds the GET URL for a select request.
pub fn select_url(root: &Url, request: &SelectRequest) -> StorageResult<Url> {
    let mut url = table_url(root, request.table)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("select", &request.select_expression());
        for filter in &request.filters {
            match filter {
                Filter::Eq { column, value } => {
                    query.append_pair(column, &format!("eq.{}", value));
                }
                Filter::Contains { column, needle } => {
                    query.append_pair(column, &format!("ilike.*{}*", escape_like(needle)));
                }
            }
        }
        if let Some(order) = &request.order {
            query.append_pair("order", &format!("{}.asc", order.column));
        }
        if let Some(limit) = request.limit {
            query.append_pair("limit", &limit.to_string());
        }
    }
    Ok(url)
}

/// Escapes pattern characters so a substring filter matches the needle literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_' | '*') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_error_body(status: StatusCode, body: &str) -> BackendErrorBody {
    match serde_json::from_str::<BackendErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => parsed,
        _ if body.trim().is_empty() => BackendErrorBody::new(format!("HTTP {}", status)),
        _ => BackendErrorBody::new(format!("HTTP {}: {}", status, body.trim())),
    }
}
