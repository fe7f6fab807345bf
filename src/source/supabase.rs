//! Supabase (PostgREST) remote pace table.
//!
//! Reads rows over the REST interface: `GET /rest/v1/{table}` with a
//! `not.is.null` filter on the match field and a row limit. The client is
//! built once and reused for the process lifetime; the core never writes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{RowSource, SourceError};
use crate::lookup::Row;

/// Environment variables checked for the API key, in order.
const KEY_ENV_VARS: [&str; 2] = ["SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_ANON_KEY"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote Supabase table accessed over PostgREST.
pub struct SupabaseTable {
    client: Client,
    base_url: Url,
    table: String,
}

impl SupabaseTable {
    /// Build a client for `base_url` (the project URL, e.g.
    /// `https://xyz.supabase.co`) with the key from the environment.
    pub fn new(base_url: &str, table: &str) -> Result<Self, SourceError> {
        let key = resolve_api_key().ok_or_else(|| {
            SourceError::NotConfigured(format!(
                "no Supabase API key set (tried {})",
                KEY_ENV_VARS.join(", ")
            ))
        })?;
        Self::with_key(base_url, table, &key)
    }

    /// Build a client with an explicit API key.
    pub fn with_key(base_url: &str, table: &str, api_key: &str) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SourceError::NotConfigured(format!("invalid Supabase URL: {}", e)))?;

        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(api_key)
            .map_err(|_| SourceError::NotConfigured("API key is not a valid header".into()))?;
        headers.insert("apikey", key_value);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| SourceError::NotConfigured("API key is not a valid header".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            table: table.to_string(),
        })
    }
}

fn resolve_api_key() -> Option<String> {
    KEY_ENV_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
}

#[async_trait]
impl RowSource for SupabaseTable {
    async fn fetch_rows(&self, match_field: &str, limit: usize) -> Result<Vec<Row>, SourceError> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", self.table))
            .map_err(|e| SourceError::NotConfigured(format!("invalid table URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair(match_field, "not.is.null")
            .append_pair("limit", &limit.to_string());

        debug!("Fetching up to {} rows from {}", limit, url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<Row> = response.json().await?;
        debug!("Fetched {} rows from table '{}'", rows.len(), self.table);
        Ok(rows)
    }

    fn describe(&self) -> String {
        // Url renders host-only URLs with a trailing slash already
        format!("supabase:{}{}", self.base_url, self.table)
    }
}
