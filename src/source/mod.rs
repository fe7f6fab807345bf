//! Row sources for the pace table.
//!
//! A row source answers exactly one question: "give me up to N rows where
//! the match field is present." The matching core does not care whether the
//! rows live in a local JSONL file or a remote Supabase table, only that
//! the order rows come back in is stable within one call.

mod jsonl;
mod supabase;

pub use jsonl::JsonlTable;
pub use supabase::SupabaseTable;

use async_trait::async_trait;
use thiserror::Error;

use crate::lookup::Row;

/// Default cap on rows fetched per lookup.
pub const DEFAULT_FETCH_LIMIT: usize = 1000;

/// Errors that can occur while fetching rows.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source not configured: {0}")]
    NotConfigured(String),
}

/// A read-only table of candidate rows.
///
/// Implementations are shared process-wide behind an `Arc` and issue no
/// writes, so no locking is required.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch up to `limit` rows where `match_field` is present and non-null.
    async fn fetch_rows(&self, match_field: &str, limit: usize) -> Result<Vec<Row>, SourceError>;

    /// Human-readable description of the source, for logs.
    fn describe(&self) -> String;
}
