use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

/// A successfully downloaded HTML document, decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub content_type: String,
    /// Label of the encoding the body was decoded from.
    pub encoding: &'static str,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}
