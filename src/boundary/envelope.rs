//! Response envelope and request context

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "request-id";

/// Body returned to the client for a failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub timestamp: String,
    pub path: Option<String>,
    pub message: String,
    pub request_id: Option<String>,
    /// Only set outside production
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// The parts of an inbound request the normalizer reads
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HashMap<String, String>,
    url: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Header names are matched case-insensitively
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID_HEADER)
    }
}
