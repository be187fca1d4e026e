use serde::{Deserialize, Serialize};

pub const DEFAULT_VERSION: &str = "no-version";

/// Body of `POST /predit/text`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionRequest {
    pub document: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Accepted for compatibility; the classifier is language-agnostic.
    #[serde(default)]
    pub multilingual: bool,
}

/// Per-segment result.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DocumentResult {
    pub label: String,
    pub score: f64,
    pub original_paragraph: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectionResponse {
    pub version: String,
    #[serde(rename = "scanId")]
    pub scan_id: String,
    pub documents: Vec<DocumentResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub batches: u64,
    pub items: u64,
}
