//! Request and response payloads for the scan endpoints.

use serde::{Deserialize, Serialize};

use crate::classifier::ScanType;
use crate::services::scan_service::ScanIssue;

/// Repository scan submission
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(rename = "repoUrl", default)]
    pub repo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub issues: Vec<ScanIssue>,
    #[serde(rename = "repoUrl")]
    pub repo_url: String,
    #[serde(rename = "riskScore")]
    pub risk_score: u32,
    pub timestamp: String,
}

/// AI review submission. Input may arrive as a repository reference or a
/// raw snippet; the classifier decides which one it actually is.
#[derive(Debug, Deserialize)]
pub struct AiReviewRequest {
    #[serde(rename = "type", default)]
    pub scan_type: Option<String>,
    #[serde(rename = "repoUrl", default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(rename = "customRules", default)]
    pub custom_rules: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AiReviewResponse {
    pub success: bool,
    pub review: String,
    #[serde(rename = "type")]
    pub scan_type: ScanType,
    pub timestamp: String,
    #[serde(rename = "isMock", skip_serializing_if = "Option::is_none")]
    pub is_mock: Option<bool>,
}
