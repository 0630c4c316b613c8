//! AI review forwarding.
//!
//! Builds the review prompt, forwards it to the configured generative-model
//! endpoint, and falls back to a scripted mock review when the call fails
//! for any reason. The model itself is an opaque collaborator; this module
//! only owns the request/fallback plumbing.

use rand::Rng;
use serde_json::json;

use crate::classifier::ScanType;
use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};

/// Validated input handed over by the submission endpoint.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub scan_type: ScanType,
    pub repo_ref: Option<String>,
    pub code: Option<String>,
    pub files: Vec<String>,
    pub custom_rules: Vec<String>,
}

/// Review text plus whether it came from the mock fallback.
#[derive(Debug)]
pub struct ReviewOutcome {
    pub review: String,
    pub is_mock: bool,
}

pub struct ReviewService<'a> {
    config: &'a Config,
    client: reqwest::Client,
}

impl<'a> ReviewService<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Forwards the review request to the model; any failure switches to
    /// the mock review rather than surfacing an error to the caller.
    pub async fn review(&self, input: ReviewInput) -> ReviewOutcome {
        match self.forward(&input).await {
            Ok(review) => ReviewOutcome {
                review,
                is_mock: false,
            },
            Err(error) => {
                tracing::warn!("AI analysis failed, switching to mock review: {}", error);
                ReviewOutcome {
                    review: mock_review().to_string(),
                    is_mock: true,
                }
            }
        }
    }

    async fn forward(&self, input: &ReviewInput) -> ServiceResult<String> {
        let api_key = self
            .config
            .ai_api_key
            .as_deref()
            .ok_or_else(|| ServiceError::external_service("AI_API_KEY is not configured"))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.ai_api_url, self.config.ai_model, api_key
        );

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": build_system_prompt(input.scan_type, &input.custom_rules) },
                    { "text": build_user_message(input) },
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::external_service(format!("Model request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::external_service(format!(
                "Model endpoint returned {}",
                status
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::external_service(format!("Unreadable model reply: {}", e)))?;

        let text = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ServiceError::external_service("Model reply carried no text"))?;

        Ok(strip_markdown_fences(&text))
    }
}

fn build_system_prompt(scan_type: ScanType, custom_rules: &[String]) -> String {
    let mut prompt = format!(
        "You are an expert Senior Software Architect and Security Engineer.\n\
         Analyze the provided code stored in the variable `code` or linked via `repoUrl`.\n\n\
         Review Type: {}\n\n\
         Required Output Format (JSON):\n\
         {{\n\
           \"overallScore\": number (0-100),\n\
           \"scores\": {{ \"security\": number, \"performance\": number, \"quality\": number, \"architecture\": number }},\n\
           \"issues\": [\n\
             {{ \"line\": number, \"type\": \"bug\"|\"security\"|\"performance\"|\"style\", \"severity\": \"low\"|\"medium\"|\"high\"|\"critical\", \"message\": \"string\", \"fix\": \"string\" }}\n\
           ],\n\
           \"summary\": \"string\"\n\
         }}",
        scan_type.label()
    );

    if !custom_rules.is_empty() {
        prompt.push_str(
            "\n\nSTRICT CUSTOM RULES ENABLED:\n\
             You must aggressively check for and enforce the following user-defined rules. \
             Reduce the score significantly if these are violated:\n",
        );
        for rule in custom_rules {
            prompt.push_str("- ");
            prompt.push_str(rule);
            prompt.push('\n');
        }
    }

    prompt
}

fn build_user_message(input: &ReviewInput) -> String {
    let repo = input.repo_ref.as_deref().unwrap_or("");
    let code = match input.code.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ if input.repo_ref.is_some() => "Full repo analysis".to_string(),
        _ => String::new(),
    };

    format!(
        "Repo: {}\nFiles: {}\nCode:\n```\n{}\n```",
        repo,
        serde_json::to_string(&input.files).unwrap_or_else(|_| "[]".to_string()),
        code
    )
}

/// Models often wrap JSON replies in markdown fences; strip them before
/// handing the text back.
fn strip_markdown_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Scripted review used whenever the model is unreachable.
fn mock_review() -> serde_json::Value {
    let mut rng = rand::thread_rng();

    json!({
        "overallScore": 85,
        "scores": {
            "security": rng.gen_range(85..98),
            "performance": rng.gen_range(75..95),
            "quality": rng.gen_range(88..99),
            "architecture": rng.gen_range(80..95),
        },
        "issues": [
            { "line": 42, "type": "SECURITY", "message": "Potential XSS in user input rendering", "fix": "Use DOMPurify.sanitize() before rendering HTML", "severity": "HIGH", "confidence": 95 },
            { "line": 12, "type": "PERFORMANCE", "message": "Heavy computation inside render cycle", "fix": "Wrap in useMemo() to prevent re-calculation", "severity": "MEDIUM", "confidence": 85 },
            { "line": 88, "type": "QUALITY", "message": "Magic number used in timeout", "fix": "Extract to a named constant (e.g. DEFAULT_TIMEOUT)", "severity": "LOW", "confidence": 99 },
            { "line": 0, "type": "ARCHITECTURE", "message": "UI logic mixed with data fetching", "fix": "Extract API calls to a custom hook", "severity": "MEDIUM", "confidence": 90 }
        ],
        "improvements": [
            "Implement proper error boundaries for better resilience",
            "Add unit tests for critical business logic",
            "Optimize bundle size by lazy loading heavy components"
        ],
        "businessImpact": "$4,500/mo potential savings by preventing downtime and security breaches"
    })
}
