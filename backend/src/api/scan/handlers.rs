//! Handler functions for scan submission endpoints.
//!
//! Both endpoints run the shared classifier before anything else; rejected
//! input never reaches the scanner or the review forwarder.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::api::scan::models::*;
use crate::auth::middleware::authorize;
use crate::classifier::{Classification, InputCategory, ScanType, classify};
use crate::config::Config;
use crate::errors::ServiceError;
use crate::services::review_service::{ReviewInput, ReviewService};
use crate::services::scan_service;
use crate::store::models::Role;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};

/// Builds the 400 response for a rejected submission.
fn classification_rejection(classification: &Classification) -> (StatusCode, String) {
    let message = classification
        .error
        .as_deref()
        .unwrap_or("Invalid input")
        .to_string();
    let body = ApiResponse::<()>::error(message, "invalid_input", None);
    (
        StatusCode::BAD_REQUEST,
        serde_json::to_string(&body).unwrap(),
    )
}

/// Handle a repository security scan request
#[axum::debug_handler]
pub async fn run_scan(
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ScanRequest>,
) -> Result<ResponseJson<ScanResponse>, (StatusCode, String)> {
    if let Err(error) = authorize(&claims, &[Role::Admin, Role::Developer]) {
        return Err(service_error_to_http(error));
    }

    let input = payload.repo_url.unwrap_or_default();
    let classification = classify(&input, ScanType::Security);
    if !classification.valid {
        return Err(classification_rejection(&classification));
    }

    // Security scans only accept repository references, so an accepted
    // classification always carries one.
    let Some(repo_url) = classification.repo_ref else {
        return Err(service_error_to_http(ServiceError::internal(
            "Accepted scan without a repository reference",
        )));
    };
    let report = scan_service::run_scan(&repo_url);

    Ok(ResponseJson(ScanResponse {
        success: true,
        issues: report.issues,
        repo_url,
        risk_score: report.risk_score,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Handle an AI review request for a repository or code snippet
#[axum::debug_handler]
pub async fn ai_review(
    Extension(config): Extension<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AiReviewRequest>,
) -> Result<ResponseJson<AiReviewResponse>, (StatusCode, String)> {
    if let Err(error) = authorize(&claims, &[Role::Admin, Role::Developer]) {
        return Err(service_error_to_http(error));
    }

    let scan_type = match payload.scan_type.as_deref() {
        None => ScanType::Security,
        Some(raw) => raw
            .parse::<ScanType>()
            .map_err(|e| service_error_to_http(ServiceError::validation(e)))?,
    };

    let input = payload
        .repo_url
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .or_else(|| {
            payload
                .code
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
        })
        .unwrap_or("")
        .to_string();

    let classification = classify(&input, scan_type);
    if !classification.valid {
        return Err(classification_rejection(&classification));
    }

    tracing::info!("Validated {:?} submission for {}", classification.category, scan_type);

    // The classifier's verdict wins over which field the client used.
    let (repo_ref, code) = match classification.category {
        InputCategory::Repo => (classification.repo_ref.clone(), payload.code.clone()),
        _ => (payload.repo_url.clone(), Some(input)),
    };

    let review_service = ReviewService::new(&config);
    let outcome = review_service
        .review(ReviewInput {
            scan_type,
            repo_ref,
            code,
            files: payload.files,
            custom_rules: payload.custom_rules,
        })
        .await;

    Ok(ResponseJson(AiReviewResponse {
        success: true,
        review: outcome.review,
        scan_type,
        timestamp: chrono::Utc::now().to_rfc3339(),
        is_mock: outcome.is_mock.then_some(true),
    }))
}
