//! Handler for the dashboard metrics snapshot.
//!
//! The numbers are the demo's static narrative; only the caller identity
//! comes from the session.

use crate::api::common::ApiResponse;
use crate::store::models::Role;
use crate::utils::jwt::Claims;
use axum::{extract::Extension, http::StatusCode, response::Json as ResponseJson};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub email: String,
    pub role: Option<Role>,
    pub roi: String,
    pub quality: String,
    pub team: String,
    pub scans: u32,
    #[serde(rename = "vulnerabilitiesFixed")]
    pub vulnerabilities_fixed: u32,
}

/// Dashboard snapshot for any authenticated role
#[axum::debug_handler]
pub async fn dashboard(
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<DashboardData>>, (StatusCode, String)> {
    let data = DashboardData {
        email: claims.email.clone(),
        role: claims.role,
        roi: "$142K".to_string(),
        quality: "89/100".to_string(),
        team: "@sarah 97/100".to_string(),
        scans: 124,
        vulnerabilities_fixed: 45,
    };

    Ok(ResponseJson(ApiResponse::success(data, "Dashboard metrics")))
}
