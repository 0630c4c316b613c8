//! Data structures for authentication-related entities.
//!
//! This module defines the request and response payloads used by the login
//! and MFA endpoints. Field renames follow the wire contract consumed by
//! the dashboard client.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::models::{Role, UserRecord};

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response; either a full session or a pending-MFA handoff
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "requiresMFA", skip_serializing_if = "Option::is_none")]
    pub requires_mfa: Option<bool>,
    #[serde(rename = "mfaToken", skip_serializing_if = "Option::is_none")]
    pub mfa_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

impl LoginResponse {
    pub fn complete(token: String, user: UserInfo) -> Self {
        LoginResponse {
            success: true,
            token: Some(token),
            requires_mfa: None,
            mfa_token: None,
            user: Some(user),
        }
    }

    pub fn mfa_required(mfa_token: String) -> Self {
        LoginResponse {
            success: true,
            token: None,
            requires_mfa: Some(true),
            mfa_token: Some(mfa_token),
            user: None,
        }
    }
}

/// User information returned alongside a session token
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub avatar: String,
    #[serde(rename = "mfaEnabled")]
    pub mfa_enabled: bool,
}

impl From<&UserRecord> for UserInfo {
    fn from(user: &UserRecord) -> Self {
        UserInfo {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
            mfa_enabled: user.mfa_enabled,
        }
    }
}

/// Pending-token exchange request
#[derive(Debug, Deserialize, Validate)]
pub struct MfaVerifyLoginRequest {
    #[serde(rename = "mfaToken")]
    #[validate(length(min = 1, message = "MFA token is required"))]
    pub mfa_token: String,

    #[validate(length(min = 6, max = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

/// Full session issued after a correct one-time code
#[derive(Debug, Serialize)]
pub struct MfaVerifyLoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

/// Fresh enrollment payload: provisioning URI plus the raw secret for
/// manual entry
#[derive(Debug, Serialize)]
pub struct MfaSetupResponse {
    pub success: bool,
    #[serde(rename = "qrCode")]
    pub qr_code: String,
    pub secret: String,
}

/// Enrollment confirmation request carrying the 6-digit code
#[derive(Debug, Deserialize, Validate)]
pub struct MfaConfirmSetupRequest {
    #[validate(length(min = 6, max = 6, message = "Code must be 6 digits"))]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MfaConfirmSetupResponse {
    pub success: bool,
}
