//! Request and response payloads for the admin endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::models::{Role, UserRecord};

/// New user payload submitted by an admin
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Name must be between 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Role change payload
#[derive(Debug, Deserialize, Validate)]
pub struct AssignRoleRequest {
    #[serde(rename = "userId")]
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,

    #[serde(rename = "newRole")]
    #[validate(length(min = 1, message = "New role is required"))]
    pub new_role: String,
}

#[derive(Debug, Serialize)]
pub struct AssignRoleResponse {
    pub success: bool,
    pub message: String,
}

/// User view returned by the admin endpoints. Never carries the password
/// hash or the MFA secret.
#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub avatar: String,
    #[serde(rename = "mfaEnabled")]
    pub mfa_enabled: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&UserRecord> for AdminUserView {
    fn from(user: &UserRecord) -> Self {
        AdminUserView {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
            mfa_enabled: user.mfa_enabled,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Audit log query parameters: optional substring filters plus pagination.
#[derive(Debug, Deserialize, Validate)]
pub struct AuditLogQuery {
    pub action: Option<String>,
    pub email: Option<String>,

    #[validate(range(min = 1))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u32>,
}
