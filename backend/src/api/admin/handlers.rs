//! Handler functions for admin API endpoints.
//!
//! Every handler re-checks the caller's role through `authorize`; the user
//! list is open to developers, everything else is admin-only.

use crate::api::admin::models::*;
use crate::api::common::{
    ApiResponse, PaginationFilter, PaginationMeta, apply_pagination, service_error_to_http,
    validation_error_response,
};
use crate::auth::middleware::authorize;
use crate::services::user_service::UserService;
use crate::store::SharedStore;
use crate::store::models::{AuditEvent, Role};
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use validator::Validate;

/// List users (ADMIN and DEVELOPER)
#[axum::debug_handler]
pub async fn list_users(
    Extension(store): Extension<SharedStore>,
    Extension(claims): Extension<Claims>,
    Query(pagination): Query<PaginationFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<AdminUserView>>>, (StatusCode, String)> {
    if let Err(error) = authorize(&claims, &[Role::Admin, Role::Developer]) {
        return Err(service_error_to_http(error));
    }
    if let Err(errors) = pagination.validate() {
        return Err(validation_error_response(errors));
    }

    let user_service = UserService::new(store.as_ref());
    let users = match user_service.list_users().await {
        Ok(users) => users,
        Err(error) => return Err(service_error_to_http(error)),
    };

    let total = users.len() as u64;
    let views: Vec<AdminUserView> = apply_pagination(users, &pagination)
        .iter()
        .map(AdminUserView::from)
        .collect();
    let meta = PaginationMeta::from_filter(&pagination, total);

    Ok(ResponseJson(ApiResponse::paginated(
        views,
        meta,
        "Users retrieved",
    )))
}

/// Create a user (ADMIN only)
#[axum::debug_handler]
pub async fn create_user(
    Extension(store): Extension<SharedStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<ResponseJson<ApiResponse<AdminUserView>>, (StatusCode, String)> {
    if let Err(error) = authorize(&claims, &[Role::Admin]) {
        return Err(service_error_to_http(error));
    }

    let user_service = UserService::new(store.as_ref());
    match user_service.create_user(&claims, payload).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            AdminUserView::from(&user),
            "User created",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Delete a user (ADMIN only)
#[axum::debug_handler]
pub async fn delete_user(
    Extension(store): Extension<SharedStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<AdminUserView>>, (StatusCode, String)> {
    if let Err(error) = authorize(&claims, &[Role::Admin]) {
        return Err(service_error_to_http(error));
    }

    let user_service = UserService::new(store.as_ref());
    match user_service.delete_user(&claims, &id).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            AdminUserView::from(&user),
            "User deleted",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Change a user's role (ADMIN only)
#[axum::debug_handler]
pub async fn assign_role(
    Extension(store): Extension<SharedStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<ResponseJson<AssignRoleResponse>, (StatusCode, String)> {
    if let Err(error) = authorize(&claims, &[Role::Admin]) {
        return Err(service_error_to_http(error));
    }
    if let Err(errors) = payload.validate() {
        return Err(validation_error_response(errors));
    }

    let user_service = UserService::new(store.as_ref());
    match user_service
        .assign_role(&claims, &payload.user_id, &payload.new_role)
        .await
    {
        Ok(user) => Ok(ResponseJson(AssignRoleResponse {
            success: true,
            message: format!("{} is now {}", user.email, user.role),
        })),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Filters the audit trail with optional case-insensitive substring
/// matches, newest first.
fn filter_audit_events(events: Vec<AuditEvent>, query: &AuditLogQuery) -> Vec<AuditEvent> {
    let action_needle = query.action.as_deref().map(str::to_uppercase);
    let email_needle = query.email.as_deref().map(str::to_lowercase);

    let mut filtered: Vec<AuditEvent> = events
        .into_iter()
        .filter(|event| {
            action_needle
                .as_deref()
                .is_none_or(|needle| event.action.to_uppercase().contains(needle))
        })
        .filter(|event| {
            email_needle
                .as_deref()
                .is_none_or(|needle| event.actor.to_lowercase().contains(needle))
        })
        .collect();

    filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    filtered
}

/// Query the audit trail (ADMIN only)
#[axum::debug_handler]
pub async fn audit_logs(
    Extension(store): Extension<SharedStore>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AuditLogQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<AuditEvent>>>, (StatusCode, String)> {
    if let Err(error) = authorize(&claims, &[Role::Admin]) {
        return Err(service_error_to_http(error));
    }
    if let Err(errors) = query.validate() {
        return Err(validation_error_response(errors));
    }

    let events = match store.list_audit().await {
        Ok(events) => events,
        Err(error) => return Err(service_error_to_http(error.into())),
    };

    let filtered = filter_audit_events(events, &query);
    let total = filtered.len() as u64;

    let pagination = PaginationFilter {
        page: query.page,
        per_page: query.per_page,
    };
    let page = apply_pagination(filtered, &pagination);
    let meta = PaginationMeta::from_filter(&pagination, total);

    Ok(ResponseJson(ApiResponse::paginated(
        page,
        meta,
        "Audit events retrieved",
    )))
}
