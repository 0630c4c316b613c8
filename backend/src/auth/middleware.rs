//! Middleware for protecting authenticated routes and handling authorization.
//!
//! This module contains logic for validating bearer tokens and enforcing
//! role requirements across the API endpoints. A missing credential is
//! reported as 401; a bad, expired, or pending-MFA credential as 403.

use axum::{
    extract::Request,
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};
use crate::store::models::Role;
use crate::utils::jwt::{Claims, JwtUtils};

/// JWT authentication middleware
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check if it's a Bearer token
    if !auth_header.starts_with("Bearer ") {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = &auth_header[7..]; // Remove "Bearer " prefix

    let config = request
        .extensions()
        .get::<Config>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    let jwt_utils = JwtUtils::new(&config);

    match jwt_utils.validate_token(token) {
        // A pending-MFA token is not a session credential.
        Ok(claims) if claims.mfa_pending => Err(StatusCode::FORBIDDEN),
        Ok(claims) => {
            // Add claims to request extensions for use in handlers
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(_) => Err(StatusCode::FORBIDDEN),
    }
}

/// Role check used by every role-gated handler. Only full sessions pass;
/// pending-MFA claims never authorize anything.
pub fn authorize(claims: &Claims, required: &[Role]) -> ServiceResult<()> {
    if claims.mfa_pending || claims.role.is_none() {
        return Err(ServiceError::unauthenticated("Authentication required"));
    }

    if claims.has_any_role(required) {
        return Ok(());
    }

    let allowed: Vec<&str> = required.iter().map(|role| role.as_str()).collect();
    Err(ServiceError::permission_denied(format!(
        "Requires one of: {}",
        allowed.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<Role>, mfa_pending: bool) -> Claims {
        Claims {
            sub: "u1".to_string(),
            email: "dev@codeguardian.ai".to_string(),
            role,
            name: None,
            mfa_pending,
            exp: usize::MAX,
            iat: 0,
        }
    }

    #[test]
    fn matching_roles_are_authorized() {
        let admin = claims(Some(Role::Admin), false);
        assert!(authorize(&admin, &[Role::Admin]).is_ok());
        assert!(authorize(&admin, &[Role::Admin, Role::Developer]).is_ok());
    }

    #[test]
    fn missing_roles_are_forbidden() {
        let viewer = claims(Some(Role::Viewer), false);
        let error = authorize(&viewer, &[Role::Admin, Role::Developer]).unwrap_err();
        assert!(matches!(error, ServiceError::PermissionDenied { .. }));
    }

    #[test]
    fn pending_mfa_claims_never_authorize() {
        let pending = claims(None, true);
        let error = authorize(&pending, &[Role::Viewer]).unwrap_err();
        assert!(matches!(error, ServiceError::Unauthenticated { .. }));

        // Even a pending token that somehow carried a role is refused.
        let pending_with_role = claims(Some(Role::Admin), true);
        let error = authorize(&pending_with_role, &[Role::Admin]).unwrap_err();
        assert!(matches!(error, ServiceError::Unauthenticated { .. }));
    }
}
