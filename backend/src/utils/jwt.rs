//! JWT token utilities for authentication and authorization.
//!
//! Provides secure token creation, validation, and claims management for
//! full sessions and for the short-lived pending tokens issued between a
//! password check and MFA verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::ServiceError;
use crate::store::models::{Role, UserRecord};

/// JWT Claims structure for both session variants.
///
/// Full sessions carry `role` and `name`; pending-MFA tokens carry neither
/// and set `mfa_pending` instead. A pending token must never pass a bearer
/// check.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// User email
    pub email: String,
    /// User role (absent on pending-MFA tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Display name (absent on pending-MFA tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Set on tokens that still await MFA verification
    #[serde(default)]
    pub mfa_pending: bool,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_seconds: u64,
    pending_ttl_seconds: u64,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the application config
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            access_ttl_seconds: config.jwt_expires_in_seconds,
            pending_ttl_seconds: config.mfa_token_expires_in_seconds,
        }
    }

    /// Generate a full session token for an authenticated user
    pub fn generate_access_token(&self, user: &UserRecord) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_ttl_seconds as i64);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: Some(user.role),
            name: Some(user.name.clone()),
            mfa_pending: false,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal(format!("Token generation failed: {}", e)))
    }

    /// Generate a short-lived pending token after a successful password
    /// check when MFA is still required
    pub fn generate_mfa_token(&self, user: &UserRecord) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.pending_ttl_seconds as i64);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: None,
            name: None,
            mfa_pending: true,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal(format!("Token generation failed: {}", e)))
    }

    /// Validate and decode a token of either variant
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|_| ServiceError::unauthenticated("Session expired or invalid token"))
    }
}

impl Claims {
    /// Check if user has a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Check if user holds any of the given roles
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role.is_some_and(|held| roles.contains(&held))
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}
