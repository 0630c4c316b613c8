//! Core business logic for the authentication system.
//!
//! Implements the session state machine: password login, the pending-MFA
//! exchange, and MFA enrollment. Role assignment and the rest of user
//! administration live in `services::user_service`.

use crate::auth::models::{LoginRequest, MfaVerifyLoginRequest};
use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};
use crate::services::user_service::UserService;
use crate::store::models::{AuditEvent, UserRecord};
use crate::store::{UpdateOutcome, UserStore, UserUpdate};
use crate::utils::crypto::SecretCipher;
use crate::utils::jwt::{Claims, JwtUtils};
use crate::utils::totp;
use validator::Validate;

/// Result of a successful password check.
#[derive(Debug)]
pub enum LoginOutcome {
    /// MFA is off for the account; a full session was issued directly.
    Complete { token: String, user: UserRecord },
    /// Password accepted, second factor outstanding. The pending token can
    /// only be exchanged through `verify_mfa_login` before it expires.
    MfaRequired { mfa_token: String },
}

/// Payload handed back by `setup_mfa`.
#[derive(Debug)]
pub struct MfaEnrollment {
    pub qr_code: String,
    pub secret: String,
}

/// Authentication service for handling login, MFA, and token generation
pub struct AuthService<'a> {
    store: &'a dyn UserStore,
    jwt: JwtUtils,
    cipher: SecretCipher,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(store: &'a dyn UserStore, config: &Config) -> ServiceResult<Self> {
        let cipher = SecretCipher::new(&config.mfa_encryption_key)
            .map_err(|e| ServiceError::internal(format!("MFA cipher setup failed: {}", e)))?;

        Ok(AuthService {
            store,
            jwt: JwtUtils::new(config),
            cipher,
        })
    }

    /// Authenticate a credential pair and either issue a full session or
    /// pend the session on a second factor.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginOutcome> {
        validate_request(&request)?;

        let user_service = UserService::new(self.store);
        let user = match user_service
            .authenticate(&request.email, &request.password)
            .await
        {
            Ok(user) => user,
            Err(error) => {
                if matches!(error, ServiceError::InvalidCredentials) {
                    self.audit(&request.email, "LOGIN_FAILED", "Invalid credentials".to_string())
                        .await;
                }
                return Err(error);
            }
        };

        if user.mfa_enabled {
            let mfa_token = self.jwt.generate_mfa_token(&user)?;
            self.audit(
                &user.email,
                "LOGIN_MFA_REQUIRED",
                "Password accepted, awaiting MFA code".to_string(),
            )
            .await;
            return Ok(LoginOutcome::MfaRequired { mfa_token });
        }

        let token = self.jwt.generate_access_token(&user)?;
        self.audit(&user.email, "LOGIN_SUCCESS", "Signed in".to_string())
            .await;

        Ok(LoginOutcome::Complete { token, user })
    }

    /// Exchange a pending-MFA token plus a correct one-time code for a full
    /// session.
    ///
    /// A malformed, expired, or non-pending token always fails with
    /// `MfaSessionExpired`, regardless of the code. Pending tokens are
    /// single-use in intent only; their short expiry is the sole
    /// enforcement.
    pub async fn verify_mfa_login(
        &self,
        request: MfaVerifyLoginRequest,
    ) -> ServiceResult<(String, UserRecord)> {
        validate_request(&request)?;

        let claims = self.jwt.validate_token(&request.mfa_token).map_err(|_| {
            ServiceError::mfa_session_expired("MFA session expired. Please sign in again.")
        })?;

        if !claims.mfa_pending {
            return Err(ServiceError::mfa_session_expired(
                "MFA session expired. Please sign in again.",
            ));
        }

        let user = UserService::new(self.store)
            .get_user_required(&claims.sub)
            .await?;

        if !user.mfa_enabled {
            return Err(ServiceError::mfa_invalid("MFA is not enabled for this account"));
        }

        if !self.check_code(&user, &request.code)? {
            self.audit(&user.email, "MFA_LOGIN_FAILED", "Incorrect MFA code".to_string())
                .await;
            return Err(ServiceError::mfa_invalid("Invalid MFA code"));
        }

        let token = self.jwt.generate_access_token(&user)?;
        self.audit(&user.email, "MFA_LOGIN_SUCCESS", "Signed in with MFA".to_string())
            .await;

        Ok((token, user))
    }

    /// Generate a fresh shared secret for the caller and store it
    /// unconfirmed. MFA stays disabled until `confirm_mfa_setup` verifies a
    /// code against this secret.
    pub async fn setup_mfa(&self, claims: &Claims) -> ServiceResult<MfaEnrollment> {
        let user = UserService::new(self.store)
            .get_user_required(&claims.sub)
            .await?;

        let secret = totp::generate_secret();
        let qr_code = totp::provisioning_uri(&secret, &user.email)?;
        let encrypted_secret = self
            .cipher
            .encrypt(&secret)
            .map_err(|e| ServiceError::internal(format!("Secret encryption failed: {}", e)))?;

        match self
            .store
            .update_user(&user.id, UserUpdate::BeginMfaEnrollment { encrypted_secret })
            .await?
        {
            UpdateOutcome::Updated(_) => Ok(MfaEnrollment { qr_code, secret }),
            UpdateOutcome::NotFound => Err(ServiceError::not_found("User", &user.id)),
            UpdateOutcome::Conflict => Err(ServiceError::internal("MFA enrollment conflicted")),
        }
    }

    /// Verify a code against the just-generated secret and enable MFA.
    ///
    /// On failure the secret stays stored and MFA stays off, so the caller
    /// may retry without re-running `setup_mfa`. The enable flips through a
    /// compare-and-set on the stored ciphertext, so a concurrent re-setup
    /// cannot be confirmed by a stale code.
    pub async fn confirm_mfa_setup(&self, claims: &Claims, code: &str) -> ServiceResult<()> {
        let user = UserService::new(self.store)
            .get_user_required(&claims.sub)
            .await?;

        let Some(expected_secret) = user.mfa_secret.clone() else {
            return Err(ServiceError::mfa_invalid("MFA setup has not been started"));
        };

        if !self.check_code(&user, code)? {
            return Err(ServiceError::mfa_invalid("Invalid MFA code"));
        }

        match self
            .store
            .update_user(&user.id, UserUpdate::ConfirmMfaEnrollment { expected_secret })
            .await?
        {
            UpdateOutcome::Updated(_) => {
                self.audit(&user.email, "MFA_ENABLED", "MFA enrollment confirmed".to_string())
                    .await;
                Ok(())
            }
            UpdateOutcome::Conflict => Err(ServiceError::mfa_invalid(
                "MFA setup changed. Scan the newest QR code and retry",
            )),
            UpdateOutcome::NotFound => Err(ServiceError::not_found("User", &user.id)),
        }
    }

    /// Decrypts the stored secret and checks the submitted code against the
    /// current time window.
    fn check_code(&self, user: &UserRecord, code: &str) -> ServiceResult<bool> {
        let Some(encrypted) = user.mfa_secret.as_deref() else {
            return Err(ServiceError::mfa_invalid("MFA is not set up for this account"));
        };

        let secret = self
            .cipher
            .decrypt(encrypted)
            .map_err(|e| ServiceError::internal(format!("Secret decryption failed: {}", e)))?;

        totp::verify_code(&secret, &user.email, code)
    }

    /// Appends an audit event after the fact. Failures are logged and never
    /// surfaced to the caller.
    async fn audit(&self, actor_email: &str, action: &str, detail: String) {
        let event = AuditEvent::new(actor_email, action, detail);
        if let Err(error) = self.store.append_audit(event).await {
            tracing::warn!("Failed to append audit event {}: {}", action, error);
        }
    }
}

fn validate_request<T: Validate>(request: &T) -> ServiceResult<()> {
    if let Err(validation_errors) = request.validate() {
        let error_messages: Vec<String> = validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        return Err(ServiceError::validation(error_messages.join(", ")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::store::models::Role;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn test_config() -> Config {
        Config {
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in_seconds: 86400,
            mfa_token_expires_in_seconds: 300,
            mfa_encryption_key: "test-encryption-key".to_string(),
            server_port: 0,
            ai_api_url: String::new(),
            ai_api_key: None,
            ai_model: String::new(),
        }
    }

    async fn store_with_user(email: &str, mfa_enabled: bool) -> MemoryStore {
        let store = MemoryStore::new();
        let now = Utc::now();
        let user = UserRecord {
            id: "u1".to_string(),
            email: email.to_string(),
            name: "Test User".to_string(),
            avatar: "T".to_string(),
            // Low cost keeps the tests fast.
            password_hash: bcrypt::hash("password123", 4).unwrap(),
            role: Role::Developer,
            mfa_enabled,
            mfa_secret: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_user(user).await.unwrap();
        store
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn claims_for(id: &str, email: &str) -> Claims {
        Claims {
            sub: id.to_string(),
            email: email.to_string(),
            role: Some(Role::Developer),
            name: Some("Test User".to_string()),
            mfa_pending: false,
            exp: usize::MAX,
            iat: 0,
        }
    }

    /// Runs setup + confirm and returns the enrolled secret.
    async fn enroll_mfa(service: &AuthService<'_>, claims: &Claims) -> String {
        let enrollment = service.setup_mfa(claims).await.unwrap();
        let code = totp::current_code(&enrollment.secret, &claims.email).unwrap();
        service.confirm_mfa_setup(claims, &code).await.unwrap();
        enrollment.secret
    }

    #[tokio::test]
    async fn login_without_mfa_issues_a_full_session() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();

        let outcome = service
            .login(login_request("dev@codeguardian.ai", "password123"))
            .await
            .unwrap();

        let LoginOutcome::Complete { token, user } = outcome else {
            panic!("expected a full session");
        };
        assert_eq!(user.email, "dev@codeguardian.ai");

        let claims = JwtUtils::new(&config).validate_token(&token).unwrap();
        assert_eq!(claims.role, Some(Role::Developer));
        assert!(!claims.mfa_pending);
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails_and_audits() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();

        let error = service
            .login(login_request("dev@codeguardian.ai", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::InvalidCredentials));

        let events = store.list_audit().await.unwrap();
        assert_eq!(events.last().unwrap().action, "LOGIN_FAILED");
    }

    #[tokio::test]
    async fn login_with_mfa_enabled_pends_the_session() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");
        enroll_mfa(&service, &claims).await;

        let outcome = service
            .login(login_request("dev@codeguardian.ai", "password123"))
            .await
            .unwrap();

        let LoginOutcome::MfaRequired { mfa_token } = outcome else {
            panic!("expected a pending session");
        };

        // The pending token carries no role and cannot be mistaken for a
        // full session.
        let pending = JwtUtils::new(&config).validate_token(&mfa_token).unwrap();
        assert!(pending.mfa_pending);
        assert!(pending.role.is_none());
    }

    #[tokio::test]
    async fn pending_token_exchanges_for_a_full_session_with_a_correct_code() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");
        let secret = enroll_mfa(&service, &claims).await;

        let LoginOutcome::MfaRequired { mfa_token } = service
            .login(login_request("dev@codeguardian.ai", "password123"))
            .await
            .unwrap()
        else {
            panic!("expected a pending session");
        };

        let code = totp::current_code(&secret, "dev@codeguardian.ai").unwrap();
        let (token, user) = service
            .verify_mfa_login(MfaVerifyLoginRequest {
                mfa_token,
                code,
            })
            .await
            .unwrap();

        assert_eq!(user.email, "dev@codeguardian.ai");
        let session = JwtUtils::new(&config).validate_token(&token).unwrap();
        assert_eq!(session.role, Some(Role::Developer));
        assert!(!session.mfa_pending);
    }

    #[tokio::test]
    async fn wrong_code_fails_with_mfa_invalid() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");
        enroll_mfa(&service, &claims).await;

        let LoginOutcome::MfaRequired { mfa_token } = service
            .login(login_request("dev@codeguardian.ai", "password123"))
            .await
            .unwrap()
        else {
            panic!("expected a pending session");
        };

        let error = service
            .verify_mfa_login(MfaVerifyLoginRequest {
                mfa_token,
                code: "000000".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::MfaInvalid { .. }));
    }

    #[tokio::test]
    async fn expired_pending_token_fails_regardless_of_code_correctness() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");
        let secret = enroll_mfa(&service, &claims).await;

        // Hand-craft a pending token expired past the decoding leeway.
        let now = Utc::now().timestamp();
        let stale = Claims {
            sub: "u1".to_string(),
            email: "dev@codeguardian.ai".to_string(),
            role: None,
            name: None,
            mfa_pending: true,
            exp: (now - 400) as usize,
            iat: (now - 700) as usize,
        };
        let stale_token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret("test-secret".as_bytes()),
        )
        .unwrap();

        let code = totp::current_code(&secret, "dev@codeguardian.ai").unwrap();
        let error = service
            .verify_mfa_login(MfaVerifyLoginRequest {
                mfa_token: stale_token,
                code,
            })
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::MfaSessionExpired { .. }));
    }

    #[tokio::test]
    async fn full_session_token_is_not_accepted_as_a_pending_token() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");
        let secret = enroll_mfa(&service, &claims).await;

        let user = store.find_by_id("u1").await.unwrap().unwrap();
        let access_token = JwtUtils::new(&config).generate_access_token(&user).unwrap();

        let code = totp::current_code(&secret, "dev@codeguardian.ai").unwrap();
        let error = service
            .verify_mfa_login(MfaVerifyLoginRequest {
                mfa_token: access_token,
                code,
            })
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::MfaSessionExpired { .. }));
    }

    #[tokio::test]
    async fn setup_then_confirm_flips_mfa_on() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");

        let enrollment = service.setup_mfa(&claims).await.unwrap();
        assert!(enrollment.qr_code.starts_with("otpauth://totp/"));

        // Unconfirmed enrollment leaves MFA off.
        let user = store.find_by_id("u1").await.unwrap().unwrap();
        assert!(!user.mfa_enabled);
        assert!(user.mfa_secret.is_some());

        let code = totp::current_code(&enrollment.secret, "dev@codeguardian.ai").unwrap();
        service.confirm_mfa_setup(&claims, &code).await.unwrap();

        let user = store.find_by_id("u1").await.unwrap().unwrap();
        assert!(user.mfa_enabled);

        let events = store.list_audit().await.unwrap();
        assert_eq!(events.last().unwrap().action, "MFA_ENABLED");
    }

    #[tokio::test]
    async fn code_from_a_previous_setup_cannot_confirm_a_newer_one() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");

        let first = service.setup_mfa(&claims).await.unwrap();
        let second = service.setup_mfa(&claims).await.unwrap();
        assert_ne!(first.secret, second.secret);

        let stale_code = totp::current_code(&first.secret, "dev@codeguardian.ai").unwrap();
        let error = service
            .confirm_mfa_setup(&claims, &stale_code)
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::MfaInvalid { .. }));

        let user = store.find_by_id("u1").await.unwrap().unwrap();
        assert!(!user.mfa_enabled);
    }

    #[tokio::test]
    async fn confirm_without_setup_is_rejected() {
        let config = test_config();
        let store = store_with_user("dev@codeguardian.ai", false).await;
        let service = AuthService::new(&store, &config).unwrap();
        let claims = claims_for("u1", "dev@codeguardian.ai");

        let error = service
            .confirm_mfa_setup(&claims, "123456")
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::MfaInvalid { .. }));
    }
}
