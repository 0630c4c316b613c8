//! User business logic service.
//!
//! Handles credential verification and admin-driven user management.

use crate::api::admin::models::CreateUserRequest;
use crate::errors::{ServiceError, ServiceResult};
use crate::store::UserStore;
use crate::store::models::{AuditEvent, Role, UserRecord};
use crate::store::{InsertOutcome, UserUpdate};
use crate::utils::jwt::Claims;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

pub struct UserService<'a> {
    store: &'a dyn UserStore,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a dyn UserStore) -> Self {
        Self { store }
    }

    /// Verifies a credential pair against the user directory.
    ///
    /// An unknown email and a wrong password produce the same error, so the
    /// response cannot be used to enumerate accounts.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<UserRecord> {
        let Some(user) = self.store.find_by_email(email).await? else {
            return Err(ServiceError::InvalidCredentials);
        };

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Function to hash a password before storing
    pub fn hash_password(password: &str) -> ServiceResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| ServiceError::internal(format!("Password hashing failed: {}", e)))
    }

    /// Function to verify a password against the stored hash
    pub fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
        verify(password, hash)
            .map_err(|e| ServiceError::internal(format!("Password verification failed: {}", e)))
    }

    /// Retrieves a user by ID with existence verification.
    pub async fn get_user_required(&self, id: &str) -> ServiceResult<UserRecord> {
        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user)
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<UserRecord>> {
        Ok(self.store.list_users().await?)
    }

    /// Creates a new user with full validation.
    pub async fn create_user(
        &self,
        actor: &Claims,
        request: CreateUserRequest,
    ) -> ServiceResult<UserRecord> {
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

        let role = Role::from_str(&request.role)
            .map_err(|_| ServiceError::invalid_role(&request.role))?;

        let password_hash = Self::hash_password(&request.password)?;
        let avatar = request
            .name
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "U".to_string());

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::now_v7().to_string(),
            email: request.email.clone(),
            name: request.name,
            avatar,
            password_hash,
            role,
            mfa_enabled: false,
            mfa_secret: None,
            created_at: now,
            updated_at: now,
        };

        let created = match self.store.insert_user(user).await? {
            InsertOutcome::Created(user) => user,
            InsertOutcome::EmailTaken => {
                return Err(ServiceError::already_exists("User", &request.email));
            }
        };

        self.audit(
            &actor.email,
            "USER_CREATED",
            format!("Created {} with role {}", created.email, created.role),
        )
        .await;

        Ok(created)
    }

    /// Removes a user from the directory. Self-deletion is rejected so an
    /// account cannot lock itself out mid-session.
    pub async fn delete_user(&self, actor: &Claims, id: &str) -> ServiceResult<UserRecord> {
        if actor.sub == id {
            return Err(ServiceError::invalid_operation(
                "You cannot delete your own account",
            ));
        }

        let Some(removed) = self.store.delete_user(id).await? else {
            return Err(ServiceError::not_found("User", id));
        };

        self.audit(
            &actor.email,
            "USER_DELETED",
            format!("Deleted {}", removed.email),
        )
        .await;

        Ok(removed)
    }

    /// Changes a user's role. ADMIN actors only; the mutation is a single
    /// atomic update on the target record.
    pub async fn assign_role(
        &self,
        actor: &Claims,
        target_id: &str,
        new_role: &str,
    ) -> ServiceResult<UserRecord> {
        if !actor.is_admin() {
            return Err(ServiceError::permission_denied(
                "Only administrators can assign roles",
            ));
        }

        let role =
            Role::from_str(new_role).map_err(|_| ServiceError::invalid_role(new_role))?;

        let updated = match self
            .store
            .update_user(target_id, UserUpdate::SetRole(role))
            .await?
        {
            crate::store::UpdateOutcome::Updated(user) => user,
            crate::store::UpdateOutcome::NotFound => {
                return Err(ServiceError::not_found("User", target_id));
            }
            crate::store::UpdateOutcome::Conflict => {
                return Err(ServiceError::internal("Role update conflicted"));
            }
        };

        self.audit(
            &actor.email,
            "ROLE_ASSIGNED",
            format!("{} is now {}", updated.email, updated.role),
        )
        .await;

        Ok(updated)
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
