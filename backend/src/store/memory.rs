//! In-memory implementation of the user and audit stores.
//!
//! Holds the demo user directory behind a `tokio::sync::RwLock`; every
//! mutation takes the write lock for the duration of its read-modify-write,
//! which is what makes `update_user` atomic per record.

use crate::store::models::{AuditEvent, Role, UserRecord};
use crate::store::{InsertOutcome, UpdateOutcome, UserStore, UserUpdate};
use anyhow::Result;
use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    audit: RwLock<Vec<AuditEvent>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore {
            users: RwLock::new(HashMap::new()),
            audit: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store pre-populated with the demo user directory.
    pub fn seeded() -> Result<Self> {
        let password_hash = hash("password123", DEFAULT_COST)?;

        let seed_users = [
            ("u1", "admin@codeguardian.ai", "Admin User", "A", Role::Admin),
            ("u2", "dev@codeguardian.ai", "Dev Developer", "D", Role::Developer),
            ("u3", "viewer@codeguardian.ai", "Viewer User", "V", Role::Viewer),
        ];

        let now = Utc::now();
        let mut users = HashMap::new();
        for (id, email, name, avatar, role) in seed_users {
            users.insert(
                id.to_string(),
                UserRecord {
                    id: id.to_string(),
                    email: email.to_string(),
                    name: name.to_string(),
                    avatar: avatar.to_string(),
                    password_hash: password_hash.clone(),
                    role,
                    mfa_enabled: false,
                    mfa_secret: None,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        Ok(MemoryStore {
            users: RwLock::new(users),
            audit: RwLock::new(Vec::new()),
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let users = self.users.read().await;
        let mut all: Vec<UserRecord> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn insert_user(&self, user: UserRecord) -> Result<InsertOutcome> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Ok(InsertOutcome::EmailTaken);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(InsertOutcome::Created(user))
    }

    async fn delete_user(&self, id: &str) -> Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        Ok(users.remove(id))
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<UpdateOutcome> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        match update {
            UserUpdate::SetRole(role) => {
                user.role = role;
            }
            UserUpdate::BeginMfaEnrollment { encrypted_secret } => {
                user.mfa_secret = Some(encrypted_secret);
            }
            UserUpdate::ConfirmMfaEnrollment { expected_secret } => {
                if user.mfa_secret.as_deref() != Some(expected_secret.as_str()) {
                    return Ok(UpdateOutcome::Conflict);
                }
                user.mfa_enabled = true;
            }
        }

        user.updated_at = Utc::now();
        Ok(UpdateOutcome::Updated(user.clone()))
    }

    async fn append_audit(&self, event: AuditEvent) -> Result<()> {
        let mut audit = self.audit.write().await;
        audit.push(event);
        Ok(())
    }

    async fn list_audit(&self) -> Result<Vec<AuditEvent>> {
        let audit = self.audit.read().await;
        Ok(audit.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(id: &str, email: &str, role: Role) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: id.to_string(),
            email: email.to_string(),
            name: "Test User".to_string(),
            avatar: "T".to_string(),
            password_hash: "hash".to_string(),
            role,
            mfa_enabled: false,
            mfa_secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_emails() {
        let store = MemoryStore::new();
        let first = store
            .insert_user(test_user("a", "user@example.com", Role::Viewer))
            .await
            .unwrap();
        assert!(matches!(first, InsertOutcome::Created(_)));

        let second = store
            .insert_user(test_user("b", "user@example.com", Role::Viewer))
            .await
            .unwrap();
        assert!(matches!(second, InsertOutcome::EmailTaken));
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store
            .insert_user(test_user("a", "user@example.com", Role::Viewer))
            .await
            .unwrap();

        assert!(store.find_by_email("user@example.com").await.unwrap().is_some());
        assert!(store.find_by_email("User@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn confirm_enrollment_requires_matching_secret() {
        let store = MemoryStore::new();
        store
            .insert_user(test_user("a", "user@example.com", Role::Viewer))
            .await
            .unwrap();

        store
            .update_user(
                "a",
                UserUpdate::BeginMfaEnrollment {
                    encrypted_secret: "first".to_string(),
                },
            )
            .await
            .unwrap();

        // A second enrollment replaced the secret in the meantime.
        store
            .update_user(
                "a",
                UserUpdate::BeginMfaEnrollment {
                    encrypted_secret: "second".to_string(),
                },
            )
            .await
            .unwrap();

        let stale = store
            .update_user(
                "a",
                UserUpdate::ConfirmMfaEnrollment {
                    expected_secret: "first".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(stale, UpdateOutcome::Conflict));

        let user = store.find_by_id("a").await.unwrap().unwrap();
        assert!(!user.mfa_enabled);

        let fresh = store
            .update_user(
                "a",
                UserUpdate::ConfirmMfaEnrollment {
                    expected_secret: "second".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(fresh, UpdateOutcome::Updated(user) if user.mfa_enabled));
    }

    #[tokio::test]
    async fn update_of_unknown_user_reports_not_found() {
        let store = MemoryStore::new();
        let outcome = store
            .update_user("missing", UserUpdate::SetRole(Role::Admin))
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::NotFound));
    }

    #[tokio::test]
    async fn audit_events_are_appended_in_order() {
        let store = MemoryStore::new();
        store
            .append_audit(AuditEvent::new("a@x.com", "LOGIN_SUCCESS", "first"))
            .await
            .unwrap();
        store
            .append_audit(AuditEvent::new("a@x.com", "LOGIN_FAILED", "second"))
            .await
            .unwrap();

        let events = store.list_audit().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].detail, "first");
        assert_eq!(events[1].detail, "second");
    }
}
