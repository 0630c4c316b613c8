//! Storage layer for the user directory and the audit trail.
//!
//! The demo ships with an in-memory store, but every consumer goes through
//! the `UserStore` trait so the auth state machine can be tested against
//! the same store the server runs on, and swapped for a real persistence
//! layer without touching business logic.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod models;

pub use self::memory::MemoryStore;

use self::models::{AuditEvent, Role, UserRecord};

/// Shared handle passed to request handlers.
pub type SharedStore = Arc<dyn UserStore>;

/// Single-record mutation applied atomically by the store.
#[derive(Debug, Clone)]
pub enum UserUpdate {
    SetRole(Role),
    /// Stores a fresh (encrypted) TOTP secret without enabling MFA.
    BeginMfaEnrollment { encrypted_secret: String },
    /// Flips `mfa_enabled` on, but only if the stored secret still matches
    /// the one the code was verified against.
    ConfirmMfaEnrollment { expected_secret: String },
}

/// Result of an atomic update.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(UserRecord),
    NotFound,
    /// A compare-and-set precondition failed (e.g. the MFA secret changed
    /// between verification and confirmation).
    Conflict,
}

/// Result of inserting a new user.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(UserRecord),
    EmailTaken,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>>;

    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    async fn insert_user(&self, user: UserRecord) -> Result<InsertOutcome>;

    async fn delete_user(&self, id: &str) -> Result<Option<UserRecord>>;

    /// Applies `update` to the record under a write lock, so concurrent
    /// mutations of the same user cannot interleave.
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<UpdateOutcome>;

    /// Appends to the audit trail. Callers treat failures as non-fatal.
    async fn append_audit(&self, event: AuditEvent) -> Result<()>;

    async fn list_audit(&self) -> Result<Vec<AuditEvent>>;
}
