//! Service layer modules.
//!
//! Business logic for users, scans, and review forwarding lives here,
//! between the HTTP handlers and the store.

pub mod review_service;
pub mod scan_service;
pub mod user_service;
