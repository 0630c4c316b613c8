//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! token secrets, session lifetimes, and the upstream AI review endpoint.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub mfa_token_expires_in_seconds: u64,
    pub mfa_encryption_key: String,
    pub server_port: u16,
    pub ai_api_url: String,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "codeguardian-enterprise-2026-supersecret".to_string());

        let jwt_expires_in_seconds = env::var("JWT_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse::<u64>()
            .context("JWT_EXPIRES_IN_SECONDS must be a valid number")?;

        let mfa_token_expires_in_seconds = env::var("MFA_TOKEN_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .context("MFA_TOKEN_EXPIRES_IN_SECONDS must be a valid number")?;

        let mfa_encryption_key = env::var("MFA_ENCRYPTION_KEY")
            .unwrap_or_else(|_| "codeguardian-mfa-secret-key".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let ai_api_url = env::var("AI_API_URL").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta".to_string()
        });

        let ai_api_key = env::var("AI_API_KEY").ok().filter(|key| !key.is_empty());

        let ai_model = env::var("AI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string());

        Ok(Config {
            jwt_secret,
            jwt_expires_in_seconds,
            mfa_token_expires_in_seconds,
            mfa_encryption_key,
            server_port,
            ai_api_url,
            ai_api_key,
            ai_model,
        })
    }
}
