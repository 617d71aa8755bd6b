// src/main.rs

//! # Verifiable Credential Registry - Main Entry Point
//!
//! This module serves as the main entry point for the credential registry.
//! It loads configuration, restores the registry from its event journal and
//! starts the API server.
//!
//! ## Architecture Overview
//! 1. **Contracts Layer**: `CredentialRegistry` state machine and the content binder
//! 2. **Services Layer**: Issuer and verifier services, authentication, REST API
//! 3. **Storage Layer**: JSON-lines event journal, the durable source of truth
//!
//! ## Environment Variables
//! - `REGISTRY_JWT_SECRET`: HS256 secret shared with the token issuer (required)
//! - `REGISTRY_BIND_ADDR`: (Optional) listen address (default: 127.0.0.1:3000)
//! - `REGISTRY_EVENT_LOG_PATH`: (Optional) event journal file; memory-only when unset
//! - `REGISTRY_LOG_LEVEL`: (Optional) default log level (default: info)

use crate::settings::RegistryConfig;
use crate::contracts::credential_registry::CredentialRegistry;
use crate::services::api_server::ApiServer;
use crate::services::auth::CallerAuth;
use crate::utils::clock::SystemClock;
use anyhow::Context;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod settings;      // Layered runtime configuration
mod contracts;     // Registry state machine and content binding
mod errors;        // Registry error taxonomy
mod models;        // Data structures
mod services;      // Issuer/verifier services and API
mod storage;       // Event journal
mod utils;         // Helper functions

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment and configuration
/// 2. Initialize logging
/// 3. Restore the registry (replaying the journal when configured)
/// 4. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = RegistryConfig::load().context("failed to load registry configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level)).init();

    let clock = Arc::new(SystemClock);
    let registry = match &config.event_log_path {
        Some(path) => CredentialRegistry::open(clock, path)
            .with_context(|| format!("failed to restore registry from {}", path.display()))?,
        None => {
            info!("No event log configured; registry state is kept in memory only");
            CredentialRegistry::new(clock)
        }
    };
    info!("Registry ready with {} credentials", registry.credential_count());

    let api_server = ApiServer::new(Arc::new(registry), CallerAuth::new(&config.jwt_secret));

    info!("Available endpoints:");
    info!("- POST /fingerprint");
    info!("- POST /issue-credential, /issue-claim, /revoke-credential");
    info!("- POST /verify-credential, /verify-content");
    info!("- GET  /credentials/:id, /subjects/:subject/credentials, /issuers/:issuer/credentials");
    info!("- GET  /events?since=N");

    api_server
        .run(config.bind_addr)
        .await
        .context("API server terminated")
}
