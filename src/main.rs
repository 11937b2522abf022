// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chatline API Server
//!
//! Serves user profiles and credit balances for the chat front end.

use chatline::{
    config::{Config, ProfileBackend},
    db::{FirestoreDb, MemoryStore, ProfileStore},
    services::ProfileService,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Chatline API");

    let store: Arc<dyn ProfileStore> = match config.profile_backend {
        ProfileBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        ProfileBackend::Memory => {
            tracing::warn!("Using in-memory profile store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let profiles = ProfileService::new(store, config.credit_policy);
    tracing::info!(
        starting_credits = config.credit_policy.starting_credits,
        top_up_enabled = config.credit_policy.top_up_enabled,
        "Profile service initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        profiles,
    });

    // Build router
    let app = chatline::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatline=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
