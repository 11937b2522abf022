// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chatline::config::Config;
use chatline::db::{FirestoreDb, MemoryStore};
use chatline::middleware::auth::create_jwt;
use chatline::models::AuthState;
use chatline::routes::create_router;
use chatline::services::ProfileService;
use chatline::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Generate a unique user id for test isolation.
#[allow(dead_code)]
pub fn unique_uid() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

/// Auth attributes of a typical signed-in test user.
#[allow(dead_code)]
pub fn test_auth(uid: &str) -> AuthState {
    AuthState {
        uid: Some(uid.to_string()),
        email: Some(format!("{}@example.com", uid)),
        email_verified: true,
        display_name: Some("Test User".to_string()),
        photo_url: Some("https://example.com/avatar.png".to_string()),
    }
}

/// Profile service over a fresh in-memory store.
#[allow(dead_code)]
pub fn memory_service() -> (ProfileService, MemoryStore) {
    let store = MemoryStore::new();
    let service = ProfileService::new(
        Arc::new(store.clone()),
        Config::test_default().credit_policy,
    );
    (service, store)
}

/// Create a test app backed by an in-memory store.
/// Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryStore) {
    let config = Config::test_default();
    let (profiles, store) = memory_service();

    let state = Arc::new(AppState { config, profiles });

    (create_router(state.clone()), state, store)
}

/// Create a test app whose database is offline; every store call fails.
#[allow(dead_code)]
pub fn create_offline_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let profiles = ProfileService::new(Arc::new(FirestoreDb::new_mock()), config.credit_policy);

    let state = Arc::new(AppState { config, profiles });

    (create_router(state.clone()), state)
}

/// Create a session JWT for a test user.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    create_jwt(&test_auth(uid), signing_key).unwrap()
}
