// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed profile operations.
//!
//! Profiles live in a per-user subcollection: `users/{uid}/profile/userData`.
//! Every read-modify-write runs inside a Firestore transaction so concurrent
//! writers from other instances are detected at commit time.

use crate::db::{add_credits, collections, profile_path, validate_uid, ProfileStore};
use crate::error::AppError;
use crate::models::{Profile, ProfilePatch};
use async_trait::async_trait;
use firestore::FirestoreConsistencySelector;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any token; skip credential discovery entirely.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Parent path `users/{uid}` of the profile subcollection.
    fn user_parent(
        client: &firestore::FirestoreDb,
        uid: &str,
    ) -> Result<firestore::ParentPathBuilder, AppError> {
        client
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Transactional Read-Modify-Write ─────────────────────────

    /// Apply `mutate` to the stored profile inside a transaction.
    ///
    /// If `mutate` returns `Ok(None)` or an error the transaction is rolled
    /// back and nothing is written. A missing document is reported as
    /// `NotFound`.
    async fn modify_profile<T, F>(&self, uid: &str, mutate: F) -> Result<Option<T>, AppError>
    where
        F: FnOnce(&mut Profile) -> Result<Option<T>, AppError>,
    {
        validate_uid(uid)?;
        let client = self.get_client()?;
        let parent = Self::user_parent(client, uid)?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read through the transaction so the document is registered for
        // conflict detection at commit.
        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );

        let current: Option<Profile> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::PROFILE)
            .parent(&parent)
            .obj()
            .one(collections::PROFILE_DOC)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read profile in transaction: {}", e))
            })?;

        let Some(mut profile) = current else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(profile_path(uid)));
        };

        let result = match mutate(&mut profile) {
            Ok(Some(result)) => result,
            Ok(None) => {
                let _ = transaction.rollback().await;
                return Ok(None);
            }
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        };

        client
            .fluent()
            .update()
            .in_col(collections::PROFILE)
            .document_id(collections::PROFILE_DOC)
            .parent(&parent)
            .object(&profile)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add profile to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(Some(result))
    }
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, AppError> {
        validate_uid(uid)?;
        let client = self.get_client()?;
        let parent = Self::user_parent(client, uid)?;

        client
            .fluent()
            .select()
            .by_id_in(collections::PROFILE)
            .parent(&parent)
            .obj()
            .one(collections::PROFILE_DOC)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_profile(&self, uid: &str, profile: &Profile) -> Result<(), AppError> {
        validate_uid(uid)?;
        let client = self.get_client()?;
        let parent = Self::user_parent(client, uid)?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::PROFILE)
            .document_id(collections::PROFILE_DOC)
            .parent(&parent)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn update_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AppError> {
        let patch = patch.clone();
        self.modify_profile(uid, move |profile| {
            patch.apply_to(profile);
            Ok(Some(()))
        })
        .await?;
        Ok(())
    }

    async fn debit_credits(&self, uid: &str, amount: i64) -> Result<Option<i64>, AppError> {
        self.modify_profile(uid, |profile| {
            if profile.credits < amount {
                return Ok(None);
            }
            profile.credits -= amount;
            Ok(Some(profile.credits))
        })
        .await
    }

    async fn credit_credits(&self, uid: &str, amount: i64) -> Result<i64, AppError> {
        let balance = self
            .modify_profile(uid, |profile| {
                profile.credits = add_credits(profile.credits, amount)?;
                Ok(Some(profile.credits))
            })
            .await?;

        balance.ok_or_else(|| AppError::Internal(anyhow::anyhow!("credit produced no balance")))
    }
}
