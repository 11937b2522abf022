// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile service: keeps a local mirror of each user's profile in sync with
//! the document store.
//!
//! Handles:
//! - Fetch-or-create with the credit top-up policy
//! - Optimistic profile updates, reconciled if the remote write fails
//! - Credit debits and credits, serialized per user
//! - Change notifications for observers

use crate::config::CreditPolicy;
use crate::db::ProfileStore;
use crate::error::AppError;
use crate::models::{AuthState, Profile, ProfilePatch};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Capacity of the change notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Local mirror of profiles, keyed by uid.
///
/// One entry per user seen by this instance; entries are never evicted.
pub type ProfileCache = Arc<DashMap<String, Profile>>;

/// Per-user locks serializing mutations.
///
/// Like the mirror, this grows by one small entry per user and is never
/// pruned. Removing an entry while another task holds its `Arc` would let
/// two tasks lock different mutexes for the same user.
pub type ProfileLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Why a profile was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileChange {
    Fetched,
    Created,
    Updated,
    /// An optimistic update was undone after the remote write failed
    RolledBack,
    CreditsChanged,
}

/// Notification sent to observers whenever the local mirror changes.
#[derive(Debug, Clone)]
pub struct ProfileEvent {
    pub uid: String,
    pub profile: Profile,
    pub change: ProfileChange,
}

/// Profile operations over a [`ProfileStore`].
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    policy: CreditPolicy,
    cache: ProfileCache,
    locks: ProfileLocks,
    events: broadcast::Sender<ProfileEvent>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>, policy: CreditPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            policy,
            cache: Arc::new(DashMap::new()),
            locks: Arc::new(DashMap::new()),
            events,
        }
    }

    /// Current local copy of a user's profile.
    pub fn cached(&self, uid: &str) -> Option<Profile> {
        self.cache.get(uid).map(|p| p.clone())
    }

    /// Receive every change to the local mirror from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
        self.events.subscribe()
    }

    fn publish(&self, uid: &str, profile: Profile, change: ProfileChange) {
        self.cache.insert(uid.to_string(), profile.clone());
        // No receivers is fine.
        let _ = self.events.send(ProfileEvent {
            uid: uid.to_string(),
            profile,
            change,
        });
    }

    fn user_lock(&self, uid: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(uid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ─── Fetch ───────────────────────────────────────────────────────────────

    /// Load the user's profile, creating it on first sign-in.
    ///
    /// An existing profile is merged with the current auth attributes and
    /// low balances are topped up; the result is written back. Returns
    /// `None` when nobody is signed in.
    pub async fn fetch(&self, auth: &AuthState) -> Result<Option<Profile>, AppError> {
        let Some(uid) = auth.uid() else {
            return Ok(None);
        };

        let lock = self.user_lock(uid);
        let _guard = lock.lock().await;

        let result = self.fetch_locked(uid, auth).await;
        if let Err(e) = &result {
            tracing::error!(uid, error = %e, "Error fetching or creating profile");
        }
        result.map(Some)
    }

    async fn fetch_locked(&self, uid: &str, auth: &AuthState) -> Result<Profile, AppError> {
        match self.store.get_profile(uid).await? {
            Some(stored) => {
                tracing::debug!(uid, credits = stored.credits, "Profile found");
                let stored_credits = stored.credits;
                let profile = Profile::merge_stored(stored, auth, &self.policy);
                if profile.credits != stored_credits {
                    tracing::info!(
                        uid,
                        from = stored_credits,
                        to = profile.credits,
                        "Topping up low credit balance"
                    );
                }

                self.store.set_profile(uid, &profile).await?;
                self.publish(uid, profile.clone(), ProfileChange::Fetched);
                Ok(profile)
            }
            None => {
                let profile = Profile::from_auth(auth, &self.policy);
                self.store.set_profile(uid, &profile).await?;
                self.publish(uid, profile.clone(), ProfileChange::Created);
                tracing::info!(uid, "No profile found, created new profile document");
                Ok(profile)
            }
        }
    }

    // ─── Update ──────────────────────────────────────────────────────────────

    /// Apply a partial update.
    ///
    /// The local mirror changes (and observers are notified) before the
    /// remote write starts. If the write fails the previous value is
    /// restored and the error returned.
    ///
    /// With nothing mirrored yet the stored document is loaded first; a
    /// missing document is `NotFound` and nothing is published.
    pub async fn update(
        &self,
        auth: &AuthState,
        patch: &ProfilePatch,
    ) -> Result<Option<Profile>, AppError> {
        let Some(uid) = auth.uid() else {
            return Ok(None);
        };

        let lock = self.user_lock(uid);
        let _guard = lock.lock().await;

        tracing::debug!(uid, fields = ?patch.field_names(), "Updating profile");

        let previous = match self.cached(uid) {
            Some(profile) => profile,
            None => self
                .store
                .get_profile(uid)
                .await?
                .ok_or_else(|| AppError::NotFound(crate::db::profile_path(uid)))?,
        };
        let mut updated = previous.clone();
        patch.apply_to(&mut updated);
        self.publish(uid, updated.clone(), ProfileChange::Updated);

        if let Err(e) = self.store.update_profile(uid, patch).await {
            tracing::error!(uid, error = %e, "Error updating profile, rolling back");
            self.publish(uid, previous, ProfileChange::RolledBack);
            return Err(e);
        }

        tracing::info!(uid, "Profile updated");
        Ok(Some(updated))
    }

    // ─── Credits ─────────────────────────────────────────────────────────────

    /// Spend `amount` credits.
    ///
    /// Returns `Ok(false)` without writing when the balance is too low, the
    /// user has no profile document yet, or nobody is signed in. Store
    /// failures are returned as errors.
    pub async fn debit(&self, auth: &AuthState, amount: i64) -> Result<bool, AppError> {
        check_amount(amount)?;
        let Some(uid) = auth.uid() else {
            return Ok(false);
        };

        if let Some(profile) = self.cache.get(uid) {
            if profile.credits < amount {
                tracing::debug!(uid, amount, credits = profile.credits, "Insufficient credits");
                return Ok(false);
            }
        }

        let lock = self.user_lock(uid);
        let _guard = lock.lock().await;

        match self.store.debit_credits(uid, amount).await {
            Ok(Some(balance)) => {
                self.set_local_credits(uid, balance).await;
                tracing::info!(uid, amount, credits = balance, "Credits used");
                Ok(true)
            }
            Ok(None) => {
                tracing::debug!(uid, amount, "Insufficient credits in store");
                Ok(false)
            }
            // No document means a balance of zero.
            Err(AppError::NotFound(_)) => {
                tracing::debug!(uid, amount, "No profile to debit");
                Ok(false)
            }
            Err(e) => {
                tracing::error!(uid, amount, error = %e, "Error using credits");
                Err(e)
            }
        }
    }

    /// Add `amount` credits and return the new balance.
    pub async fn credit(&self, auth: &AuthState, amount: i64) -> Result<Option<i64>, AppError> {
        check_amount(amount)?;
        let Some(uid) = auth.uid() else {
            return Ok(None);
        };

        let lock = self.user_lock(uid);
        let _guard = lock.lock().await;

        match self.store.credit_credits(uid, amount).await {
            Ok(balance) => {
                self.set_local_credits(uid, balance).await;
                tracing::info!(uid, amount, credits = balance, "Credits added");
                Ok(Some(balance))
            }
            Err(e) => {
                tracing::error!(uid, amount, error = %e, "Error adding credits");
                Err(e)
            }
        }
    }

    /// Mirror a balance confirmed by the store.
    ///
    /// If nothing is mirrored yet the whole document is loaded instead, so
    /// the mirror never holds a profile with only its balance filled in.
    async fn set_local_credits(&self, uid: &str, balance: i64) {
        let profile = match self.cached(uid) {
            Some(mut profile) => {
                profile.credits = balance;
                profile
            }
            None => match self.store.get_profile(uid).await {
                Ok(Some(profile)) => profile,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(uid, error = %e, "Failed to load profile after credit change");
                    return;
                }
            },
        };
        self.publish(uid, profile, ProfileChange::CreditsChanged);
    }
}

fn check_amount(amount: i64) -> Result<(), AppError> {
    if amount < 0 {
        return Err(AppError::BadRequest(format!(
            "Credit amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}
