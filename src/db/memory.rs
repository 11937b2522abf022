// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process profile store.
//!
//! Used for local development (`PROFILE_BACKEND=memory`) and tests. Data is
//! lost on restart.

use crate::db::{add_credits, profile_path, validate_uid, ProfileStore};
use crate::error::AppError;
use crate::models::{Profile, ProfilePatch};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// `DashMap`-backed profile store keyed by user id.
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    profiles: Arc<DashMap<String, Profile>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail with a database error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stored profile, bypassing the async interface.
    pub fn snapshot(&self, uid: &str) -> Option<Profile> {
        self.profiles.get(uid).map(|p| p.clone())
    }

    fn check_writable(&self, uid: &str) -> Result<(), AppError> {
        validate_uid(uid)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(format!(
                "write rejected for {}",
                profile_path(uid)
            )));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, AppError> {
        validate_uid(uid)?;
        Ok(self.snapshot(uid))
    }

    async fn set_profile(&self, uid: &str, profile: &Profile) -> Result<(), AppError> {
        self.check_writable(uid)?;
        self.profiles.insert(uid.to_string(), profile.clone());
        self.record_write();
        Ok(())
    }

    async fn update_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AppError> {
        self.check_writable(uid)?;
        let mut profile = self
            .profiles
            .get_mut(uid)
            .ok_or_else(|| AppError::NotFound(profile_path(uid)))?;
        patch.apply_to(&mut profile);
        self.record_write();
        Ok(())
    }

    async fn debit_credits(&self, uid: &str, amount: i64) -> Result<Option<i64>, AppError> {
        self.check_writable(uid)?;
        // The shard lock is held until the guard drops, so check and write are atomic.
        let mut profile = self
            .profiles
            .get_mut(uid)
            .ok_or_else(|| AppError::NotFound(profile_path(uid)))?;
        if profile.credits < amount {
            return Ok(None);
        }
        profile.credits -= amount;
        self.record_write();
        Ok(Some(profile.credits))
    }

    async fn credit_credits(&self, uid: &str, amount: i64) -> Result<i64, AppError> {
        self.check_writable(uid)?;
        let mut profile = self
            .profiles
            .get_mut(uid)
            .ok_or_else(|| AppError::NotFound(profile_path(uid)))?;
        profile.credits = add_credits(profile.credits, amount)?;
        self.record_write();
        Ok(profile.credits)
    }
}
