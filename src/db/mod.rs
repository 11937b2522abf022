//! Database layer (Firestore, plus an in-process store for local runs).

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Profile, ProfilePatch};
use async_trait::async_trait;

/// Collection and document names as constants.
///
/// A profile lives at `users/{uid}/profile/userData`.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROFILE: &str = "profile";
    pub const PROFILE_DOC: &str = "userData";
}

/// Full document path of a user's profile.
pub fn profile_path(uid: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        collections::USERS,
        uid,
        collections::PROFILE,
        collections::PROFILE_DOC
    )
}

/// Reject user ids that can't be used as a document id.
pub fn validate_uid(uid: &str) -> Result<(), AppError> {
    if uid.is_empty() || uid.contains('/') || uid == "." || uid == ".." {
        return Err(AppError::BadRequest(format!("Invalid user id: {:?}", uid)));
    }
    Ok(())
}

/// Add credits to a balance, rejecting results that don't fit in an `i64`.
pub fn add_credits(balance: i64, amount: i64) -> Result<i64, AppError> {
    balance.checked_add(amount).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Adding {} credits to a balance of {} overflows",
            amount, balance
        ))
    })
}

/// Storage for per-user profile documents.
///
/// Credit mutations are conditional and atomic on the backend: two
/// concurrent debits can never take the balance below zero.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read a user's profile, `None` if the document doesn't exist.
    async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, AppError>;

    /// Write the full profile document, replacing what was there.
    async fn set_profile(&self, uid: &str, profile: &Profile) -> Result<(), AppError>;

    /// Merge the set fields of `patch` into an existing document.
    ///
    /// Fails with `NotFound` if the document doesn't exist.
    async fn update_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AppError>;

    /// Subtract `amount` if the stored balance covers it.
    ///
    /// Returns the new balance, or `None` (and writes nothing) if the
    /// balance is insufficient.
    async fn debit_credits(&self, uid: &str, amount: i64) -> Result<Option<i64>, AppError>;

    /// Add `amount` to the stored balance and return the new balance.
    async fn credit_credits(&self, uid: &str, amount: i64) -> Result<i64, AppError>;
}
