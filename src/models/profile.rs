// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model and the merge rules applied on fetch.

use crate::config::CreditPolicy;
use crate::models::AuthState;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// User profile stored in Firestore.
///
/// Stored at: `users/{uid}/profile/userData`
///
/// Documents written by older clients may lack fields; those fall back to
/// the `Default` values when read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Sign-in email (mirrors the auth provider)
    pub email: String,
    /// Email the user wants to be contacted at
    pub contact_email: String,
    pub display_name: String,
    pub photo_url: String,
    pub email_verified: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub credits: i64,
}

impl Profile {
    /// Build a brand new profile from the auth provider's attributes.
    pub fn from_auth(auth: &AuthState, policy: &CreditPolicy) -> Self {
        Self {
            email: auth.email().unwrap_or_default().to_string(),
            contact_email: String::new(),
            display_name: auth.display_name().unwrap_or_default().to_string(),
            photo_url: auth.photo_url().unwrap_or_default().to_string(),
            email_verified: auth.email_verified,
            credits: policy.starting_credits,
        }
    }

    /// Merge a stored profile with the current auth attributes.
    ///
    /// The sign-in email always follows the auth provider. Contact and display
    /// fields keep the stored value and only fall back to auth when empty.
    pub fn merge_stored(stored: Profile, auth: &AuthState, policy: &CreditPolicy) -> Self {
        let auth_email = auth.email().unwrap_or_default();

        Self {
            credits: policy.balance_on_fetch(stored.credits),
            email: if auth_email.is_empty() {
                stored.email
            } else {
                auth_email.to_string()
            },
            contact_email: non_empty_or(stored.contact_email, auth.email()),
            display_name: non_empty_or(stored.display_name, auth.display_name()),
            photo_url: non_empty_or(stored.photo_url, auth.photo_url()),
            email_verified: stored.email_verified,
        }
    }
}

fn non_empty_or(value: String, fallback: Option<&str>) -> String {
    if value.is_empty() {
        fallback.unwrap_or_default().to_string()
    } else {
        value
    }
}

/// Partial profile update. Absent fields are left untouched.
///
/// Credits are deliberately absent: balances only move through the
/// debit/credit operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 2048))]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

impl ProfilePatch {
    /// Shallow-merge the set fields into `profile`.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(contact_email) = &self.contact_email {
            profile.contact_email = contact_email.clone();
        }
        if let Some(display_name) = &self.display_name {
            profile.display_name = display_name.clone();
        }
        if let Some(photo_url) = &self.photo_url {
            profile.photo_url = photo_url.clone();
        }
        if let Some(email_verified) = self.email_verified {
            profile.email_verified = email_verified;
        }
    }

    /// Stored field names touched by this patch (for logging).
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.email.is_some() {
            fields.push("email");
        }
        if self.contact_email.is_some() {
            fields.push("contactEmail");
        }
        if self.display_name.is_some() {
            fields.push("displayName");
        }
        if self.photo_url.is_some() {
            fields.push("photoUrl");
        }
        if self.email_verified.is_some() {
            fields.push("emailVerified");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }
}
