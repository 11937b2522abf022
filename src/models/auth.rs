// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication attributes supplied by the identity provider.

/// Read-only view of the signed-in user, as reported by the auth provider.
///
/// `uid` is `None` when nobody is signed in; profile operations are no-ops
/// in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl AuthState {
    /// Signed-in state with only a user id.
    pub fn signed_in(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            ..Self::default()
        }
    }

    pub fn uid(&self) -> Option<&str> {
        non_empty(&self.uid)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.display_name)
    }

    pub fn photo_url(&self) -> Option<&str> {
        non_empty(&self.photo_url)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
