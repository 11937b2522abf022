// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod auth;
pub mod profile;
pub mod screen;

pub use auth::AuthState;
pub use profile::{Profile, ProfilePatch};
pub use screen::{ChatScreen, ChatSection};
