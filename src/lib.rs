// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chatline: backend for the chat front end.
//!
//! This crate serves the chat screen composition and keeps each user's
//! profile and credits balance in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::ProfileService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub profiles: ProfileService,
}
