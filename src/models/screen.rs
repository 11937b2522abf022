// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat screen composition served to the web frontend.
//!
//! The frontend renders sections in the order given here.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Sections that make up a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ChatSection {
    /// The user's list of chats
    MyChats,
    /// Messages of the selected chat
    ChatDetail,
}

/// Chat screen layout: the chat list followed by the chat detail.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChatScreen {
    pub sections: Vec<ChatSection>,
}

impl Default for ChatScreen {
    fn default() -> Self {
        Self {
            sections: vec![ChatSection::MyChats, ChatSection::ChatDetail],
        }
    }
}
