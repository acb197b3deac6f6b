//! Messages exchanged with the page embedding the widget
//!
//! Messages are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "iframe_ready"}
//! {"type": "link_token", "token": "lt_..."}
//! {"type": "theme", "mode": "dark", "primary_color": "#4f46e5"}
//! {"type": "close"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Colour scheme
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light background
    #[default]
    Light,
    /// Dark background
    Dark,
}

/// Theme the host page asks the widget to use
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Theme {
    /// Colour scheme
    #[serde(default)]
    pub mode: ThemeMode,

    /// Accent colour as a CSS hex string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
}

/// A message crossing the embed boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmbedMessage {
    /// Widget finished loading
    IframeReady,

    /// Host hands over the session's link token
    LinkToken {
        /// Opaque per-session credential
        token: String,
    },

    /// Host sets the theme
    Theme(Theme),

    /// Widget asks the host to close it
    Close,
}

impl EmbedMessage {
    /// Decode a message received from the host
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode for posting to the host
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
