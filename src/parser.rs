// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON loading for exported channel transcripts.
//!
//! The transcript is expected to already carry resolved references: every
//! message lists the users, roles and channels its content mentions, each with
//! an identifier and a display name.
//!
//! # Example
//!
//! ```
//! use chatfmt::parser::parse_transcript;
//!
//! let json = r#"{
//!     "guild": "Rustaceans",
//!     "channel": { "id": "456", "name": "general" },
//!     "messages": [{
//!         "id": "1",
//!         "author": { "id": "2", "name": "Bob", "discriminator": "0001" },
//!         "timestamp": "2024-12-05T00:00:00Z",
//!         "content": "Hello <@123>",
//!         "mentionedUsers": [{ "id": "123", "name": "Alice" }]
//!     }]
//! }"#;
//!
//! let transcript = parse_transcript(json).unwrap();
//! assert_eq!(transcript.messages.len(), 1);
//! ```

use crate::model::Transcript;
use snafu::prelude::*;

/// Error type for transcript loading failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// Parses a JSON string into a [`Transcript`].
///
/// # Errors
///
/// Returns an error if the JSON is malformed, an identifier is not numeric,
/// a timestamp is not RFC 3339, or a required field is missing.
pub fn parse_transcript(json_str: &str) -> Result<Transcript, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}
