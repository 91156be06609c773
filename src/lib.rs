// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Render exported chat transcripts as plain text, HTML or CSV.
//!
//! # Overview
//!
//! A transcript is a list of messages whose content mixes plain text,
//! markdown and inline reference tokens such as `<@123>` (user), `<@&5>`
//! (role), `<#456>` (channel) and `<:wave:789>` (custom emoji). This crate:
//!
//! 1. Loads the transcript JSON into typed Rust values
//! 2. Transcodes each message's content into the target format, resolving
//!    references to display names
//! 3. Lays the messages out as a complete document
//!
//! # Example
//!
//! ```no_run
//! use chatfmt::{format::OutputFormat, parser, renderer};
//!
//! let json = std::fs::read_to_string("channel.json").unwrap();
//! let transcript = parser::parse_transcript(&json).unwrap();
//!
//! let html = renderer::render_transcript(
//!     &transcript,
//!     OutputFormat::HtmlDark,
//!     &renderer::RenderOptions::default(),
//! );
//! println!("{html}");
//! ```
//!
//! # Modules
//!
//! - [`model`]: transcript and mention reference types
//! - [`format`]: the supported output formats
//! - [`transcode`]: per-message content transcoding
//! - [`markdown`]: chat-flavored markdown to HTML
//! - [`parser`]: JSON loading
//! - [`renderer`]: whole-document layout

#![deny(missing_docs)]

pub mod format;
pub mod markdown;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod transcode;
