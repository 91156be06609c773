// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Output formats a transcript can be rendered to.

use snafu::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Error for format names that do not map to an [`OutputFormat`].
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum FormatError {
    /// The name is not one of the supported formats.
    #[snafu(display(
        "unsupported output format {name:?} (expected plaintext, htmldark, htmllight or csv)"
    ))]
    Unsupported {
        /// The name as given by the caller.
        name: String,
    },
}

/// Target format of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Plain text with references resolved to readable labels.
    PlainText,
    /// HTML document with the dark stylesheet.
    HtmlDark,
    /// HTML document with the light stylesheet.
    HtmlLight,
    /// Semicolon separated values, one row per message.
    Csv,
}

impl OutputFormat {
    /// Every supported format.
    pub const ALL: [Self; 4] = [Self::PlainText, Self::HtmlDark, Self::HtmlLight, Self::Csv];

    /// File extension used for rendered documents.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::HtmlDark | Self::HtmlLight => "html",
            Self::Csv => "csv",
        }
    }

    /// Whether the format produces HTML. Both themes share content rules.
    #[must_use]
    pub const fn is_html(self) -> bool {
        matches!(self, Self::HtmlDark | Self::HtmlLight)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlainText => "plaintext",
            Self::HtmlDark => "htmldark",
            Self::HtmlLight => "htmllight",
            Self::Csv => "csv",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plaintext" | "text" | "txt" => Ok(Self::PlainText),
            "htmldark" => Ok(Self::HtmlDark),
            "htmllight" => Ok(Self::HtmlLight),
            "csv" => Ok(Self::Csv),
            _ => UnsupportedSnafu { name: s }.fail(),
        }
    }
}
