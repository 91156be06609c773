// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Document rendering for parsed transcripts.
//!
//! This module lays out a whole [`Transcript`] in one of the
//! [`OutputFormat`]s. Message content is produced by
//! [`transcode`](crate::transcode::transcode); the layout here only places it
//! next to the author, timestamp and attachments.
//!
//! # Output Formats
//!
//! - Plain text: a header block, then one paragraph per message
//! - HTML: a standalone document; the dark and light themes differ only in
//!   their stylesheet
//! - CSV: a `;` separated table with one row per message
//!
//! # Example
//!
//! ```
//! use chatfmt::format::OutputFormat;
//! use chatfmt::parser::parse_transcript;
//! use chatfmt::renderer::{render_transcript, RenderOptions};
//!
//! let transcript = parse_transcript(r#"{
//!     "guild": "Rustaceans",
//!     "channel": { "id": "456", "name": "general" },
//!     "messages": [{
//!         "id": "1",
//!         "author": { "id": "2", "name": "Bob" },
//!         "timestamp": "2024-12-05T00:00:00Z",
//!         "content": "Hi <#456>"
//!     }]
//! }"#).unwrap();
//!
//! let text = render_transcript(&transcript, OutputFormat::PlainText, &RenderOptions::default());
//! assert!(text.contains("Hi #general"));
//! ```

use crate::format::OutputFormat;
use crate::markdown::escape_html;
use crate::model::{Message, Transcript};
use crate::transcode::{csv_field, transcode};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use tracing::debug;

/// Default `strftime` pattern for message timestamps.
pub const DEFAULT_DATE_FORMAT: &str = "%d-%b-%y %I:%M %p";

const PLAIN_TEXT_RULE: &str = "==============================================================";

const CSV_HEADER: &str = "Author;Date;Content;Attachments;";

const BASE_CSS: &str = "\
body { margin: 0; padding: 0; font-family: \"Helvetica Neue\", Helvetica, Arial, sans-serif; font-size: 16px; }
a { text-decoration: none; }
a:hover { text-decoration: underline; }
.info { display: flex; max-width: 100%; margin: 0 5px 10px; }
.info__guild-name { font-size: 1.4em; }
.info__channel-name { font-size: 1.2em; }
.info__channel-message-count { margin-top: 2px; }
.chatlog { max-width: 100%; margin-bottom: 24px; }
.chatlog__message { margin: 0 5px; padding: 15px 0; border-top: 1px solid; }
.chatlog__author-name { font-weight: 600; }
.chatlog__timestamp { margin-left: 5px; font-size: .75em; }
.chatlog__edited { margin-left: 3px; font-size: .8em; }
.chatlog__content { padding-top: 5px; font-size: .9375em; word-wrap: break-word; }
.chatlog__attachment { margin: 5px 0; }
.pre { font-family: Consolas, \"Courier New\", Courier, monospace; }
.pre--multiline { margin-top: 4px; padding: 8px; border: 2px solid; border-radius: 5px; white-space: pre-wrap; }
.pre--inline { padding: 2px; border-radius: 3px; font-size: 85%; }
.quote { margin: 4px 0; padding-left: 8px; border-left: 4px solid; }
.spoiler { border-radius: 3px; }
.mention { font-weight: 600; }
.emoji { width: 24px; height: 24px; margin: 0 1px; vertical-align: -.4em; }
";

const DARK_CSS: &str = "\
body { background-color: #36393e; color: #ffffffb3; }
a { color: #0096cf; }
.info__guild-name, .chatlog__author-name { color: #ffffff; }
.info__channel-name, .chatlog__timestamp, .chatlog__edited { color: #ffffff33; }
.chatlog__message { border-color: #ffffff0a; }
.pre { background-color: #2f3136; }
.pre--multiline { border-color: #282b30; color: #839496; }
.quote { border-color: #4f545c; }
.spoiler { background-color: #202225; color: transparent; }
.spoiler:hover { color: inherit; }
.mention { color: #7289da; background-color: #7289da1a; }
";

const LIGHT_CSS: &str = "\
body { background-color: #ffffff; color: #737f8d; }
a { color: #00b0f4; }
.info__guild-name, .chatlog__author-name { color: #2f3136; }
.info__channel-name, .chatlog__timestamp, .chatlog__edited { color: #99aab5; }
.chatlog__message { border-color: #eceeef; }
.pre { background-color: #f9f9f9; }
.pre--multiline { border-color: #f3f3f3; color: #657b83; }
.quote { border-color: #c7ccd1; }
.spoiler { background-color: #b9bbbe; color: transparent; }
.spoiler:hover { color: inherit; }
.mention { color: #7289da; background-color: #7289da1a; }
";

/// Configuration options for document rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// `strftime` pattern used for message timestamps.
    ///
    /// An invalid pattern falls back to RFC 3339.
    pub date_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_owned(),
        }
    }
}

/// Renders a whole transcript as a document in `format`.
#[must_use]
pub fn render_transcript(
    transcript: &Transcript,
    format: OutputFormat,
    opts: &RenderOptions,
) -> String {
    let out = match format {
        OutputFormat::PlainText => render_plain_text(transcript, opts),
        OutputFormat::HtmlDark => render_html(transcript, DARK_CSS, opts),
        OutputFormat::HtmlLight => render_html(transcript, LIGHT_CSS, opts),
        OutputFormat::Csv => render_csv(transcript, opts),
    };
    debug!(
        %format,
        messages = transcript.messages.len(),
        bytes = out.len(),
        "rendered transcript"
    );
    out
}

fn render_plain_text(transcript: &Transcript, opts: &RenderOptions) -> String {
    let mut out = String::new();
    writeln!(out, "{PLAIN_TEXT_RULE}").unwrap();
    writeln!(out, "Guild: {}", transcript.guild).unwrap();
    writeln!(out, "Channel: {}", transcript.channel.name).unwrap();
    writeln!(out, "Messages: {}", transcript.messages.len()).unwrap();
    writeln!(out, "{PLAIN_TEXT_RULE}\n").unwrap();

    for message in &transcript.messages {
        writeln!(
            out,
            "[{}] {}",
            format_date(&message.timestamp, &opts.date_format),
            message.author.full_name()
        )
        .unwrap();
        let content = transcode(message, OutputFormat::PlainText);
        if !content.is_empty() {
            writeln!(out, "{content}").unwrap();
        }
        for attachment in &message.attachments {
            writeln!(out, "{}", attachment.url).unwrap();
        }
        out.push('\n');
    }

    out
}

fn render_html(transcript: &Transcript, theme_css: &str, opts: &RenderOptions) -> String {
    let guild = escape_html(&transcript.guild);
    let channel = escape_html(&transcript.channel.name);

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    writeln!(out, "<title>{guild} - {channel}</title>").unwrap();
    writeln!(out, "<style>\n{BASE_CSS}{theme_css}</style>").unwrap();
    out.push_str("</head>\n<body>\n");

    out.push_str("<div class=\"info\">\n");
    writeln!(out, "<div class=\"info__guild-name\">{guild}</div>").unwrap();
    writeln!(out, "<div class=\"info__channel-name\">#{channel}</div>").unwrap();
    writeln!(
        out,
        "<div class=\"info__channel-message-count\">{} messages</div>",
        transcript.messages.len()
    )
    .unwrap();
    out.push_str("</div>\n<div class=\"chatlog\">\n");

    for message in &transcript.messages {
        render_html_message(&mut out, message, opts);
    }

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

fn render_html_message(out: &mut String, message: &Message, opts: &RenderOptions) {
    writeln!(
        out,
        "<div class=\"chatlog__message\" id=\"message-{}\">",
        message.id
    )
    .unwrap();

    write!(
        out,
        "<div class=\"chatlog__header\"><span class=\"chatlog__author-name\" title=\"{}\">{}</span>\
         <span class=\"chatlog__timestamp\">{}</span>",
        escape_html(&message.author.full_name()),
        escape_html(&message.author.name),
        escape_html(&format_date(&message.timestamp, &opts.date_format))
    )
    .unwrap();
    if let Some(edited) = &message.edited_timestamp {
        write!(
            out,
            "<span class=\"chatlog__edited\" title=\"{}\">(edited)</span>",
            escape_html(&format_date(edited, &opts.date_format))
        )
        .unwrap();
    }
    out.push_str("</div>\n");

    // Both themes share the HTML content pipeline.
    writeln!(
        out,
        "<div class=\"chatlog__content\">{}</div>",
        transcode(message, OutputFormat::HtmlDark)
    )
    .unwrap();

    for attachment in &message.attachments {
        writeln!(
            out,
            "<div class=\"chatlog__attachment\"><a href=\"{}\">{} ({})</a></div>",
            escape_html(&attachment.url),
            escape_html(&attachment.file_name),
            format_file_size(attachment.file_size)
        )
        .unwrap();
    }

    out.push_str("</div>\n");
}

fn render_csv(transcript: &Transcript, opts: &RenderOptions) -> String {
    let mut out = String::new();
    writeln!(out, "{CSV_HEADER}").unwrap();

    for message in &transcript.messages {
        let attachments = message
            .attachments
            .iter()
            .map(|a| a.url.as_str())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            out,
            "{};{};{};{};",
            csv_field(&message.author.full_name()),
            csv_field(&format_date(&message.timestamp, &opts.date_format)),
            transcode(message, OutputFormat::Csv),
            csv_field(&attachments)
        )
        .unwrap();
    }

    out
}

/// Returns `true` if `pattern` is a usable `strftime` pattern.
#[must_use]
pub fn is_valid_date_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Formats a timestamp with a `strftime` pattern.
///
/// Falls back to RFC 3339 if the pattern cannot be applied.
#[must_use]
pub fn format_date(timestamp: &DateTime<Utc>, pattern: &str) -> String {
    if !is_valid_date_format(pattern) {
        return timestamp.to_rfc3339();
    }
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(pattern)).is_err() {
        return timestamp.to_rfc3339();
    }
    out
}

/// Formats a byte count with 1024-based units, e.g. `1.5 KB`.
///
/// Whole values drop the decimal, so 2048 bytes is `2 KB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{size:.1}");
    let trimmed = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, Author, ChannelReference, UserReference};

    fn make_transcript(messages: Vec<Message>) -> Transcript {
        Transcript {
            guild: "Rustaceans".into(),
            channel: ChannelReference {
                id: 456,
                name: "general".into(),
            },
            messages,
        }
    }

    fn make_message(content: &str) -> Message {
        Message {
            id: 1000,
            author: Author {
                id: 2,
                name: "Bob".into(),
                discriminator: Some("0001".into()),
            },
            timestamp: DateTime::from_timestamp_millis(1_733_356_800_000).unwrap(), // 2024-12-05 00:00:00 UTC
            edited_timestamp: None,
            content: content.into(),
            attachments: vec![],
            mentioned_users: vec![UserReference {
                id: 123,
                name: "Alice".into(),
                discriminator: Some("1234".into()),
            }],
            mentioned_roles: vec![],
            mentioned_channels: vec![],
        }
    }

    fn attachment() -> Attachment {
        Attachment {
            id: 9,
            file_name: "cat.png".into(),
            url: "https://cdn.example.com/cat.png".into(),
            file_size: 1536,
        }
    }

    fn opts() -> RenderOptions {
        RenderOptions {
            date_format: "%Y-%m-%d %H:%M".into(),
        }
    }

    #[test]
    fn plain_text_has_header_and_messages() {
        let transcript = make_transcript(vec![make_message("Hi <@123>")]);
        let out = render_transcript(&transcript, OutputFormat::PlainText, &opts());

        assert!(out.starts_with(PLAIN_TEXT_RULE));
        assert!(out.contains("Guild: Rustaceans\n"));
        assert!(out.contains("Channel: general\n"));
        assert!(out.contains("Messages: 1\n"));
        assert!(out.contains("[2024-12-05 00:00] Bob#0001\nHi @Alice\n"));
    }

    #[test]
    fn plain_text_lists_attachment_urls() {
        let mut message = make_message("");
        message.attachments.push(attachment());
        let out = render_transcript(
            &make_transcript(vec![message]),
            OutputFormat::PlainText,
            &opts(),
        );

        assert!(out.contains("Bob#0001\nhttps://cdn.example.com/cat.png\n"));
    }

    #[test]
    fn html_places_transcoded_content() {
        let transcript = make_transcript(vec![make_message("**Hi** <@123>")]);
        let out = render_transcript(&transcript, OutputFormat::HtmlDark, &opts());

        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<title>Rustaceans - general</title>"));
        assert!(out.contains("id=\"message-1000\""));
        assert!(out.contains(
            r#"<div class="chatlog__content"><strong>Hi</strong> <span class="mention" title="Alice#1234">@Alice</span></div>"#
        ));
        assert!(out.ends_with("</html>\n"));
    }

    #[test]
    fn html_escapes_layout_values() {
        let mut transcript = make_transcript(vec![make_message("x")]);
        transcript.guild = "<Guild & Co>".into();
        transcript.messages[0].author.name = "<b>Bob</b>".into();
        let out = render_transcript(&transcript, OutputFormat::HtmlLight, &opts());

        assert!(out.contains("&lt;Guild &amp; Co&gt;"));
        assert!(out.contains("&lt;b&gt;Bob&lt;/b&gt;"));
        assert!(!out.contains("<b>Bob"));
    }

    #[test]
    fn html_shows_attachments_and_edits() {
        let mut message = make_message("x");
        message.attachments.push(attachment());
        message.edited_timestamp = DateTime::from_timestamp_millis(1_733_360_400_000);
        let out = render_transcript(
            &make_transcript(vec![message]),
            OutputFormat::HtmlDark,
            &opts(),
        );

        assert!(out.contains(r#"<a href="https://cdn.example.com/cat.png">cat.png (1.5 KB)</a>"#));
        assert!(out.contains(r#"title="2024-12-05 01:00">(edited)"#));
    }

    #[test]
    fn html_themes_differ_only_in_stylesheet() {
        let transcript = make_transcript(vec![
            make_message("<@123> **bold** <:wave:1>"),
            make_message("> quote\n`code`"),
        ]);
        let dark = render_transcript(&transcript, OutputFormat::HtmlDark, &opts());
        let light = render_transcript(&transcript, OutputFormat::HtmlLight, &opts());

        assert_ne!(dark, light);
        assert_eq!(dark.replace(DARK_CSS, ""), light.replace(LIGHT_CSS, ""));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut message = make_message("Hi <@123>, welcome");
        message.attachments.push(attachment());
        let out = render_transcript(&make_transcript(vec![message]), OutputFormat::Csv, &opts());

        let mut lines = out.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some("Bob#0001;2024-12-05 00:00;\"Hi @Alice, welcome\";https://cdn.example.com/cat.png;")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_escapes_author_and_attachment_cells() {
        let mut message = make_message("hi");
        message.author.name = "a;b".into();
        message.author.discriminator = None;
        message.attachments.push(attachment());
        message.attachments.push(attachment());
        let out = render_transcript(&make_transcript(vec![message]), OutputFormat::Csv, &opts());

        assert_eq!(
            out.lines().nth(1),
            Some(
                "\"a;b\";2024-12-05 00:00;hi;\"https://cdn.example.com/cat.png,https://cdn.example.com/cat.png\";"
            )
        );
    }

    #[test]
    fn csv_keeps_one_line_per_message() {
        let transcript = make_transcript(vec![make_message("a\nb"), make_message("c")]);
        let out = render_transcript(&transcript, OutputFormat::Csv, &opts());

        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn formats_dates_with_pattern() {
        let ts = DateTime::from_timestamp_millis(1_733_356_800_000).unwrap();
        assert_eq!(format_date(&ts, "%Y-%m-%d"), "2024-12-05");
        assert_eq!(format_date(&ts, DEFAULT_DATE_FORMAT), "05-Dec-24 12:00 AM");
    }

    #[test]
    fn invalid_date_pattern_falls_back_to_rfc3339() {
        let ts = DateTime::from_timestamp_millis(1_733_356_800_000).unwrap();
        assert!(!is_valid_date_format("%Q"));
        assert_eq!(format_date(&ts, "%Q"), "2024-12-05T00:00:00+00:00");
    }

    #[test]
    fn formats_file_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2048), "2 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn renders_empty_transcript() {
        let transcript = make_transcript(vec![]);
        assert_eq!(
            render_transcript(&transcript, OutputFormat::Csv, &opts()),
            format!("{CSV_HEADER}\n")
        );
        assert!(
            render_transcript(&transcript, OutputFormat::PlainText, &opts())
                .contains("Messages: 0")
        );
    }
}
