// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Per-message content transcoding.
//!
//! Each output format runs a short pipeline over the raw message content. The
//! pipelines differ in their baseline transform (line breaks, markdown,
//! quoting) and share a single reference-resolution step, in which mention
//! and emoji tokens are matched and handed to a format-specific [`Render`].
//!
//! Tokens are always resolved by the identifier they embed. A token whose
//! identifier is not among the message's references is left as it was.
//!
//! # Example
//!
//! ```
//! use chatfmt::format::OutputFormat;
//! use chatfmt::transcode::transcode;
//! # use chatfmt::model::{Author, ChannelReference, Message, UserReference};
//! # let message = Message {
//! #     id: 1,
//! #     author: Author { id: 2, name: "Bob".into(), discriminator: None },
//! #     timestamp: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
//! #     edited_timestamp: None,
//! #     content: "Hello <@123>, welcome to <#456>!".into(),
//! #     attachments: vec![],
//! #     mentioned_users: vec![UserReference { id: 123, name: "Alice".into(), discriminator: None }],
//! #     mentioned_roles: vec![],
//! #     mentioned_channels: vec![ChannelReference { id: 456, name: "general".into() }],
//! # };
//!
//! assert_eq!(
//!     transcode(&message, OutputFormat::PlainText),
//!     "Hello @Alice, welcome to #general!"
//! );
//! ```

use crate::format::{FormatError, OutputFormat};
use crate::markdown::{escape_html, to_html};
use crate::model::{ChannelReference, Message, RoleReference, UserReference};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::trace;

/// A content pipeline for one output format.
pub type Transcoder = fn(&Message) -> String;

/// Pipelines indexed by [`OutputFormat`] discriminant. Both HTML themes share
/// one pipeline.
static PIPELINES: [Transcoder; 4] = [plain_text, html, html, csv];

/// Line ending of the host platform.
const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Base URL for custom emoji images.
const EMOJI_CDN: &str = "https://cdn.discordapp.com/emojis";

/// Reference tokens in their raw stored form.
static RAW_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<(?:@!?(?P<user>\d+)|#(?P<channel>\d+)|@&(?P<role>\d+)|(?P<animated>a?):(?P<emoji>\w+):(?P<emoji_id>\d+))>",
    )
    .expect("valid raw token regex")
});

/// Reference tokens after HTML escaping.
static ESCAPED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"&lt;(?:@!?(?P<user>\d+)|#(?P<channel>\d+)|@&amp;(?P<role>\d+)|(?P<animated>a?):(?P<emoji>\w+):(?P<emoji_id>\d+))&gt;",
    )
    .expect("valid escaped token regex")
});

/// Returns the content pipeline for `format`.
#[must_use]
pub fn select_pipeline(format: OutputFormat) -> Transcoder {
    PIPELINES[format as usize]
}

/// Transcodes the content of `message` into `format`.
#[must_use]
pub fn transcode(message: &Message, format: OutputFormat) -> String {
    select_pipeline(format)(message)
}

/// Like [`transcode`], with the format given by name.
///
/// # Errors
///
/// Returns [`FormatError::Unsupported`] if `format` names no known format.
pub fn transcode_named(message: &Message, format: &str) -> Result<String, FormatError> {
    let format: OutputFormat = format.parse()?;
    Ok(transcode(message, format))
}

/// Builds the image URL for a custom emoji.
///
/// The identifier is used as written in the token, so it is never range
/// limited.
#[must_use]
pub fn emoji_image_url(id: &str, animated: bool) -> String {
    let ext = if animated { "gif" } else { "png" };
    format!("{EMOJI_CDN}/{id}.{ext}")
}

/// A custom emoji token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emoji<'a> {
    /// Emoji name without colons.
    pub name: &'a str,
    /// Platform identifier of the emoji image, as the digits in the token.
    pub id: &'a str,
    /// Whether the `<a:name:id>` form was used.
    pub animated: bool,
}

/// How resolved references are written in a given format.
pub trait Render {
    /// A mentioned user.
    fn user(&self, user: &UserReference) -> String;
    /// A mentioned role.
    fn role(&self, role: &RoleReference) -> String;
    /// A mentioned channel.
    fn channel(&self, channel: &ChannelReference) -> String;
    /// A custom emoji.
    fn emoji(&self, emoji: Emoji<'_>) -> String;
}

/// Readable labels for plain text and CSV. Emoji lose their identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRender;

impl Render for TextRender {
    fn user(&self, user: &UserReference) -> String {
        format!("@{}", user.name)
    }

    fn role(&self, role: &RoleReference) -> String {
        format!("@{}", role.name)
    }

    fn channel(&self, channel: &ChannelReference) -> String {
        format!("#{}", channel.name)
    }

    fn emoji(&self, emoji: Emoji<'_>) -> String {
        format!(":{}:", emoji.name)
    }
}

/// Styled spans and inline images, shared by both HTML themes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRender;

impl Render for HtmlRender {
    fn user(&self, user: &UserReference) -> String {
        format!(
            r#"<span class="mention" title="{}">@{}</span>"#,
            escape_html(&user.full_name()),
            escape_html(&user.name)
        )
    }

    fn role(&self, role: &RoleReference) -> String {
        format!(r#"<span class="mention">@{}</span>"#, escape_html(&role.name))
    }

    fn channel(&self, channel: &ChannelReference) -> String {
        format!(
            r#"<span class="mention">#{}</span>"#,
            escape_html(&channel.name)
        )
    }

    fn emoji(&self, emoji: Emoji<'_>) -> String {
        let label = escape_html(&format!(":{}:", emoji.name));
        format!(
            r#"<img class="emoji" alt="{label}" title="{label}" src="{}">"#,
            emoji_image_url(emoji.id, emoji.animated)
        )
    }
}

fn plain_text(message: &Message) -> String {
    let content = normalize_line_endings(&message.content);
    resolve_references(&content, &RAW_TOKEN, message, &TextRender)
}

fn html(message: &Message) -> String {
    let content = to_html(&message.content)
        .replace("@everyone", r#"<span class="mention">@everyone</span>"#)
        .replace("@here", r#"<span class="mention">@here</span>"#);
    resolve_references(&content, &ESCAPED_TOKEN, message, &HtmlRender)
}

fn csv(message: &Message) -> String {
    let single_line = message
        .content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', ", ");
    resolve_references(&csv_field(&single_line), &RAW_TOKEN, message, &TextRender)
}

/// Escapes one `;`-separated CSV cell.
///
/// Quotes are doubled, and the cell is wrapped in quotes when it contains a
/// `,` or `;`.
#[must_use]
pub fn csv_field(value: &str) -> String {
    let field = value.replace('"', "\"\"");
    if field.contains([',', ';']) {
        format!("\"{field}\"")
    } else {
        field
    }
}

fn normalize_line_endings(s: &str) -> String {
    let unix = s.replace("\r\n", "\n").replace('\r', "\n");
    if LINE_ENDING == "\n" {
        unix
    } else {
        unix.replace('\n', LINE_ENDING)
    }
}

/// Replaces every resolvable reference token in one left-to-right scan.
///
/// Inserted names are never rescanned, so a display name that happens to look
/// like a token stays literal.
fn resolve_references(
    content: &str,
    tokens: &Regex,
    message: &Message,
    render: &dyn Render,
) -> String {
    tokens
        .replace_all(content, |caps: &Captures<'_>| {
            resolve_token(caps, message, render).unwrap_or_else(|| {
                trace!(
                    token = &caps[0],
                    message_id = message.id,
                    "leaving unresolved token"
                );
                caps[0].to_owned()
            })
        })
        .into_owned()
}

fn resolve_token(caps: &Captures<'_>, message: &Message, render: &dyn Render) -> Option<String> {
    if let Some(id) = caps.name("user") {
        let user = message.mentioned_user(id.as_str().parse().ok()?)?;
        return Some(render.user(user));
    }
    if let Some(id) = caps.name("channel") {
        let channel = message.mentioned_channel(id.as_str().parse().ok()?)?;
        return Some(render.channel(channel));
    }
    if let Some(id) = caps.name("role") {
        let role = message.mentioned_role(id.as_str().parse().ok()?)?;
        return Some(render.role(role));
    }
    let name = caps.name("emoji")?.as_str();
    let id = caps.name("emoji_id")?.as_str();
    let animated = caps.name("animated").is_some_and(|a| !a.as_str().is_empty());
    Some(render.emoji(Emoji { name, id, animated }))
}
