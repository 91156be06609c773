// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Transcript data and the mention reference model.
//!
//! A [`Message`] carries its raw content together with the users, roles and
//! channels that the content references. References are resolved upstream, so
//! every token in `content` whose identifier appears in one of the collections
//! can be rendered with a display name. Lookups are by identifier only since
//! display names are neither unique nor stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A whole exported channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    /// Name of the server the channel belongs to.
    #[serde(default)]
    pub guild: String,

    /// The exported channel itself.
    pub channel: ChannelReference,

    /// Messages in chronological order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Platform identifier of the message.
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,

    /// Who sent the message.
    pub author: Author,

    /// When the message was sent.
    pub timestamp: DateTime<Utc>,

    /// When the message was last edited, if ever.
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,

    /// Raw content: plain text, markdown, and inline reference tokens.
    #[serde(default)]
    pub content: String,

    /// Files attached to the message.
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Users referenced by `<@id>` or `<@!id>` tokens.
    #[serde(default)]
    pub mentioned_users: Vec<UserReference>,

    /// Roles referenced by `<@&id>` tokens.
    #[serde(default)]
    pub mentioned_roles: Vec<RoleReference>,

    /// Channels referenced by `<#id>` tokens.
    #[serde(default)]
    pub mentioned_channels: Vec<ChannelReference>,
}

impl Message {
    /// Finds a mentioned user by identifier.
    #[must_use]
    pub fn mentioned_user(&self, id: u64) -> Option<&UserReference> {
        self.mentioned_users.iter().find(|u| u.id == id)
    }

    /// Finds a mentioned role by identifier.
    #[must_use]
    pub fn mentioned_role(&self, id: u64) -> Option<&RoleReference> {
        self.mentioned_roles.iter().find(|r| r.id == id)
    }

    /// Finds a mentioned channel by identifier.
    #[must_use]
    pub fn mentioned_channel(&self, id: u64) -> Option<&ChannelReference> {
        self.mentioned_channels.iter().find(|c| c.id == id)
    }
}

/// The sender of a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    /// Platform identifier of the user.
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,

    /// Display handle.
    pub name: String,

    /// Four-digit discriminator, absent or `"0"` on newer accounts.
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl Author {
    /// Handle qualified with the discriminator when there is one.
    #[must_use]
    pub fn full_name(&self) -> String {
        qualify(&self.name, self.discriminator.as_deref())
    }
}

/// A user referenced from message content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserReference {
    /// Identifier embedded in the mention token.
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,

    /// Display handle.
    pub name: String,

    /// Four-digit discriminator, absent or `"0"` on newer accounts.
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl UserReference {
    /// Handle qualified with the discriminator, used for tooltips.
    #[must_use]
    pub fn full_name(&self) -> String {
        qualify(&self.name, self.discriminator.as_deref())
    }
}

/// A role referenced from message content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleReference {
    /// Identifier embedded in the mention token.
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,
    /// Role name.
    pub name: String,
}

/// A channel referenced from message content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelReference {
    /// Identifier embedded in the mention token.
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,
    /// Channel name without the leading `#`.
    pub name: String,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Platform identifier of the attachment.
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,
    /// Original file name.
    pub file_name: String,
    /// Where the file can be downloaded.
    pub url: String,
    /// Size in bytes.
    #[serde(default)]
    pub file_size: u64,
}

fn qualify(name: &str, discriminator: Option<&str>) -> String {
    match discriminator {
        Some(d) if !d.is_empty() && d != "0" => format!("{name}#{d}"),
        _ => name.to_owned(),
    }
}

/// Accepts identifiers as JSON numbers or as decimal strings.
///
/// Exports usually quote identifiers since they exceed the range JavaScript
/// numbers represent exactly.
fn snowflake<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(id) => Ok(id),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
