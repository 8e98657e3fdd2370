//! Slack rendering and delivery.
//!
//! Rendering is pure: the same store and timestamp always give the same
//! blocks. Delivery goes to an incoming webhook or to `chat.postMessage`
//! with a bot token, never retried.

use crate::config::{Sink, SlackConfig};
use crate::error::{HandoverError, Result};
use crate::paths;
use crate::store::AnnotationStore;
use chrono::{DateTime, TimeZone};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

const SERVICE: &str = "slack";
const EMPTY_TEXT: &str = "✅ *No pending tickets found!*";
const SIGNATURE_VERSION: &str = "v0";

/// Requests older than this are rejected to limit replay.
pub const MAX_SIGNATURE_AGE_SECS: i64 = 60 * 5;

// ---------------------------------------------------------------------------
// Block Kit types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Text {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    #[serde(rename = "mrkdwn")]
    Markdown { text: String },
}

impl Text {
    pub fn as_str(&self) -> &str {
        match self {
            Text::Plain { text } | Text::Markdown { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: Text },
    Section { text: Text },
    Divider,
    Context { elements: Vec<Text> },
}

impl Block {
    fn markdown(text: impl Into<String>) -> Self {
        Block::Section {
            text: Text::Markdown { text: text.into() },
        }
    }

    /// Text content of a header or section block.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Header { text } | Block::Section { text } => Some(text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<&'a str>,
    pub blocks: &'a [Block],
    pub username: &'a str,
    pub icon_emoji: &'a str,
}

/// Synchronous reply to a slash command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlashResponse {
    pub response_type: String,
    pub blocks: Vec<Block>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render `store` as Block Kit: a header, a count line, then one section per
/// ticket in store order. An empty store renders a single informational block.
pub fn format_notification<Tz>(store: &AnnotationStore, base_url: &str, now: DateTime<Tz>) -> Vec<Block>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if store.is_empty() {
        return vec![Block::markdown(EMPTY_TEXT)];
    }

    let count = store.len();
    let mut blocks = Vec::with_capacity(count + 2);
    blocks.push(Block::Header {
        text: Text::Plain {
            text: format!(
                "📋 Jira Tickets Update - {} ({count} tickets)",
                now.format("%Y-%m-%d %H:%M")
            ),
        },
    });
    blocks.push(Block::markdown(format!("Found *{count}* ticket(s)")));

    for (idx, (key, record)) in store.iter().enumerate() {
        let url = paths::browse_url(base_url, key);
        blocks.push(Block::markdown(format!(
            "*--- Ticket {} ---*\nTicket Link: <{url}|{key}> {}\nStatus: {}\nAction: {}",
            idx + 1,
            record.summary,
            record.status,
            record.action,
        )));
    }
    blocks
}

/// Wrap the notification for a slash-command reply. Non-empty replies are
/// posted in channel with a footer; empty replies are ephemeral.
pub fn slash_response<Tz>(store: &AnnotationStore, base_url: &str, now: DateTime<Tz>) -> SlashResponse
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut blocks = format_notification(store, base_url, now);
    if store.is_empty() {
        return SlashResponse {
            response_type: "ephemeral".to_string(),
            blocks,
        };
    }
    blocks.push(Block::Divider);
    blocks.push(Block::Context {
        elements: vec![Text::Markdown {
            text: format!("🤖 Generated from Jira • Total: {} tickets", store.len()),
        }],
    });
    SlashResponse {
        response_type: "in_channel".to_string(),
        blocks,
    }
}

/// Plain-text handover for clipboards and terminals.
pub fn format_plain_text<Tz>(store: &AnnotationStore, base_url: &str, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if store.is_empty() {
        return "✅ No pending tickets found!".to_string();
    }
    let rule = "=".repeat(50);
    let mut out = vec![
        format!("📋 *Jira Tickets Update* - {}", now.format("%Y-%m-%d %H:%M")),
        format!("Found {} ticket(s)\n", store.len()),
        rule.clone(),
    ];
    for (idx, (key, record)) in store.iter().enumerate() {
        let url = paths::browse_url(base_url, key);
        out.push(format!("\n--- Ticket {} ---", idx + 1));
        out.push(format!("Ticket Link: <{url}|{key}> {}", record.summary));
        out.push(format!("Status: {}", record.status));
        out.push(format!("Action: {}", record.action));
    }
    out.push(format!("\n{rule}"));
    out.join("\n")
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Post `blocks` to the configured sink. Returns false on any failure,
/// including a missing sink; the cause is logged.
pub fn post_notification(config: &SlackConfig, timeout: Duration, blocks: &[Block]) -> bool {
    match try_post(config, timeout, blocks) {
        Ok(()) => {
            tracing::info!(blocks = blocks.len(), "posted handover to slack");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to post handover to slack");
            false
        }
    }
}

pub fn try_post(config: &SlackConfig, timeout: Duration, blocks: &[Block]) -> Result<()> {
    let sink = config.sink().ok_or(HandoverError::NoSink)?;
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| HandoverError::transport(SERVICE, e))?;

    match sink {
        Sink::Webhook { url } => {
            let payload = Payload {
                channel: None,
                blocks,
                username: &config.username,
                icon_emoji: &config.icon_emoji,
            };
            let response = client
                .post(url)
                .json(&payload)
                .send()
                .map_err(|e| HandoverError::transport(SERVICE, e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(HandoverError::UpstreamStatus {
                    service: SERVICE.to_string(),
                    status: status.as_u16(),
                    body: response.text().unwrap_or_default(),
                });
            }
            Ok(())
        }
        Sink::Bot { token, channel } => {
            let payload = Payload {
                channel: Some(channel),
                blocks,
                username: &config.username,
                icon_emoji: &config.icon_emoji,
            };
            let response = client
                .post(format!("{}/chat.postMessage", config.api_url))
                .bearer_auth(token)
                .json(&payload)
                .send()
                .map_err(|e| HandoverError::transport(SERVICE, e))?;
            let status = response.status();
            let body = response
                .text()
                .map_err(|e| HandoverError::transport(SERVICE, e))?;
            if !status.is_success() {
                return Err(HandoverError::UpstreamStatus {
                    service: SERVICE.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }
            let reply: ApiReply =
                serde_json::from_str(&body).map_err(|e| HandoverError::malformed(SERVICE, e))?;
            if !reply.ok {
                return Err(HandoverError::SlackApi(
                    reply.error.unwrap_or_else(|| "unknown error".to_string()),
                ));
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Request signing
// ---------------------------------------------------------------------------

/// `v0=<hex hmac-sha256>` over `v0:<timestamp>:<body>`.
pub fn signature(secret: &str, timestamp: &str, body: &[u8]) -> Result<String> {
    let digest = signing_mac(secret, timestamp, body)?.finalize().into_bytes();
    Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest)))
}

/// Check a slash-command request against the signing secret.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    provided: &str,
    now_unix: i64,
) -> Result<()> {
    let sent_at: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| HandoverError::InvalidSignature("bad timestamp".to_string()))?;
    if now_unix.abs_diff(sent_at) > MAX_SIGNATURE_AGE_SECS.unsigned_abs() {
        return Err(HandoverError::InvalidSignature(
            "timestamp outside allowed window".to_string(),
        ));
    }
    let digest = provided
        .strip_prefix("v0=")
        .ok_or_else(|| HandoverError::InvalidSignature("unsupported version".to_string()))?;
    let expected = hex::decode(digest)
        .map_err(|e| HandoverError::InvalidSignature(format!("malformed signature: {e}")))?;
    signing_mac(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| HandoverError::InvalidSignature("signature mismatch".to_string()))
}

fn signing_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<Hmac<Sha256>> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| HandoverError::InvalidConfig(format!("SLACK_SIGNING_SECRET: {e}")))?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
