use crate::error::{HandoverError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_JQL: &str = "project = TCP \
AND issuetype in standardIssueTypes() \
AND status in (\"WL - Pending\", \"WL - Processing\") \
ORDER BY created ASC, updated DESC";

pub const DEFAULT_MAX_RESULTS: u32 = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
pub const DEFAULT_USERNAME: &str = "Jira Bot";
pub const DEFAULT_ICON_EMOJI: &str = ":jira:";

const ENV_JIRA_URL: &str = "JIRA_URL";
const ENV_JIRA_EMAIL: &str = "JIRA_EMAIL";
const ENV_JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";
const ENV_JIRA_JQL: &str = "JIRA_JQL";
const ENV_JIRA_MAX_RESULTS: &str = "JIRA_MAX_RESULTS";
const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
const ENV_SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
const ENV_SLACK_CHANNEL: &str = "SLACK_CHANNEL";
const ENV_SLACK_API_URL: &str = "SLACK_API_URL";
const ENV_SLACK_SIGNING_SECRET: &str = "SLACK_SIGNING_SECRET";
const ENV_SLACK_USERNAME: &str = "SLACK_USERNAME";
const ENV_SLACK_ICON_EMOJI: &str = "SLACK_ICON_EMOJI";
const ENV_HTTP_TIMEOUT_SECS: &str = "HANDOVER_HTTP_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// JiraConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub jql: String,
    pub max_results: u32,
}

// ---------------------------------------------------------------------------
// SlackConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SlackConfig {
    pub webhook_url: Option<String>,
    pub bot_token: Option<String>,
    pub channel: Option<String>,
    pub api_url: String,
    pub signing_secret: Option<String>,
    pub username: String,
    pub icon_emoji: String,
}

/// Where a notification goes. Webhook wins when both are configured.
#[derive(Debug, Clone, PartialEq)]
pub enum Sink<'a> {
    Webhook { url: &'a str },
    Bot { token: &'a str, channel: &'a str },
}

impl SlackConfig {
    pub fn sink(&self) -> Option<Sink<'_>> {
        if let Some(url) = self.webhook_url.as_deref() {
            return Some(Sink::Webhook { url });
        }
        match (self.bot_token.as_deref(), self.channel.as_deref()) {
            (Some(token), Some(channel)) => Some(Sink::Bot { token, channel }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub jira: JiraConfig,
    pub slack: SlackConfig,
    pub timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require =
            |key: &str| get(key).ok_or_else(|| HandoverError::MissingConfig(key.to_string()));

        let jira = JiraConfig {
            base_url: require(ENV_JIRA_URL)?.trim_end_matches('/').to_string(),
            email: require(ENV_JIRA_EMAIL)?,
            api_token: require(ENV_JIRA_API_TOKEN)?,
            jql: get(ENV_JIRA_JQL).unwrap_or_else(|| DEFAULT_JQL.to_string()),
            max_results: parse_positive(ENV_JIRA_MAX_RESULTS, get(ENV_JIRA_MAX_RESULTS))?
                .unwrap_or(DEFAULT_MAX_RESULTS),
        };

        let slack = SlackConfig {
            webhook_url: get(ENV_SLACK_WEBHOOK_URL),
            bot_token: get(ENV_SLACK_BOT_TOKEN),
            channel: get(ENV_SLACK_CHANNEL),
            api_url: get(ENV_SLACK_API_URL)
                .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            signing_secret: get(ENV_SLACK_SIGNING_SECRET),
            username: get(ENV_SLACK_USERNAME).unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            icon_emoji: get(ENV_SLACK_ICON_EMOJI)
                .unwrap_or_else(|| DEFAULT_ICON_EMOJI.to_string()),
        };

        let timeout_secs = parse_positive(ENV_HTTP_TIMEOUT_SECS, get(ENV_HTTP_TIMEOUT_SECS))?
            .map(u64::from)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            jira,
            slack,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.slack.webhook_url.is_none() && self.slack.bot_token.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "neither SLACK_WEBHOOK_URL nor SLACK_BOT_TOKEN is set; \
                          handovers can be saved but not posted"
                    .to_string(),
            });
        }

        if self.slack.webhook_url.is_none()
            && self.slack.bot_token.is_some()
            && self.slack.channel.is_none()
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "SLACK_BOT_TOKEN is set but SLACK_CHANNEL is not".to_string(),
            });
        }

        if !self.jira.base_url.starts_with("https://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "JIRA_URL '{}' is not https; credentials are sent with basic auth",
                    self.jira.base_url
                ),
            });
        }

        warnings
    }
}

fn parse_positive(key: &str, raw: Option<String>) -> Result<Option<u32>> {
    raw.map(|value| match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(HandoverError::InvalidConfig(format!(
            "{key} must be a positive integer, got '{value}'"
        ))),
    })
    .transpose()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
