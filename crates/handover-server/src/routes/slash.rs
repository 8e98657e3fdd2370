use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use handover_core::slack::{self, Block, SlashResponse, Text};
use handover_core::HandoverError;
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const SIGNATURE_HEADER: &str = "x-slack-signature";

/// The fields of a slash-command payload that get logged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SlashCommand {
    pub command: String,
    pub text: String,
    pub user_name: String,
    pub channel_name: String,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, HandoverError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandoverError::InvalidSignature(format!("missing {name} header")))
}

/// POST /slack/handover: reply to the `/handover` slash command.
///
/// With a signing secret configured the raw body is verified before it is
/// parsed. Jira failures become an ephemeral message, since Slack shows
/// nothing useful for a non-200 reply.
pub async fn handover_command(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SlashResponse>, AppError> {
    if let Some(secret) = app.handover.config().slack.signing_secret.as_deref() {
        let timestamp = header(&headers, TIMESTAMP_HEADER)?;
        let signature = header(&headers, SIGNATURE_HEADER)?;
        slack::verify_signature(
            secret,
            timestamp,
            &body,
            signature,
            chrono::Utc::now().timestamp(),
        )?;
    }

    let cmd: SlashCommand = serde_urlencoded::from_bytes(&body)
        .map_err(|e| AppError::bad_request(e.to_string()))?;
    tracing::info!(
        command = %cmd.command,
        user_name = %cmd.user_name,
        channel_name = %cmd.channel_name,
        "slash command received"
    );

    match blocking(&app, |h| h.slash_response()).await {
        Ok(response) => Ok(Json(response)),
        Err(AppError(e)) => match e.downcast_ref::<HandoverError>() {
            Some(he) if he.is_upstream() => {
                tracing::warn!(error = %he, "slash command could not fetch tickets");
                Ok(Json(SlashResponse {
                    response_type: "ephemeral".to_string(),
                    blocks: vec![Block::Section {
                        text: Text::Markdown {
                            text: "⚠️ Could not fetch tickets from Jira. Try again shortly."
                                .to_string(),
                        },
                    }],
                }))
            }
            _ => Err(AppError(e)),
        },
    }
}
