use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use handover_core::HandoverError;

pub const POST_FAILED: &str = "Failed to post to Slack";

// ---------------------------------------------------------------------------
// Internal sentinel for a failed Slack post
// ---------------------------------------------------------------------------

/// Carries a 502 for a post that failed after the store was saved. The cause
/// was already logged where the post happened.
#[derive(Debug)]
struct PostFailed;

impl std::fmt::Display for PostFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(POST_FAILED)
    }
}

impl std::error::Error for PostFailed {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Bodies are
/// `{"success": false, "error": "..."}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error for a body that could not be parsed.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(HandoverError::MalformedRequest(msg.into()).into())
    }

    /// Construct the 502 returned when saving succeeded but posting did not.
    pub fn post_failed() -> Self {
        Self(PostFailed.into())
    }
}

fn status_for(e: &HandoverError) -> StatusCode {
    match e {
        HandoverError::InvalidField(_)
        | HandoverError::MalformedRequest(_)
        | HandoverError::InvalidSchedule(_) => StatusCode::BAD_REQUEST,
        HandoverError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
        HandoverError::Transport { .. }
        | HandoverError::UpstreamStatus { .. }
        | HandoverError::MalformedResponse { .. }
        | HandoverError::SlackApi(_) => StatusCode::BAD_GATEWAY,
        HandoverError::NoSink => StatusCode::SERVICE_UNAVAILABLE,
        HandoverError::MissingConfig(_)
        | HandoverError::InvalidConfig(_)
        | HandoverError::HomeNotFound
        | HandoverError::Io(_)
        | HandoverError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.downcast_ref::<PostFailed>().is_some() {
            StatusCode::BAD_GATEWAY
        } else if let Some(e) = self.0.downcast_ref::<HandoverError>() {
            status_for(e)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %format!("{:#}", self.0), "request failed");
        }

        let body = serde_json::json!({ "success": false, "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn invalid_field_maps_to_400() {
        let err = AppError(HandoverError::InvalidField("status-T-1".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_request_names_the_body_not_a_field() {
        let resp = AppError::bad_request("duplicate field `command`").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "malformed request body: duplicate field `command`");
    }

    #[test]
    fn bad_signature_maps_to_401() {
        let err = AppError(HandoverError::InvalidSignature("signature mismatch".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_failures_map_to_502() {
        let transport = AppError(
            HandoverError::Transport {
                service: "jira".into(),
                message: "connection refused".into(),
            }
            .into(),
        );
        assert_eq!(transport.into_response().status(), StatusCode::BAD_GATEWAY);

        let status = AppError(
            HandoverError::UpstreamStatus {
                service: "jira".into(),
                status: 401,
                body: String::new(),
            }
            .into(),
        );
        assert_eq!(status.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn no_sink_maps_to_503() {
        let err = AppError(HandoverError::NoSink.into());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn io_error_maps_to_500() {
        let err = AppError(HandoverError::Io(std::io::Error::other("disk full")).into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_handover_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn post_failed_body_matches_form_contract() {
        let response = AppError::post_failed().into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Failed to post to Slack" })
        );
    }
}
