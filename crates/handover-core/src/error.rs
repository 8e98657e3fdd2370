use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandoverError {
    #[error("missing required configuration: {0} is not set")]
    MissingConfig(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("request to {service} failed: {message}")]
    Transport { service: String, message: String },

    #[error("{service} returned status {status}: {body}")]
    UpstreamStatus {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} response was malformed: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("slack API error: {0}")]
    SlackApi(String),

    #[error("no notification sink configured: set SLACK_WEBHOOK_URL or SLACK_BOT_TOKEN")]
    NoSink,

    #[error("invalid form field '{0}'")]
    InvalidField(String),

    #[error("malformed request body: {0}")]
    MalformedRequest(String),

    #[error("invalid request signature: {0}")]
    InvalidSignature(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HandoverError {
    pub(crate) fn transport(service: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            service: service.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn malformed(service: &str, err: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            service: service.to_string(),
            message: err.to_string(),
        }
    }

    /// True for failures of an upstream HTTP collaborator (network, status, body).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::UpstreamStatus { .. }
                | Self::MalformedResponse { .. }
                | Self::SlackApi(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HandoverError>;
