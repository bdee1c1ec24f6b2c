use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure talking to the platform API.
///
/// Every variant carries enough context to produce a message a user can
/// act on; [`ApiError::user_message`] is what the UI shows.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{fallback}: {source}")]
    Transport {
        fallback: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message} (status {status})")]
    Backend { status: u16, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{fallback}: unexpected response ({source})")]
    Decode {
        fallback: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    GraphQl(String),

    #[error("Invalid API configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn transport(fallback: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            fallback: fallback.to_string(),
            source,
        }
    }

    pub fn decode(fallback: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            fallback: fallback.to_string(),
            source,
        }
    }

    /// Normalise a non-success response into an error.
    ///
    /// The backend reports failures in several shapes: `{"message": ...}`,
    /// `{"error": ...}`, GraphQL-style `{"errors": [{"message": ...}]}`, or
    /// no JSON body at all. The first message found wins; otherwise the
    /// caller's fallback text (e.g. "Failed to fetch roles") is used.
    pub fn from_response(status: StatusCode, body: &str, fallback: &str) -> Self {
        match extract_message(body) {
            Some(message) => Self::Backend {
                status: status.as_u16(),
                message,
            },
            None if status == StatusCode::NOT_FOUND => Self::NotFound(fallback.to_string()),
            None => Self::Backend {
                status: status.as_u16(),
                message: fallback.to_string(),
            },
        }
    }

    /// Text shown in the table or in a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { fallback, .. } | Self::Decode { fallback, .. } => fallback.clone(),
            Self::Backend { message, .. } | Self::NotFound(message) | Self::GraphQl(message) => {
                message.clone()
            }
            Self::Config(_) => self.to_string(),
        }
    }
}

/// Find the first human-readable message in a JSON error body.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let text = |v: &Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };

    text(&value["message"])
        .or_else(|| text(&value["error"]))
        .or_else(|| text(&value["error"]["message"]))
        .or_else(|| text(&value["errors"][0]["message"]))
}
