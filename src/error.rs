use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::effect::Effect;
use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Server rejected request: status {}, {}", .0.status.as_u16(), .0.message())]
    Rejected(ApiResponse),

    #[error("Server error: status {}, {}", .response.status.as_u16(), .response.message())]
    Status {
        response: ApiResponse,
        effect: Effect,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Build request failed: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Encode request body failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Credential store error: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl RequestError {
    /// The server's answer, for failures that have one.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            Self::Rejected(response) | Self::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|response| response.status)
    }

    pub fn effect(&self) -> Option<&Effect> {
        match self {
            Self::Status { effect, .. } => Some(effect),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(StatusCode::NOT_FOUND))
    }
}
