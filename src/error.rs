//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{MSG_GENERATION_FAILED, MSG_NOT_CONFIGURED};
use crate::generation::GenerationStage;
use crate::provider::ProviderError;

/// Error definitions for the plasterbust endpoint.
#[derive(Debug)]
pub enum PlasterError {
    /// No provider credential is configured
    Configuration,
    /// The request didn't carry what we need
    Validation(String),
    /// The provider call failed during the given stage
    Upstream {
        /// Where the request was when it failed
        stage: GenerationStage,
        /// Message from the provider, may be empty
        message: String,
    },
    /// When an internal server error occurs
    InternalServerError(String),
}

impl PlasterError {
    /// Wraps a provider failure that happened in `stage`.
    pub fn upstream(stage: GenerationStage, err: ProviderError) -> Self {
        PlasterError::Upstream {
            stage,
            message: err.message().to_string(),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            PlasterError::Validation(_) => StatusCode::BAD_REQUEST,
            PlasterError::Configuration
            | PlasterError::Upstream { .. }
            | PlasterError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    pub fn client_message(&self) -> &str {
        match self {
            PlasterError::Configuration => MSG_NOT_CONFIGURED,
            PlasterError::Validation(message) => message,
            PlasterError::Upstream { message, .. } if !message.trim().is_empty() => message,
            PlasterError::Upstream { .. } => MSG_GENERATION_FAILED,
            PlasterError::InternalServerError(_) => "Internal server error",
        }
    }
}

impl std::fmt::Display for PlasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlasterError::Upstream { stage, .. } => {
                write!(f, "{} (while {stage})", self.client_message())
            }
            PlasterError::InternalServerError(message) => write!(f, "{message}"),
            _ => write!(f, "{}", self.client_message()),
        }
    }
}

impl std::error::Error for PlasterError {}

/// JSON body of every failed response.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    /// Human readable message
    pub error: String,
}

impl IntoResponse for PlasterError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match &self {
            PlasterError::Validation(message) => {
                info!("Bad request received: {}", message);
            }
            PlasterError::Configuration => {
                tracing::error!("Refusing request: {}", MSG_NOT_CONFIGURED);
            }
            PlasterError::Upstream { stage, message } => {
                tracing::error!("Error generating image while {}: {}", stage, message);
            }
            PlasterError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
            }
        }
        let body = ErrorBody {
            error: self.client_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
