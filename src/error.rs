//! Error handler for notas.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Message used when the backend gives no explanation.
pub const GENERIC_MESSAGE: &str = "Error en la petición";

pub type Result<T> = std::result::Result<T, ClientError>;

/// Enum representing client-side errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        body: ErrorBody,
    },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected a JSON response, got status {status}")]
    UnexpectedContent { status: StatusCode },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Error payload sent by the backend on non-2xx responses.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub detalle: Option<String>,
}

impl ErrorBody {
    /// First non-empty message among `error` and `detalle`.
    pub fn message(&self) -> Option<&str> {
        [self.error.as_deref(), self.detalle.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
    }
}

impl ClientError {
    /// Build an [`ClientError::Api`] from a raw JSON body.
    ///
    /// Anything that is not an object with `error`/`detalle` strings is
    /// treated as an empty body.
    pub fn api(status: StatusCode, body: &serde_json::Value) -> Self {
        let body: ErrorBody =
            serde_json::from_value(body.clone()).unwrap_or_default();
        let message = body.message().unwrap_or(GENERIC_MESSAGE).to_owned();

        Self::Api {
            status,
            message,
            body,
        }
    }

    /// HTTP status attached to the error, if the backend answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::UnexpectedContent { status } => {
                Some(*status)
            },
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the backend refused the request because of the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }

    /// Human-readable message for display, following the backend fields first.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Api { body, .. } => body
                .message()
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| self.to_string()),
            _ => {
                let message = self.to_string();
                if message.is_empty() {
                    fallback.to_owned()
                } else {
                    message
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_message_priority() {
        let err = ClientError::api(
            StatusCode::BAD_REQUEST,
            &json!({ "error": "Transición no permitida", "detalle": "No se puede" }),
        );
        assert_eq!(err.to_string(), "Transición no permitida");

        let err = ClientError::api(
            StatusCode::FORBIDDEN,
            &json!({ "detalle": "Solo Director o Administrador pueden anular notas." }),
        );
        assert_eq!(
            err.to_string(),
            "Solo Director o Administrador pueden anular notas."
        );
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_api_generic_message() {
        let err = ClientError::api(StatusCode::INTERNAL_SERVER_ERROR, &json!({}));
        assert_eq!(err.to_string(), GENERIC_MESSAGE);
        assert_eq!(err.display_message("fallback"), GENERIC_MESSAGE);

        // Not an object at all.
        let err = ClientError::api(StatusCode::BAD_GATEWAY, &json!([1, 2]));
        assert_eq!(err.to_string(), GENERIC_MESSAGE);
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_display_message_prefers_body() {
        let err = ClientError::api(
            StatusCode::UNAUTHORIZED,
            &json!({ "error": "credenciales inválidas" }),
        );
        assert_eq!(err.display_message("x"), "credenciales inválidas");

        let err = ClientError::UnexpectedContent {
            status: StatusCode::OK,
        };
        assert!(err.display_message("x").contains("200"));
    }
}
