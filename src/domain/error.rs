use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Message from the server's error body, shown to the user
        server_message: Option<String>,
    },

    #[error("Download aborted")]
    Aborted,

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, AppError::Aborted)
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Api { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        AppError::Api {
            server_message: error.server_message().map(String::from),
            message: error.to_string(),
        }
    }
}
