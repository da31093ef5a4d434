//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tag catalog error: {0}")]
    Catalog(String),

    #[error("Backend process error: {0}")]
    Bridge(String),

    /// Unreadable config file; startup continues with defaults
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Bridge(msg) => format!("Backend unavailable: {}", msg),
            _ => self.to_string(),
        }
    }
}

impl From<ureq::Error> for AppError {
    fn from(e: ureq::Error) -> Self {
        AppError::Catalog(e.to_string())
    }
}
