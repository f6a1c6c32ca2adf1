use crate::utils::output::OutputStyle;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// The stored token record is unreadable or has no access token line.
    /// Deleting the token file forces a fresh device-code authorization.
    #[error("Corrupt credential file: {0}")]
    CorruptCredential(String),

    #[error("Device authorization timed out: {0}")]
    DeviceFlowTimedOut(String),

    /// The access token is invalid and no refresh token is on record.
    #[error("Token refresh impossible: {0}")]
    RefreshImpossible(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Config file error: {0}")]
    ConfigIo(String),

    #[error("System error: {0}")]
    System(String),
}

/// Result type alias for consistent error handling across the application
pub type AppResult<T> = Result<T, AppError>;

pub fn report_error(err: &AppError) {
    match err {
        AppError::CorruptCredential(msg) | AppError::RefreshImpossible(msg) => {
            eprintln!(
                "❌ {}",
                OutputStyle::error(&format!(
                    "Credentials: {}. Delete the token file to re-authorize.",
                    msg
                ))
            );
        }
        AppError::DeviceFlowTimedOut(msg) => {
            eprintln!(
                "⏱️  {}",
                OutputStyle::error(&format!("Authorization: {}", msg))
            );
        }
        AppError::RemoteService(msg) => {
            eprintln!("🌐 {}", OutputStyle::error(&format!("Remote: {}", msg)));
        }
        AppError::ConfigIo(msg) => {
            eprintln!("❌ {}", OutputStyle::error(msg));
        }
        AppError::System(msg) => {
            eprintln!("❌ {}", OutputStyle::error(msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = AppError::CorruptCredential("token file has zero lines".to_string());
        assert!(err.to_string().contains("zero lines"));

        let err = AppError::RemoteService("HTTP 503 from watchlist".to_string());
        assert!(err.to_string().starts_with("Remote service error"));
    }
}
