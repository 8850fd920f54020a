use thiserror::Error;

#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid time: {input:?}")]
    InvalidTime { input: String },
}

impl NudgeError {
    /// Short error code string, stable across releases (used in CLI output and logs).
    pub fn code(&self) -> &'static str {
        match self {
            NudgeError::Config(_) => "CONFIG_ERROR",
            NudgeError::InvalidTime { .. } => "INVALID_TIME",
        }
    }
}

pub type Result<T> = std::result::Result<T, NudgeError>;
