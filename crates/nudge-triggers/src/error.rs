use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    /// The capability needed to present the trigger is absent (no player, no command).
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The external presentation command could not be started.
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TriggerError>;
