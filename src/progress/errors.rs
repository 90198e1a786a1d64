use thiserror::Error;

/// Errors that can arise while interacting with the progress storage layer.
///
/// Gameplay-facing operations never return these; they are absorbed and logged
/// by the gateway. They surface only from the storage backends and from name
/// parsing used by the CLI.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored blob parsed as JSON but is not a progress object.
    #[error("corrupt progress record: {0}")]
    Corrupt(String),

    /// Unrecognized game name.
    #[error("unknown game: {0}")]
    UnknownGame(String),

    /// Unrecognized difficulty name.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// Level number outside `1..=level_count` for its difficulty.
    #[error("level {level} out of range for {difficulty} (1..={max})")]
    LevelOutOfRange {
        difficulty: &'static str,
        level: u32,
        max: u32,
    },
}
