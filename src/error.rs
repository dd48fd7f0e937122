use thiserror::Error;

/// Errors raised while building a grid from level data
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown level marker {marker:?} at row {row}, column {col}")]
    UnknownMarker { marker: char, row: usize, col: usize },
    #[error("level has no open cell for the player to start on")]
    NoPlayerStart,
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
