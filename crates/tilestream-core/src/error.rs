use thiserror::Error;

/// Errors raised while building a chunked tile map.
///
/// All of these are configuration errors: they are reported once, at
/// construction, and a map that constructed successfully never produces them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChunkSystemError {
    #[error("chunk size must be a positive safe integer, got {0}")]
    InvalidChunkSize(i64),

    #[error("rows must be a positive safe integer, got {0}")]
    InvalidRows(i64),

    #[error("cols must be a positive safe integer, got {0}")]
    InvalidCols(i64),

    #[error("rows ({rows}) must be a multiple of chunk size ({chunk_size})")]
    RowsNotMultiple { rows: i64, chunk_size: i64 },

    #[error("cols ({cols}) must be a multiple of chunk size ({chunk_size})")]
    ColsNotMultiple { cols: i64, chunk_size: i64 },

    #[error("cell dimensions must be finite and positive, got {width}x{height}")]
    InvalidCellSize { width: f64, height: f64 },
}

impl ChunkSystemError {
    /// Stable machine-readable code, used across the JS boundary
    pub fn code(&self) -> &'static str {
        match self {
            ChunkSystemError::InvalidChunkSize(_) => "INVALID_CHUNK_SIZE",
            ChunkSystemError::InvalidRows(_) => "INVALID_ROWS",
            ChunkSystemError::InvalidCols(_) => "INVALID_COLS",
            ChunkSystemError::RowsNotMultiple { .. } => "ROWS_NOT_MULTIPLE",
            ChunkSystemError::ColsNotMultiple { .. } => "COLS_NOT_MULTIPLE",
            ChunkSystemError::InvalidCellSize { .. } => "INVALID_CELL_SIZE",
        }
    }
}
