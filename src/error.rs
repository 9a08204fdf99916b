use crate::map::{GridPos, StationId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No station at grid position ({}, {})", .0.x, .0.y)]
    UnknownCoordinate(GridPos),

    #[error("Unknown station id {0}")]
    UnknownStation(StationId),

    #[error("Unknown line '{0}'")]
    UnknownLine(String),

    #[error("Line label '{0}' is used by more than one line")]
    DuplicateLine(String),

    #[error("Invalid map data: {message}")]
    InvalidInput { message: String },

    #[error("Failed to parse map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Invalid style: {message}")]
    Style { message: String },

    #[error("Render error: {message}")]
    Render { message: String },
}
