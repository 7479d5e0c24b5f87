use std::path::PathBuf;

/// Errors raised while building, writing or reading a valve model.
#[derive(Debug, thiserror::Error)]
pub enum ValveError {
    #[error("Input error: unknown severity '{0}' (expected healthy, mild, moderate or severe)")]
    UnknownSeverity(String),

    #[error("Input error: resolution must be at least 2 points per leaflet, got {0}")]
    InvalidResolution(usize),

    #[error("Geometry error: {0}")]
    InvalidGeometry(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {} line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Geometry error: cannot compute properties of an empty point set")]
    EmptyGeometry,
}

impl ValveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ValveError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValveError>;
