//! Error taxonomy for the redaction engine

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type Source = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// Scale factors must be positive and finite
    #[error("invalid scale factor {0}")]
    InvalidScale(f32),

    /// No store file at the given path; callers that can start from
    /// scratch treat this as an empty store
    #[error("no region store at {0}")]
    StoreMissing(PathBuf),

    /// The store file exists but is not well-formed; never auto-repaired
    #[error("region store at {path} is corrupt: {source}")]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported file type: {0}")]
    UnsupportedFile(PathBuf),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Source,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: Source,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn decode(path: impl Into<PathBuf>, source: impl Into<Source>) -> Self {
        Error::Decode {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn encode(path: impl Into<PathBuf>, source: impl Into<Source>) -> Self {
        Error::Encode {
            path: path.into(),
            source: source.into(),
        }
    }
}
