//! Error types for the file catalogue

use gserver_core::GServerError;

#[derive(Debug, thiserror::Error)]
pub enum FilesystemError {
    #[error("file not found in catalogue: {0}")]
    NotFound(String),

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<FilesystemError> for GServerError {
    fn from(err: FilesystemError) -> Self {
        match err {
            FilesystemError::NotFound(name) => GServerError::NotFound(name),
            FilesystemError::Io { path, source } => {
                GServerError::Io(std::io::Error::new(source.kind(), format!("{path}: {source}")))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FilesystemError>;
