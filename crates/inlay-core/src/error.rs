use std::path::PathBuf;
use thiserror::Error;

/// Core error type for inlay operations.
///
/// Every variant is fatal to the enclosing pass: a failed import fails the
/// whole compilation, with no partial output.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot resolve import \"{target}\" from {}", basedir.display())]
    UnresolvableImport {
        target: String,
        basedir: PathBuf,
        /// Candidate paths probed before giving up (capped).
        tried: Vec<PathBuf>,
    },

    #[error("parse error in {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: u32,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
