//! Error type shared by discovery, the transformers, the loader and the driver.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while extracting, transforming or loading a file.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Malformed record in {}{}: {reason}", path.display(), LineSuffix(*line))]
    MalformedRecord {
        path: PathBuf,
        /// 1-based line number, for newline-delimited inputs.
        line: Option<usize>,
        reason: String,
    },

    #[error("Statement error: {0}")]
    Statement(#[from] rusqlite::Error),

    #[error("File system error on {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EtlError {
    pub fn malformed(path: &Path, line: Option<usize>, reason: impl Into<String>) -> Self {
        EtlError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    pub fn file_system(path: &Path, source: std::io::Error) -> Self {
        EtlError::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_malformed_record(&self) -> bool {
        matches!(self, EtlError::MalformedRecord { .. })
    }
}

struct LineSuffix(Option<usize>);

impl fmt::Display for LineSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, " (line {})", line),
            None => Ok(()),
        }
    }
}
