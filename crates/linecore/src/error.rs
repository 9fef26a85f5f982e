use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Step of a session during which an OS-level I/O error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Mirror,
    Index,
    Read,
    Checksum,
    Filter,
    Permissions,
    Replace,
    Cleanup,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Mirror => "mirror",
            Phase::Index => "index",
            Phase::Read => "read",
            Phase::Checksum => "checksum",
            Phase::Filter => "filter",
            Phase::Permissions => "permissions",
            Phase::Replace => "replace",
            Phase::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("file is not valid UTF-8 (line {line})")]
    InvalidEncoding { line: u32 },

    #[error("invalid line range: start={start}, end={end}")]
    InvalidRange { start: u32, end: u32 },

    #[error("selected index out of bounds: selected={selected}, window_start={window_start}, max_index={max_index}")]
    OutOfBounds {
        selected: usize,
        window_start: usize,
        max_index: usize,
    },

    #[error("file changed on disk and the overwrite was declined; marked lines are recoverable from {}", mirror.display())]
    AbortedDueToExternalModification { mirror: PathBuf },

    #[error("{phase} failed: {source}")]
    Io {
        phase: Phase,
        #[source]
        source: std::io::Error,
    },

    #[error("file has no lines")]
    EmptyFile,

    #[error("file exceeds the 4 GiB line index limit")]
    FileTooLarge,

    #[error("command not allowed: {0}")]
    InvalidState(String),
}

impl CoreError {
    pub(crate) fn io(phase: Phase) -> impl FnOnce(std::io::Error) -> CoreError {
        move |source| CoreError::Io { phase, source }
    }

    /// Errors that only concern one file; batch callers skip the file and move on.
    pub fn is_skippable(&self) -> bool {
        matches!(self, CoreError::InvalidEncoding { .. } | CoreError::EmptyFile)
    }
}
