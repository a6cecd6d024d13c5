//! Error taxonomy for an extraction run and its mapping to process exit codes.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes reported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralFailure = 1,
    InvalidFile = 2,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Errors that can stop an extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Provided target file path {} is invalid", .0.display())]
    InvalidFile(PathBuf),

    #[error("Failed to read target file {}", path.display())]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Deserialized target file {} resulted in a null or invalid object. Please make sure your .target file is valid",
        path.display()
    )]
    ParseManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Target file entry #{index} has an empty path")]
    EmptyEntryPath { index: usize },

    #[error("Engine path {} does not exist", .0.display())]
    EngineRootMissing(PathBuf),

    #[error("Unable to create a symlink on Windows unless running as Admin")]
    InsufficientPrivilege,

    #[error("Failed to resolve absolute path for {}", path.display())]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory {}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}", from.display(), to.display())]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to walk localization content under {}", root.display())]
    WalkLocalization {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to create symlink {} -> {}", link.display(), target.display())]
    CreateSymlink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExtractError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ExtractError::InvalidFile(_) => ExitCode::InvalidFile,
            _ => ExitCode::GeneralFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
