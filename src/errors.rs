//! Error mapping guide:
//! - Map io::ErrorKind::NotFound and a missing runtime/client binary to exit code 127.
//! - Precondition and indexing failures exit with 1.
//! - Usage errors are reported by clap itself (exit code 2) and never reach this module.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

#[derive(Debug, Error)]
pub enum BuildEnvError {
    #[error("cannot find a supported container runtime: {0}")]
    RuntimeNotFound(String),

    #[error("{what} {} is not a directory", path.display())]
    NotADirectory { what: &'static str, path: PathBuf },

    #[error("--rpmbuild-stage={stage} not in '{allowed}'")]
    InvalidStage { stage: String, allowed: &'static str },

    #[error("cannot determine a default platform for machine '{arch}'; use --platform")]
    UnresolvedPlatform { arch: String },

    #[error("invalid --local-repo '{0}': empty path")]
    InvalidLocalRepo(String),

    #[error("invalid --local-repo name '{0}': must not contain a path separator")]
    InvalidLocalRepoName(String),

    #[error("failed to index local repository {}: {message}", path.display())]
    Indexing { path: PathBuf, message: String },

    #[error("cannot find the koji client '{0}' in PATH")]
    KojiNotFound(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BuildEnvError {
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildEnvError::RuntimeNotFound(_) | BuildEnvError::KojiNotFound(_) => 127,
            BuildEnvError::Io(e) => exit_code_for_io_error(e),
            _ => 1,
        }
    }
}
