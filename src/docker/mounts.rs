#![allow(clippy::module_name_repetitions)]
//! Host directory checks and in-container mount targets.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::BuildEnvError;

pub(crate) const EXTERNAL_ROOT: &str = "/external";
pub(crate) const RPMBUILD_TARGET: &str = "/home/builder/rpmbuild";
pub(crate) const OUTPUT_TARGET: &str = "/home/builder/output";
pub(crate) const DEPS_TARGET: &str = "/home/builder/deps";
pub(crate) const CCACHE_TARGET: &str = "/home/builder/ccache";
pub(crate) const CCACHE_PATH_PREPEND: &str = "/usr/lib64/ccache";
pub(crate) const LOCAL_REPOS_ROOT: &str = "/home/builder/local-repos";
pub(crate) const YUM_REPOS_DIR: &str = "/etc/yum.repos.d";
pub(crate) const SYSLOG_SOCKET: &str = "/dev/log";

/// Existing directory → canonical absolute path; anything else is a fatal precondition failure.
pub(crate) fn require_dir(path: &Path, what: &'static str) -> Result<PathBuf, BuildEnvError> {
    if !path.is_dir() {
        return Err(BuildEnvError::NotADirectory {
            what,
            path: path.to_path_buf(),
        });
    }
    Ok(fs::canonicalize(path)?)
}

/// Create the directory (and parents) when absent, then canonicalize it.
pub(crate) fn ensure_dir(path: &Path, what: &'static str) -> Result<PathBuf, BuildEnvError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), what, "creating directory");
        fs::create_dir_all(path)?;
    }
    require_dir(path, what)
}

pub(crate) fn bind(host: &Path, target: &str) -> String {
    format!("{}:{}", host.display(), target)
}

pub(crate) fn bind_ro(host: &Path, target: &str) -> String {
    format!("{}:{}:ro", host.display(), target)
}

pub(crate) fn external_target(host: &Path) -> String {
    format!("{}/{}", EXTERNAL_ROOT, crate::util::base_name(host))
}
