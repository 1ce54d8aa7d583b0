//! Process environment read once at startup and threaded explicitly afterwards.

use std::env;

/// Names the container runtime binary, bypassing auto-detection.
pub const RUNNER_ENV: &str = "XCPNG_OCI_RUNNER";
/// Log filter for the tracing subscriber; falls back to `RUST_LOG`.
pub const LOG_ENV: &str = "XCPNG_DEV_LOG";

/// Registry prefix of the build environment images.
pub const CONTAINER_PREFIX: &str = "ghcr.io/xcp-ng/xcp-ng-build-env";
/// Entrypoint script baked into the images.
pub const CONTAINER_ENTRYPOINT: &str = "/usr/local/bin/init-container.sh";
/// Runtimes tried in order when no override is set.
pub const SUPPORTED_RUNNERS: [&str; 2] = ["docker", "podman"];
pub const DEFAULT_ULIMIT_NOFILE: u32 = 2048;
/// Valid X values in `rpmbuild -bX`.
pub const RPMBUILD_STAGES: &str = "abpfcilsrd";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub runner_override: Option<String>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build from an arbitrary lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            runner_override: non_empty(RUNNER_ENV),
            log_filter: non_empty(LOG_ENV).or_else(|| non_empty("RUST_LOG")),
        }
    }
}
