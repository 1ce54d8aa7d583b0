//! Host-side launcher for the XCP-ng RPM build environment.
//!
//! The crate turns a parsed `container` request into a `docker run`/`podman run`
//! invocation: identity mapping for the detected runtime, host mounts, the environment
//! contract of the in-container entrypoint, ulimits, network and platform selection.
//!
//! Runtime detection ([`detect_runtime`]) and synthesis ([`build_run_args`]) are kept
//! separate so the synthesizer can be exercised with any [`ContainerRuntime`],
//! [`HostIdentity`] and [`RepoIndexer`].

pub mod cli;
mod color;
pub mod commands;
pub mod config;
pub mod docker;
pub mod errors;
pub mod koji;
pub mod options;
pub mod telemetry;
pub mod util;

pub mod ui {
    pub mod warn;
}

pub use color::*;
pub use config::EnvConfig;
pub use docker::{
    build_run_args, classify_runtime, container_runtime_path, default_platform, detect_runtime,
    image_reference, materialize_local_repo, resolve_platform, CommandVersionProbe,
    ContainerRuntime, CreaterepoIndexer, HostIdentity, LocalRepoSpec, RepoIndexer, RunContext,
    RunInvocation, RuntimeKind, VersionProbe,
};
pub use errors::BuildEnvError;
pub use options::{Action, ContainerOptions};
pub use ui::warn::{warn_print, warn_print_all};
pub use util::{shell_escape, shell_join};
