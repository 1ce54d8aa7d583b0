#![allow(clippy::module_name_repetitions)]
//! Container runtime detection and `run` command construction.

pub(crate) mod env;
pub mod local_repo;
pub(crate) mod mounts;
pub mod platform;
pub mod run;
pub mod runtime;

pub use local_repo::{materialize_local_repo, CreaterepoIndexer, LocalRepoSpec, RepoIndexer};
pub use platform::{default_platform, resolve_platform};
pub use run::{build_run_args, image_reference, HostIdentity, RunContext, RunInvocation};
pub use runtime::{
    classify_runtime, container_runtime, container_runtime_path, detect_runtime,
    CommandVersionProbe, ContainerRuntime, RuntimeKind, VersionProbe,
};
