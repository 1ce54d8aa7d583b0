#![allow(clippy::module_name_repetitions)]
//! Runtime `run` argument synthesis and preview rendering.

use std::path::PathBuf;

#[cfg(unix)]
use nix::sys::utsname::uname;
#[cfg(unix)]
use nix::unistd::{getgid, getuid};

use crate::config::{
    CONTAINER_ENTRYPOINT, CONTAINER_PREFIX, DEFAULT_ULIMIT_NOFILE, RPMBUILD_STAGES,
};
use crate::docker::env::*;
use crate::docker::local_repo::{materialize_local_repo, RepoIndexer};
use crate::docker::mounts::{
    bind, ensure_dir, external_target, require_dir, CCACHE_PATH_PREPEND, CCACHE_TARGET,
    DEPS_TARGET, OUTPUT_TARGET, RPMBUILD_TARGET, SYSLOG_SOCKET,
};
use crate::docker::platform::resolve_platform;
use crate::docker::runtime::{ContainerRuntime, RuntimeKind};
use crate::errors::BuildEnvError;
use crate::options::{Action, ContainerOptions};

/// Host facts the invocation depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub uid: u32,
    pub gid: u32,
    pub arch: String,
}

impl HostIdentity {
    #[cfg(unix)]
    pub fn current() -> Self {
        Self {
            uid: u32::from(getuid()),
            gid: u32::from(getgid()),
            arch: machine_arch(),
        }
    }

    #[cfg(not(unix))]
    pub fn current() -> Self {
        Self {
            uid: 1000,
            gid: 1000,
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Machine hardware name of the running kernel, which differs from the compile target
/// under emulation.
#[cfg(unix)]
fn machine_arch() -> String {
    match uname() {
        Ok(info) => info.machine().to_string_lossy().into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "uname failed; using the compile-time architecture");
            std::env::consts::ARCH.to_string()
        }
    }
}

/// Everything besides the options that the synthesizer needs, passed explicitly.
pub struct RunContext<'a> {
    pub runtime: &'a ContainerRuntime,
    pub host: &'a HostIdentity,
    pub indexer: &'a dyn RepoIndexer,
}

/// Fully synthesized runtime invocation, consumed once by the process invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunInvocation {
    /// Shell-escaped single line, for --verbose and --dry-run.
    pub fn preview(&self) -> String {
        let mut words = vec![self.program.display().to_string()];
        words.extend(self.args.iter().cloned());
        crate::util::shell_join(&words)
    }
}

pub fn image_reference(opts: &ContainerOptions) -> String {
    let mut image = format!("{}:{}", CONTAINER_PREFIX, opts.container_version);
    if opts.bootstrap {
        image.push_str("-bootstrap");
    }
    if opts.isarpm {
        image.push_str("-isarpm");
    }
    image
}

fn collect_identity_flags(args: &mut Vec<String>, kind: RuntimeKind, host: &HostIdentity) {
    match kind {
        RuntimeKind::Podman => {
            args.push("--userns=keep-id".to_string());
            push_opt(args, "--security-opt", "label=disable");
        }
        RuntimeKind::Docker => {
            // The entrypoint re-creates the builder user with these ids before dropping privileges.
            push_env_kv(args, ENV_BUILDER_UID, &host.uid.to_string());
            push_env_kv(args, ENV_BUILDER_GID, &host.gid.to_string());
        }
    }
}

fn collect_ulimit_flags(args: &mut Vec<String>, ulimits: &[String]) {
    let last_nofile = ulimits.iter().rposition(|u| u.starts_with("nofile="));
    for (i, ulimit) in ulimits.iter().enumerate() {
        if ulimit.starts_with("nofile=") && Some(i) != last_nofile {
            tracing::debug!(%ulimit, "dropping overridden nofile ulimit");
            continue;
        }
        push_opt(args, "--ulimit", ulimit.as_str());
    }
    if last_nofile.is_none() {
        push_opt(args, "--ulimit", format!("nofile={DEFAULT_ULIMIT_NOFILE}"));
    }
}

fn network_warnings(opts: &ContainerOptions) -> Vec<String> {
    let mut warnings = Vec::new();
    if !opts.no_network {
        return warnings;
    }
    if !opts.no_update {
        warnings.push(
            "--no-network is set without --no-update: the package update on container startup will fail."
                .to_string(),
        );
    }
    if opts.local_repos.is_empty() {
        warnings.push(
            "--no-network is set without any --local-repo: the container has no package source."
                .to_string(),
        );
    }
    warnings
}

fn validate_stage(stage: &str) -> Result<(), BuildEnvError> {
    let mut chars = stage.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if RPMBUILD_STAGES.contains(c) => Ok(()),
        _ => Err(BuildEnvError::InvalidStage {
            stage: stage.to_string(),
            allowed: RPMBUILD_STAGES,
        }),
    }
}

fn collect_action_flags(args: &mut Vec<String>, action: &Action) -> Result<(), BuildEnvError> {
    match action {
        Action::Build {
            source_dir,
            output_dir,
            define,
            rpmbuild_opts,
            rpmbuild_stage,
        } => {
            let src = require_dir(source_dir, "source directory")?;
            push_volume(args, bind(&src, RPMBUILD_TARGET));
            push_env_flag(args, ENV_BUILD_LOCAL, true);
            if let Some(out) = output_dir {
                let out = ensure_dir(out, "output directory")?;
                push_volume(args, bind(&out, OUTPUT_TARGET));
            }
            if let Some(def) = define {
                push_env_kv(args, ENV_RPMBUILD_DEFINE, def);
            }
            push_env_list(args, ENV_RPMBUILD_OPTS, rpmbuild_opts, " ");
            if let Some(stage) = rpmbuild_stage {
                push_env_kv(args, ENV_RPMBUILD_STAGE, stage);
            }
        }
        Action::Builddep {
            source_dir,
            deps_dir,
        } => {
            let src = require_dir(source_dir, "source directory")?;
            push_volume(args, bind(&src, RPMBUILD_TARGET));
            push_env_flag(args, ENV_BUILD_DEPS, true);
            let deps = ensure_dir(deps_dir, "dependency directory")?;
            push_volume(args, bind(&deps, DEPS_TARGET));
        }
        Action::Run { command } => {
            if !command.is_empty() {
                push_env_kv(args, ENV_COMMAND, &command.join(" "));
            }
        }
        Action::Shell => {}
    }
    Ok(())
}

/// Build the ordered `run` argument list for the runtime.
///
/// Later steps only append. The only side effects are directory checks/creation and the
/// local repository materialization.
pub fn build_run_args(
    opts: &ContainerOptions,
    ctx: &RunContext<'_>,
) -> Result<RunInvocation, BuildEnvError> {
    if let Action::Build {
        rpmbuild_stage: Some(ref stage),
        ..
    } = opts.action
    {
        validate_stage(stage)?;
    }

    let mut args: Vec<String> = vec!["run".to_string()];

    collect_identity_flags(&mut args, ctx.runtime.kind, ctx.host);

    for dir in &opts.dirs {
        let host = require_dir(dir, "local directory")?;
        push_volume(&mut args, bind(&host, &external_target(&host)));
    }
    for volume in &opts.volumes {
        push_volume(&mut args, volume.as_str());
    }

    for env in &opts.envs {
        push_env_raw(&mut args, env);
    }

    if let Some(ref ccache) = opts.ccache {
        let host = ensure_dir(ccache, "ccache directory")?;
        push_volume(&mut args, bind(&host, CCACHE_TARGET));
        push_env_kv(&mut args, ENV_CCACHE_DIR, CCACHE_TARGET);
        push_env_kv(&mut args, ENV_PATH_PREPEND, CCACHE_PATH_PREPEND);
    }

    push_env_list(&mut args, ENV_ENABLEREPO, &opts.enablerepo, ",");
    push_env_list(&mut args, ENV_DISABLEREPO, &opts.disablerepo, ",");

    push_env_list(&mut args, ENV_INSTALL, &opts.install, " ");
    push_env_flag(&mut args, ENV_NO_UPDATE, opts.no_update);
    if opts.no_network {
        push_opt(&mut args, "--network", "none");
    }
    if !opts.no_rm {
        args.push("--rm".to_string());
    }
    if opts.syslog {
        push_volume(&mut args, format!("{SYSLOG_SOCKET}:{SYSLOG_SOCKET}"));
    }
    if let Some(ref name) = opts.name {
        push_opt(&mut args, "--name", name.as_str());
    }
    collect_ulimit_flags(&mut args, &opts.ulimits);
    push_env_flag(&mut args, ENV_FAIL_ON_ERROR, opts.fail_on_error);

    let warnings = network_warnings(opts);

    let platform = resolve_platform(
        opts.platform.as_deref(),
        &ctx.host.arch,
        &opts.container_version,
    )?;
    push_opt(&mut args, "--platform", platform);

    push_env_flag(&mut args, ENV_SCRIPT_DEBUG, opts.debug);

    for spec in &opts.local_repos {
        materialize_local_repo(spec, ctx.indexer, &mut args)?;
    }

    collect_action_flags(&mut args, &opts.action)?;

    if opts.interactive() {
        args.push("-i".to_string());
        args.push("-t".to_string());
        push_env_flag(&mut args, ENV_NO_EXIT, true);
    }

    args.push(image_reference(opts));
    args.push(CONTAINER_ENTRYPOINT.to_string());

    tracing::debug!(
        action = opts.action.name(),
        runtime = ctx.runtime.kind.as_str(),
        nargs = args.len(),
        "synthesized runtime invocation"
    );

    Ok(RunInvocation {
        program: ctx.runtime.path.clone(),
        args,
        warnings,
    })
}
