//! Subcommand drivers: glue between parsed options, detection, synthesis and the process invoker.

use std::process::ExitCode;

use crate::config::EnvConfig;
use crate::docker::{
    build_run_args, container_runtime, CreaterepoIndexer, HostIdentity, RunContext,
    RunInvocation,
};
use crate::errors::BuildEnvError;
use crate::options::ContainerOptions;
use crate::util::{ExecRequest, ExecService};

/// Global flags that change how an invocation is reported or executed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    pub verbose: bool,
    pub dry_run: bool,
}

/// Spawn the runtime with inherited stdio and wait; the child's code becomes ours.
pub fn invoke(invocation: RunInvocation) -> Result<i32, BuildEnvError> {
    let request = ExecRequest::new(&invocation.program).args(&invocation.args);
    let status = ExecService::interactive().status(&request)?;
    match status.code() {
        Some(code) => Ok(code),
        None => {
            tracing::warn!(%status, "container runtime terminated by a signal");
            Ok(1)
        }
    }
}

pub fn run_container_with(
    opts: &ContainerOptions,
    ctx: &RunContext<'_>,
    flags: RunFlags,
) -> Result<i32, BuildEnvError> {
    let invocation = build_run_args(opts, ctx)?;
    crate::warn_print_all(invocation.warnings.as_slice());

    let preview = invocation.preview();
    tracing::info!(action = opts.action.name(), "launching {}", preview);
    if flags.verbose || flags.dry_run {
        eprintln!("xcp-ng-dev: {}: {}", ctx.runtime.kind.as_str(), preview);
    }
    if flags.dry_run {
        crate::log_info_stderr(
            crate::color_enabled_stderr(),
            "xcp-ng-dev: dry-run requested; not executing the container runtime.",
        );
        return Ok(0);
    }
    invoke(invocation)
}

pub fn run_container(opts: &ContainerOptions, cfg: &EnvConfig, flags: RunFlags) -> ExitCode {
    let result = container_runtime(cfg).and_then(|runtime| {
        let host = HostIdentity::current();
        let indexer = CreaterepoIndexer::default();
        let ctx = RunContext {
            runtime,
            host: &host,
            indexer: &indexer,
        };
        run_container_with(opts, &ctx, flags)
    });
    finish(result)
}

pub fn run_koji_build(args: &[String], flags: RunFlags) -> ExitCode {
    finish(crate::koji::koji_build(args, flags.dry_run))
}

fn finish(result: Result<i32, BuildEnvError>) -> ExitCode {
    match result {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            let use_err = crate::color_enabled_stderr();
            crate::log_error_stderr(use_err, &format!("xcp-ng-dev: {e}"));
            ExitCode::from(e.exit_code())
        }
    }
}
