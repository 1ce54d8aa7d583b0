//! `koji build`: hand the request over to the koji command-line client.

use std::path::PathBuf;

use which::which;

use crate::errors::BuildEnvError;
use crate::util::{ExecRequest, ExecService};

pub const KOJI_CLIENT: &str = "koji";

pub fn koji_client_path() -> Result<PathBuf, BuildEnvError> {
    which(KOJI_CLIENT).map_err(|_| BuildEnvError::KojiNotFound(KOJI_CLIENT.to_string()))
}

fn koji_build_request(client: &std::path::Path, args: &[String]) -> ExecRequest {
    ExecRequest::new(client).arg("build").args(args)
}

/// Run `koji build ARGS...` with inherited stdio and return its exit code.
pub fn koji_build(args: &[String], dry_run: bool) -> Result<i32, BuildEnvError> {
    let client = koji_client_path()?;
    tracing::info!(client = %client.display(), ?args, "dispatching koji build");
    if dry_run {
        let mut words = vec![client.display().to_string(), "build".to_string()];
        words.extend(args.iter().cloned());
        eprintln!("xcp-ng-dev: koji: {}", crate::util::shell_join(&words));
        return Ok(0);
    }
    let status = ExecService::interactive().status(&koji_build_request(&client, args))?;
    Ok(status.code().unwrap_or(1))
}
