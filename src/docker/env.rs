#![allow(clippy::module_name_repetitions)]
//! Runtime `-e`/`-v`/flag argument helpers and the environment contract with the container entrypoint.

pub(crate) const ENV_NO_EXIT: &str = "NO_EXIT";
pub(crate) const ENV_BUILD_LOCAL: &str = "BUILD_LOCAL";
pub(crate) const ENV_BUILD_DEPS: &str = "BUILD_DEPS";
pub(crate) const ENV_RPMBUILD_DEFINE: &str = "RPMBUILD_DEFINE";
pub(crate) const ENV_RPMBUILD_OPTS: &str = "RPMBUILD_OPTS";
pub(crate) const ENV_RPMBUILD_STAGE: &str = "RPMBUILD_STAGE";
pub(crate) const ENV_ENABLEREPO: &str = "ENABLEREPO";
pub(crate) const ENV_DISABLEREPO: &str = "DISABLEREPO";
pub(crate) const ENV_INSTALL: &str = "INSTALL";
pub(crate) const ENV_NO_UPDATE: &str = "NO_UPDATE";
pub(crate) const ENV_CCACHE_DIR: &str = "CCACHE_DIR";
pub(crate) const ENV_PATH_PREPEND: &str = "PATH_PREPEND";
pub(crate) const ENV_BUILDER_UID: &str = "BUILDER_UID";
pub(crate) const ENV_BUILDER_GID: &str = "BUILDER_GID";
pub(crate) const ENV_SCRIPT_DEBUG: &str = "SCRIPT_DEBUG";
pub(crate) const ENV_FAIL_ON_ERROR: &str = "FAIL_ON_ERROR";
pub(crate) const ENV_COMMAND: &str = "COMMAND";

pub(crate) fn push_env_kv(args: &mut Vec<String>, key: &str, val: &str) {
    args.push("-e".to_string());
    args.push(format!("{key}={val}"));
}

/// Pass a user-supplied `KEY=VALUE` (or bare `KEY`) through untouched.
pub(crate) fn push_env_raw(args: &mut Vec<String>, assignment: &str) {
    args.push("-e".to_string());
    args.push(assignment.to_string());
}

pub(crate) fn push_env_flag(args: &mut Vec<String>, key: &str, enabled: bool) {
    if enabled {
        push_env_kv(args, key, "1");
    }
}

/// `KEY=a,b,c` when the list is non-empty.
pub(crate) fn push_env_list(args: &mut Vec<String>, key: &str, items: &[String], sep: &str) {
    if !items.is_empty() {
        push_env_kv(args, key, &items.join(sep));
    }
}

pub(crate) fn push_volume(args: &mut Vec<String>, spec: impl Into<String>) {
    args.push("-v".to_string());
    args.push(spec.into());
}

pub(crate) fn push_opt(args: &mut Vec<String>, flag: &str, val: impl Into<String>) {
    args.push(flag.to_string());
    args.push(val.into());
}
