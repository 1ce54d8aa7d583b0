/*!
Test support helpers shared across integration tests.

- RecordingIndexer / FailingIndexer: RepoIndexer doubles that never run createrepo_c
- docker_ctx / podman_ctx helpers: fixed runtime and host identity (x86_64, uid 1000)
- write_fake_runtime(dir, banner, code): executable shell script standing in for docker/podman
- expect_pair / count_flag: argv assertions
*/

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use xcp_ng_dev::{BuildEnvError, ContainerRuntime, HostIdentity, RepoIndexer, RuntimeKind};

/// Records every directory it is asked to index.
#[derive(Default)]
pub struct RecordingIndexer {
    pub calls: RefCell<Vec<PathBuf>>,
}

impl RepoIndexer for RecordingIndexer {
    fn index(&self, dir: &Path) -> Result<(), BuildEnvError> {
        self.calls.borrow_mut().push(dir.to_path_buf());
        Ok(())
    }
}

#[allow(dead_code)]
pub struct FailingIndexer;

impl RepoIndexer for FailingIndexer {
    fn index(&self, dir: &Path) -> Result<(), BuildEnvError> {
        Err(BuildEnvError::Indexing {
            path: dir.to_path_buf(),
            message: "createrepo_c exited with exit status: 1: no rpms".to_string(),
        })
    }
}

#[allow(dead_code)]
pub fn host(arch: &str) -> HostIdentity {
    HostIdentity {
        uid: 1000,
        gid: 1001,
        arch: arch.to_string(),
    }
}

#[allow(dead_code)]
pub fn docker() -> ContainerRuntime {
    ContainerRuntime::new("/usr/bin/docker", RuntimeKind::Docker)
}

#[allow(dead_code)]
pub fn podman() -> ContainerRuntime {
    ContainerRuntime::new("/usr/bin/podman", RuntimeKind::Podman)
}

/// True if `flag` is immediately followed by `value` somewhere in args.
#[allow(dead_code)]
pub fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
    args.windows(2).any(|w| w[0] == flag && w[1] == value)
}

#[allow(dead_code)]
pub fn expect_pair(args: &[String], flag: &str, value: &str) {
    assert!(
        has_pair(args, flag, value),
        "missing {flag} {value} in args: {args:?}"
    );
}

#[allow(dead_code)]
pub fn expect_no_pair(args: &[String], flag: &str, value: &str) {
    assert!(
        !has_pair(args, flag, value),
        "unexpected {flag} {value} in args: {args:?}"
    );
}

/// Number of values passed to `flag` that satisfy `pred`.
#[allow(dead_code)]
pub fn count_values(args: &[String], flag: &str, pred: impl Fn(&str) -> bool) -> usize {
    args.windows(2)
        .filter(|w| w[0] == flag && pred(&w[1]))
        .count()
}

#[allow(dead_code)]
pub fn canon(p: &Path) -> PathBuf {
    std::fs::canonicalize(p).expect("canonicalize")
}

/// Write an executable fake runtime: answers `--version` with `banner`, otherwise records its
/// argv (one per line) into `<dir>/invoked` and exits with `code`.
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_fake_runtime(dir: &Path, name: &str, banner: &str, code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let marker = dir.join("invoked");
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo \"{banner}\"; exit 0; fi\nfor a in \"$@\"; do printf '%s\\n' \"$a\"; done > \"{}\"\nexit {code}\n",
        marker.display()
    );
    let path = dir.join(name);
    std::fs::write(&path, script).expect("write fake runtime");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}
