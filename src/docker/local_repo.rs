#![allow(clippy::module_name_repetitions)]
//! Local package repositories: index a host directory, describe it to yum/dnf and mount both.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;

use crate::docker::env::push_volume;
use crate::docker::mounts::{bind, bind_ro, require_dir, LOCAL_REPOS_ROOT, YUM_REPOS_DIR};
use crate::errors::BuildEnvError;
use crate::util::{base_name, ExecRequest, ExecService};

pub const CREATEREPO_BIN: &str = "createrepo_c";

/// `[name:]path` as given to `--local-repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepoSpec {
    pub name: Option<String>,
    pub path: PathBuf,
}

impl FromStr for LocalRepoSpec {
    type Err = BuildEnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = match s.split_once(':') {
            Some((n, p)) => (Some(n.trim()).filter(|n| !n.is_empty()), p),
            None => (None, s),
        };
        if path.trim().is_empty() {
            return Err(BuildEnvError::InvalidLocalRepo(s.to_string()));
        }
        // The name becomes a file name inside the repository directory.
        if let Some(n) = name {
            if n.contains(['/', '\\']) || n == "." || n == ".." {
                return Err(BuildEnvError::InvalidLocalRepoName(n.to_string()));
            }
        }
        Ok(Self {
            name: name.map(str::to_string),
            path: PathBuf::from(path),
        })
    }
}

/// Builds repository metadata for a directory of RPMs in place.
pub trait RepoIndexer {
    fn index(&self, dir: &Path) -> Result<(), BuildEnvError>;
}

#[derive(Debug, Clone)]
pub struct CreaterepoIndexer {
    program: String,
    exec: ExecService,
}

impl Default for CreaterepoIndexer {
    fn default() -> Self {
        Self {
            program: CREATEREPO_BIN.to_string(),
            exec: ExecService::new(Duration::ZERO),
        }
    }
}

impl CreaterepoIndexer {
    #[cfg(test)]
    fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }
}

impl RepoIndexer for CreaterepoIndexer {
    fn index(&self, dir: &Path) -> Result<(), BuildEnvError> {
        tracing::info!(dir = %dir.display(), "indexing local repository");
        let out = self
            .exec
            .run(
                ExecRequest::new(&self.program)
                    .args(["--update", "--quiet"])
                    .arg(dir)
                    .capture_output(true),
            )
            .map_err(|e| BuildEnvError::Indexing {
                path: dir.to_path_buf(),
                message: format!("{e:#}"),
            })?;
        if !out.status.success() {
            let detail = out.stderr.trim();
            return Err(BuildEnvError::Indexing {
                path: dir.to_path_buf(),
                message: if detail.is_empty() {
                    format!("{} exited with {}", self.program, out.status)
                } else {
                    format!("{} exited with {}: {}", self.program, out.status, detail)
                },
            });
        }
        Ok(())
    }
}

/// File name of the repository definition written inside the repository directory.
pub fn repo_file_name(name: &str) -> String {
    format!("{name}.repo")
}

/// Repository definition: no signature checks, preferred over upstream repositories.
pub fn repo_definition(name: &str) -> Ini {
    let mut conf = Ini::new();
    conf.with_section(Some(name))
        .set("name", name)
        .set("baseurl", format!("file://{LOCAL_REPOS_ROOT}/{name}"))
        .set("enabled", "1")
        .set("gpgcheck", "0")
        .set("repo_gpgcheck", "0")
        .set("priority", "1");
    conf
}

/// Index the directory, write its definition file and append both mounts.
///
/// The definition mount stays writable: enabling/disabling repositories inside the
/// container rewrites it.
pub fn materialize_local_repo(
    spec: &LocalRepoSpec,
    indexer: &dyn RepoIndexer,
    args: &mut Vec<String>,
) -> Result<(), BuildEnvError> {
    let dir = require_dir(&spec.path, "local repository")?;
    let name = spec.name.clone().unwrap_or_else(|| base_name(&dir));
    if name.is_empty() {
        return Err(BuildEnvError::InvalidLocalRepo(spec.path.display().to_string()));
    }

    indexer.index(&dir)?;

    let file_name = repo_file_name(&name);
    let repo_file = dir.join(&file_name);
    repo_definition(&name).write_to_file(&repo_file)?;
    tracing::debug!(repo = %name, file = %repo_file.display(), "wrote repository definition");

    push_volume(args, bind_ro(&dir, &format!("{LOCAL_REPOS_ROOT}/{name}")));
    push_volume(args, bind(&repo_file, &format!("{YUM_REPOS_DIR}/{file_name}")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_and_unnamed() {
        let s: LocalRepoSpec = "foo:/tmp/r".parse().unwrap();
        assert_eq!(s.name.as_deref(), Some("foo"));
        assert_eq!(s.path, PathBuf::from("/tmp/r"));

        let s: LocalRepoSpec = "/srv/rpms".parse().unwrap();
        assert_eq!(s.name, None);
        assert_eq!(s.path, PathBuf::from("/srv/rpms"));

        let s: LocalRepoSpec = ":/srv/rpms".parse().unwrap();
        assert_eq!(s.name, None);
    }

    #[test]
    fn test_parse_rejects_empty_path() {
        assert!("foo:".parse::<LocalRepoSpec>().is_err());
        assert!("".parse::<LocalRepoSpec>().is_err());
        assert!(matches!(
            "../x:/srv/r".parse::<LocalRepoSpec>(),
            Err(BuildEnvError::InvalidLocalRepoName(_))
        ));
        assert!("a/b:/srv/r".parse::<LocalRepoSpec>().is_err());
        assert!("..:/srv/r".parse::<LocalRepoSpec>().is_err());
    }

    #[cfg(unix)]
    fn fake_createrepo(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let bin = dir.join("createrepo_c");
        std::fs::write(&bin, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
        bin
    }

    #[cfg(unix)]
    #[test]
    fn test_createrepo_failure_carries_stderr() {
        let td = tempfile::tempdir().expect("tmpdir");
        let bin = fake_createrepo(td.path(), "echo 'no rpms found' >&2; exit 1");
        let err = CreaterepoIndexer::with_program(bin.display().to_string())
            .index(td.path())
            .unwrap_err();
        match &err {
            BuildEnvError::Indexing { path, message } => {
                assert_eq!(path, td.path());
                assert!(message.contains("exited with"), "{message}");
                assert!(message.ends_with(": no rpms found"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.exit_code(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_createrepo_silent_failure_reports_status() {
        let td = tempfile::tempdir().expect("tmpdir");
        let bin = fake_createrepo(td.path(), "exit 1");
        let err = CreaterepoIndexer::with_program(bin.display().to_string())
            .index(td.path())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("createrepo_c exited with"), "{msg}");
        assert!(!msg.ends_with(": "), "{msg}");
    }

    #[cfg(unix)]
    #[test]
    fn test_createrepo_success_passes_update_flag() {
        let td = tempfile::tempdir().expect("tmpdir");
        let marker = td.path().join("args");
        let bin = fake_createrepo(
            td.path(),
            &format!("printf '%s\\n' \"$@\" > '{}'", marker.display()),
        );
        CreaterepoIndexer::with_program(bin.display().to_string())
            .index(td.path())
            .expect("index");
        let recorded = std::fs::read_to_string(&marker).expect("args");
        let lines: Vec<&str> = recorded.lines().collect();
        assert_eq!(lines[0], "--update");
        assert_eq!(lines.last().copied(), Some(td.path().to_str().unwrap()));
    }

    #[test]
    fn test_definition_contents() {
        let mut buf = Vec::new();
        repo_definition("foo").write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("[foo]"), "{text}");
        assert!(text.contains("baseurl=file:///home/builder/local-repos/foo"), "{text}");
        assert!(text.contains("gpgcheck=0"), "{text}");
        assert!(text.contains("priority=1"), "{text}");
        assert!(text.contains("enabled=1"), "{text}");
    }
}
