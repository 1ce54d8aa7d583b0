#![allow(clippy::module_name_repetitions)]
//! Container runtime discovery and docker/podman classification.

use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::OnceCell;
use which::which;

use crate::config::{EnvConfig, SUPPORTED_RUNNERS};
use crate::errors::BuildEnvError;
use crate::util::{ExecRequest, ExecService};

/// Which of the two mutually incompatible flag strategies the runtime needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    Docker,
    Podman,
}

impl RuntimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Docker => "docker",
            RuntimeKind::Podman => "podman",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRuntime {
    pub path: PathBuf,
    pub kind: RuntimeKind,
}

impl ContainerRuntime {
    pub fn new(path: impl Into<PathBuf>, kind: RuntimeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Reports the `--version` banner of a runtime binary.
pub trait VersionProbe {
    fn version(&self, runtime: &Path) -> Option<String>;
}

/// Runs `<runtime> --version` as a subprocess.
#[derive(Debug, Clone)]
pub struct CommandVersionProbe {
    exec: ExecService,
}

impl Default for CommandVersionProbe {
    fn default() -> Self {
        Self {
            exec: ExecService::new(Duration::from_secs(10)),
        }
    }
}

impl VersionProbe for CommandVersionProbe {
    fn version(&self, runtime: &Path) -> Option<String> {
        match self.exec.run(
            ExecRequest::new(runtime)
                .arg("--version")
                .capture_output(true),
        ) {
            Ok(out) => Some(out.stdout),
            Err(e) => {
                tracing::debug!(runtime = %runtime.display(), error = %e, "version probe failed");
                None
            }
        }
    }
}

pub fn classify_runtime(path: &Path, probe: &dyn VersionProbe) -> RuntimeKind {
    if path.file_name().and_then(|s| s.to_str()) == Some("podman") {
        return RuntimeKind::Podman;
    }
    match probe.version(path) {
        Some(v) if v.starts_with("podman ") => RuntimeKind::Podman,
        _ => RuntimeKind::Docker,
    }
}

/// Resolve the runtime binary: explicit override first, then the supported runners in order.
pub fn container_runtime_path(cfg: &EnvConfig) -> Result<PathBuf, BuildEnvError> {
    if let Some(ref name) = cfg.runner_override {
        return which(name).map_err(|e| {
            BuildEnvError::RuntimeNotFound(format!(
                "{} ({}={})",
                e,
                crate::config::RUNNER_ENV,
                name
            ))
        });
    }
    for candidate in SUPPORTED_RUNNERS {
        if let Ok(p) = which(candidate) {
            return Ok(p);
        }
    }
    Err(BuildEnvError::RuntimeNotFound(SUPPORTED_RUNNERS.join(" ")))
}

pub fn detect_runtime(
    cfg: &EnvConfig,
    probe: &dyn VersionProbe,
) -> Result<ContainerRuntime, BuildEnvError> {
    let path = container_runtime_path(cfg)?;
    let kind = classify_runtime(&path, probe);
    tracing::debug!(runtime = %path.display(), kind = kind.as_str(), "container runtime detected");
    Ok(ContainerRuntime { path, kind })
}

static RUNTIME: OnceCell<ContainerRuntime> = OnceCell::new();

/// Process-wide runtime, detected on first use and reused afterwards.
pub fn container_runtime(cfg: &EnvConfig) -> Result<&'static ContainerRuntime, BuildEnvError> {
    RUNTIME.get_or_try_init(|| detect_runtime(cfg, &CommandVersionProbe::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedProbe {
        banner: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl FixedProbe {
        fn new(banner: Option<&'static str>) -> Self {
            Self {
                banner,
                calls: Cell::new(0),
            }
        }
    }

    impl VersionProbe for FixedProbe {
        fn version(&self, _runtime: &Path) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            self.banner.map(str::to_string)
        }
    }

    #[test]
    fn test_podman_basename_skips_probe() {
        let probe = FixedProbe::new(Some("Docker version 24.0.7"));
        let kind = classify_runtime(Path::new("/usr/bin/podman"), &probe);
        assert_eq!(kind, RuntimeKind::Podman);
        assert_eq!(probe.calls.get(), 0);
    }

    #[test]
    fn test_docker_alias_reporting_podman_is_podman() {
        let probe = FixedProbe::new(Some("podman version 5.2.1\n"));
        assert_eq!(
            classify_runtime(Path::new("/usr/bin/docker"), &probe),
            RuntimeKind::Podman
        );
    }

    #[test]
    fn test_prefix_must_include_space() {
        let probe = FixedProbe::new(Some("podman-remote version 5"));
        assert_eq!(
            classify_runtime(Path::new("/usr/bin/docker"), &probe),
            RuntimeKind::Docker
        );
        let probe = FixedProbe::new(Some("Docker version 24.0.7, build afdd53b"));
        assert_eq!(
            classify_runtime(Path::new("/usr/local/bin/docker"), &probe),
            RuntimeKind::Docker
        );
    }

    #[test]
    fn test_failed_probe_is_docker() {
        let probe = FixedProbe::new(None);
        assert_eq!(
            classify_runtime(Path::new("/opt/bin/nerdctl"), &probe),
            RuntimeKind::Docker
        );
        assert_eq!(probe.calls.get(), 1);
    }

    #[test]
    fn test_missing_override_is_runtime_not_found() {
        let cfg = EnvConfig {
            runner_override: Some("xcp-ng-dev-no-such-runtime".to_string()),
            log_filter: None,
        };
        let err = container_runtime_path(&cfg).unwrap_err();
        assert!(matches!(err, BuildEnvError::RuntimeNotFound(_)));
        assert_eq!(err.exit_code(), 127);
    }

    #[cfg(unix)]
    #[test]
    fn test_override_accepts_absolute_path() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempfile::tempdir().expect("tmpdir");
        let bin = td.path().join("podman");
        std::fs::write(&bin, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
        let cfg = EnvConfig {
            runner_override: Some(bin.display().to_string()),
            log_filter: None,
        };
        let rt = detect_runtime(&cfg, &FixedProbe::new(None)).expect("detect");
        assert_eq!(rt.path.file_name(), bin.file_name());
        assert_eq!(rt.kind, RuntimeKind::Podman);
    }
}
