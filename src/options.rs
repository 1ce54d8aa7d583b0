//! The parsed, immutable description of one `container` invocation.

use std::path::PathBuf;

use crate::docker::local_repo::LocalRepoSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Build {
        source_dir: PathBuf,
        output_dir: Option<PathBuf>,
        define: Option<String>,
        rpmbuild_opts: Vec<String>,
        rpmbuild_stage: Option<String>,
    },
    Builddep {
        source_dir: PathBuf,
        deps_dir: PathBuf,
    },
    Run {
        command: Vec<String>,
    },
    Shell,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Build { .. } => "build",
            Action::Builddep { .. } => "builddep",
            Action::Run { .. } => "run",
            Action::Shell => "shell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOptions {
    pub action: Action,
    pub container_version: String,
    pub dirs: Vec<PathBuf>,
    pub envs: Vec<String>,
    pub volumes: Vec<String>,
    pub enablerepo: Vec<String>,
    pub disablerepo: Vec<String>,
    pub local_repos: Vec<LocalRepoSpec>,
    pub install: Vec<String>,
    pub ulimits: Vec<String>,
    pub no_exit: bool,
    pub no_rm: bool,
    pub syslog: bool,
    pub debug: bool,
    pub bootstrap: bool,
    pub isarpm: bool,
    pub no_network: bool,
    pub no_update: bool,
    pub fail_on_error: bool,
    pub ccache: Option<PathBuf>,
    pub platform: Option<String>,
    pub name: Option<String>,
}

impl ContainerOptions {
    /// Options with every flag at its default, for the given action and version.
    pub fn new(action: Action, container_version: impl Into<String>) -> Self {
        Self {
            action,
            container_version: container_version.into(),
            dirs: Vec::new(),
            envs: Vec::new(),
            volumes: Vec::new(),
            enablerepo: Vec::new(),
            disablerepo: Vec::new(),
            local_repos: Vec::new(),
            install: Vec::new(),
            ulimits: Vec::new(),
            no_exit: false,
            no_rm: false,
            syslog: false,
            debug: false,
            bootstrap: false,
            isarpm: false,
            no_network: false,
            no_update: false,
            fail_on_error: false,
            ccache: None,
            platform: None,
            name: None,
        }
    }

    /// Shell always drops into an interactive session.
    pub fn interactive(&self) -> bool {
        self.no_exit || matches!(self.action, Action::Shell)
    }
}
