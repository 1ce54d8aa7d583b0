use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::color::ColorMode;
use crate::docker::local_repo::LocalRepoSpec;
use crate::options::{Action, ContainerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "xcp-ng-dev",
    version,
    about = "Build XCP-ng RPM packages inside a reproducible docker or podman container.",
    after_long_help = "Examples:\n  xcp-ng-dev container build 8.3 ./xapi -o ./out\n  xcp-ng-dev container builddep 8.3 ./xapi --deps-dir ./deps\n  xcp-ng-dev container run 8.3 --no-network --no-update -- rpm -qa\n  xcp-ng-dev container shell 9.0 --local-repo extra:./rpms\n\nEnvironment:\n  XCPNG_OCI_RUNNER   container runtime to use instead of auto-detecting docker/podman\n  XCPNG_DEV_LOG      log filter (e.g. debug), falls back to RUST_LOG\n"
)]
pub struct Cli {
    /// Print detailed execution info
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print the runtime invocation without starting the container.
    /// Host-side preparation still happens: local repositories are indexed and
    /// missing output, deps and ccache directories are created.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub color: Option<ColorMode>,

    #[command(subcommand)]
    pub command: Environment,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Environment {
    /// Use a local container to build a package
    Container {
        #[command(subcommand)]
        action: ContainerCmd,
    },
    /// Koji related commands
    Koji {
        #[command(subcommand)]
        cmd: KojiCmd,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum KojiCmd {
    /// Submit a build to koji through the koji client
    Build {
        /// Arguments passed through to `koji build`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ContainerCmd {
    /// Install dependencies for the spec file(s) found in the SPECS/ subdirectory of the source
    /// directory, then build the RPM(s)
    Build(BuildArgs),
    /// Download the build dependencies of the spec file(s) into a local directory
    Builddep(BuilddepArgs),
    /// Execute a command inside a container
    Run(RunArgs),
    /// Drop a shell into the prepared container
    Shell(ShellArgs),
}

/// Flags shared by every container action.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// XCP-ng version of the build environment image: 8.3, 9.0, etc.
    #[arg(value_name = "CONTAINER_VERSION")]
    pub container_version: String,

    /// After finishing the execution of the action, drop user into a shell
    #[arg(short = 'n', long)]
    pub no_exit: bool,

    /// Local dir to mount in the image; mounted at /external/<dirname>
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Vec<PathBuf>,

    /// Environment variables passed directly to the runtime's -e
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Volume mounts passed directly to the runtime's -v
    #[arg(short = 'v', long = "volume", value_name = "SPEC")]
    pub volume: Vec<String>,

    /// Additional repositories to enable before installing build dependencies (repeatable)
    #[arg(short = 'a', long = "enablerepo", value_name = "REPO")]
    pub enablerepo: Vec<String>,

    /// Repositories to disable; applied before --enablerepo (repeatable)
    #[arg(long = "disablerepo", value_name = "REPO")]
    pub disablerepo: Vec<String>,

    /// Directory of RPMs exposed as an additional package repository, as [NAME:]PATH (repeatable)
    #[arg(long = "local-repo", value_name = "[NAME:]PATH")]
    pub local_repo: Vec<LocalRepoSpec>,

    /// Extra packages to install in the container before running the action (repeatable)
    #[arg(long = "install", value_name = "PACKAGE")]
    pub install: Vec<String>,

    /// Do not update the container's packages on startup
    #[arg(long)]
    pub no_update: bool,

    /// Run the container without network access
    #[arg(long)]
    pub no_network: bool,

    /// Use the bootstrap variant of the image
    #[arg(long)]
    pub bootstrap: bool,

    /// Use the isarpm variant of the image
    #[arg(long)]
    pub isarpm: bool,

    /// Keep the container after it exits
    #[arg(long)]
    pub no_rm: bool,

    /// Enable syslog to host by mounting in /dev/log
    #[arg(long)]
    pub syslog: bool,

    /// Assign a name to the container
    #[arg(long)]
    pub name: Option<String>,

    /// Ulimit options passed directly to the runtime (repeatable)
    #[arg(long = "ulimit", value_name = "SPEC")]
    pub ulimit: Vec<String>,

    /// Override the default platform for the build container
    #[arg(long)]
    pub platform: Option<String>,

    /// Host directory used as a persistent ccache; created if it doesn't exist
    #[arg(long, value_name = "DIR")]
    pub ccache: Option<PathBuf>,

    /// Enable script tracing in container initialization (sh -x)
    #[arg(long)]
    pub debug: bool,

    /// If container initialisation fails, exit rather than dropping the user into a shell
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Root path where SPECS/ and SOURCES/ are available
    #[arg(value_name = "SOURCE_DIR", default_value = ".")]
    pub build_local: PathBuf,

    /// Directory where the RPMs, SRPMs and the build logs will appear; created if it doesn't exist
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Definition passed to rpmbuild, e.g. --define 'xcp_ng_section extras'
    #[arg(long)]
    pub define: Option<String>,

    /// Pass additional option(s) to rpmbuild (repeatable)
    #[arg(long = "rpmbuild-opts", value_name = "OPT", allow_hyphen_values = true)]
    pub rpmbuild_opts: Vec<String>,

    /// Request given -bX stage of rpmbuild, X in [abpfcilsrd]
    #[arg(long = "rpmbuild-stage", value_name = "X")]
    pub rpmbuild_stage: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BuilddepArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Root path where SPECS/ and SOURCES/ are available
    #[arg(value_name = "SOURCE_DIR", default_value = ".")]
    pub build_local: PathBuf,

    /// Directory receiving the downloaded build dependencies; created if it doesn't exist
    #[arg(long = "deps-dir", value_name = "DIR")]
    pub deps_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Command to run inside the prepared container (after --)
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ShellArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommonArgs {
    fn into_options(self, action: Action) -> ContainerOptions {
        ContainerOptions {
            action,
            container_version: self.container_version,
            dirs: self.dir,
            envs: self.env,
            volumes: self.volume,
            enablerepo: self.enablerepo,
            disablerepo: self.disablerepo,
            local_repos: self.local_repo,
            install: self.install,
            ulimits: self.ulimit,
            no_exit: self.no_exit,
            no_rm: self.no_rm,
            syslog: self.syslog,
            debug: self.debug,
            bootstrap: self.bootstrap,
            isarpm: self.isarpm,
            no_network: self.no_network,
            no_update: self.no_update,
            fail_on_error: self.fail_on_error,
            ccache: self.ccache,
            platform: self.platform,
            name: self.name,
        }
    }
}

impl ContainerCmd {
    pub fn into_options(self) -> ContainerOptions {
        match self {
            ContainerCmd::Build(a) => a.common.into_options(Action::Build {
                source_dir: a.build_local,
                output_dir: a.output_dir,
                define: a.define,
                rpmbuild_opts: a.rpmbuild_opts,
                rpmbuild_stage: a.rpmbuild_stage,
            }),
            ContainerCmd::Builddep(a) => a.common.into_options(Action::Builddep {
                source_dir: a.build_local,
                deps_dir: a.deps_dir,
            }),
            ContainerCmd::Run(a) => a.common.into_options(Action::Run { command: a.command }),
            ContainerCmd::Shell(a) => a.common.into_options(Action::Shell),
        }
    }
}
