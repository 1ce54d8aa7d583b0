use std::process::ExitCode;

use clap::Parser;

use xcp_ng_dev::cli::{Cli, Environment, KojiCmd};
use xcp_ng_dev::commands::{run_container, run_koji_build, RunFlags};
use xcp_ng_dev::EnvConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(mode) = cli.color {
        xcp_ng_dev::set_color_mode(mode);
    }

    let cfg = EnvConfig::from_env();
    xcp_ng_dev::telemetry::telemetry_init(cfg.log_filter.as_deref(), cli.verbose);

    let flags = RunFlags {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Environment::Container { action } => {
            let opts = action.into_options();
            run_container(&opts, &cfg, flags)
        }
        Environment::Koji {
            cmd: KojiCmd::Build { args },
        } => run_koji_build(&args, flags),
    }
}
