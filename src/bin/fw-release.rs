use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use firmware_buildtools::cli::{run_release_workflow, ReleaseWorkflowArgs};
use firmware_buildtools::ui::Reporter;
use firmware_buildtools::BuildToolsError;

#[derive(clap::Parser)]
#[command(
    name = "fw-release",
    version,
    about = "Versioning and changelog generation from conventional commits"
)]
struct Args {
    #[arg(short, long, help = "Same as -v -n -d -c")]
    all: bool,

    #[arg(short = 'v', long, help = "Print the latest release version")]
    latest: bool,

    #[arg(short, long, help = "Print the next release version, if one is needed")]
    next: bool,

    #[arg(short, long, help = "Print the version of the head commit")]
    describe: bool,

    #[arg(
        short,
        long,
        value_name = "TYPE",
        num_args = 0..,
        help = "Print commits since the last release, grouped by type"
    )]
    changelog: Option<Vec<String>>,

    #[arg(short, long, value_name = "FILE", help = "Write the full changelog to FILE")]
    write_changelog: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_name = "FILE",
        help = "Write the next (or latest) version to FILE"
    )]
    version_file: Option<PathBuf>,

    #[arg(short, long, help = "Print bare values only")]
    plain: bool,

    #[arg(short = 'C', long = "repo", value_name = "DIR", default_value = ".", help = "Repository directory")]
    repo: PathBuf,

    #[arg(long, value_name = "PATH", help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Enable debug logging")]
    verbose: bool,
}

impl From<Args> for ReleaseWorkflowArgs {
    fn from(args: Args) -> Self {
        ReleaseWorkflowArgs {
            config_path: args.config,
            repo_dir: args.repo,
            all: args.all,
            latest: args.latest,
            next: args.next,
            describe: args.describe,
            changelog: args.changelog,
            write_changelog: args.write_changelog,
            version_file: args.version_file,
            plain: args.plain,
        }
    }
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let reporter = Reporter::new("fw-release");
    let workflow: ReleaseWorkflowArgs = args.into();

    if !workflow.has_action() {
        let _ = Args::command().print_help();
        return;
    }

    match run_release_workflow(&workflow, &reporter) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            let log = e
                .downcast_ref::<BuildToolsError>()
                .and_then(|err| err.log_file().cloned());
            reporter.error("release", &format!("{:#}", e), log.as_deref());
            process::exit(1);
        }
    }
}
