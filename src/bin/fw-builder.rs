use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use firmware_buildtools::cli::{run_builder_workflow, BuilderWorkflowArgs, StageFailure};
use firmware_buildtools::ui::Reporter;

#[derive(clap::Parser)]
#[command(
    name = "fw-builder",
    version,
    about = "Bootstrap the toolchain, build, flash and export firmware"
)]
struct Args {
    #[arg(long, help = "Bootstrap the toolchain into the work directory")]
    init: bool,

    #[arg(short, long, help = "Build the firmware for the project")]
    build: bool,

    #[arg(short, long, value_name = "PORT", help = "Flash the firmware to the device on PORT")]
    upload: Option<String>,

    #[arg(long, help = "Do not erase the flash before uploading")]
    no_erase: bool,

    #[arg(short, long, value_name = "FILE", help = "Upload FILE instead of the built firmware")]
    file: Option<PathBuf>,

    #[arg(short = 'v', long, help = "Print the previously built firmware version")]
    firmware_version: bool,

    #[arg(short, long, value_name = "DIR", help = "Export the built firmware into DIR")]
    output: Option<PathBuf>,

    #[arg(short, long, help = "Overwrite exported files without asking")]
    yes: bool,

    #[arg(long, value_name = "NAME", num_args = 1.., help = "Rebuild toolchain components from scratch")]
    rebuild: Vec<String>,

    #[arg(long, help = "Rebuild the whole toolchain from scratch")]
    rebuild_toolchain: bool,

    #[arg(short = 'C', long = "project", value_name = "DIR", default_value = ".", help = "Project directory")]
    project: PathBuf,

    #[arg(long, value_name = "DIR", help = "Toolchain work directory")]
    work_dir: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Enable debug logging")]
    verbose: bool,
}

impl From<Args> for BuilderWorkflowArgs {
    fn from(args: Args) -> Self {
        BuilderWorkflowArgs {
            config_path: args.config,
            project_dir: args.project,
            work_dir: args.work_dir,
            init: args.init,
            build: args.build,
            upload: args.upload,
            no_erase: args.no_erase,
            file: args.file,
            firmware_version: args.firmware_version,
            output: args.output,
            yes: args.yes,
            rebuild: args.rebuild,
            rebuild_toolchain: args.rebuild_toolchain,
        }
    }
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let reporter = Reporter::new("fw-builder");
    let workflow: BuilderWorkflowArgs = args.into();

    if !workflow.has_action() {
        let _ = Args::command().print_help();
        return;
    }

    if let Err(e) = run_builder_workflow(&workflow, &reporter) {
        match e.downcast_ref::<StageFailure>() {
            Some(failure) => {
                reporter.error(failure.stage, &failure.to_string(), failure.log_file())
            }
            None => reporter.error("build", &format!("{:#}", e), None),
        }
        process::exit(1);
    }
}
