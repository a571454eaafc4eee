use std::path::PathBuf;
use std::process;

use clap::Parser;

use firmware_buildtools::cli::{run_docs_workflow, DocsWorkflowArgs};
use firmware_buildtools::config::DocsFormat;
use firmware_buildtools::ui::Reporter;

#[derive(Clone, Copy, clap::ValueEnum)]
enum Format {
    Html,
    Markdown,
}

impl From<Format> for DocsFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => DocsFormat::Html,
            Format::Markdown => DocsFormat::Markdown,
        }
    }
}

#[derive(clap::Parser)]
#[command(
    name = "fw-gendocs",
    version,
    about = "Generate API documentation for a Python or Rust package"
)]
struct Args {
    #[arg(help = "Top-level package or module to document")]
    toplevel: String,

    #[arg(help = "Output directory")]
    docs_dir: PathBuf,

    #[arg(
        short = 'p',
        long = "search-path",
        value_name = "DIR",
        num_args = 1..,
        help = "Additional directories to search for modules"
    )]
    search_path: Vec<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "NAME",
        num_args = 1..,
        help = "Fully qualified modules or items to leave out"
    )]
    exclude: Vec<String>,

    #[arg(short = 's', long, help = "Include item source code")]
    with_source: bool,

    #[arg(long, value_enum, help = "Output format")]
    format: Option<Format>,

    #[arg(long, value_name = "PATH", help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let reporter = Reporter::new("fw-gendocs");
    let workflow = DocsWorkflowArgs {
        config_path: args.config,
        base_dir: PathBuf::from("."),
        toplevel: args.toplevel,
        docs_dir: args.docs_dir,
        search_paths: args.search_path,
        exclude: args.exclude,
        with_source: args.with_source,
        format: args.format.map(DocsFormat::from),
    };

    if let Err(e) = run_docs_workflow(&workflow, &reporter) {
        reporter.error("docs", &format!("{:#}", e), None);
        process::exit(1);
    }
}
