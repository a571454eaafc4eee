use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{load_config, DocsFormat};
use crate::docs::{generate, DocsOptions};
use crate::ui::Reporter;

/// Arguments for the documentation workflow
#[derive(Debug, Clone, PartialEq)]
pub struct DocsWorkflowArgs {
    pub config_path: Option<PathBuf>,

    /// Directory the config file and relative search paths resolve against
    pub base_dir: PathBuf,

    pub toplevel: String,
    pub docs_dir: PathBuf,

    /// Added after the configured search paths
    pub search_paths: Vec<PathBuf>,

    /// Added to the configured exclusions
    pub exclude: Vec<String>,

    pub with_source: bool,

    /// Overrides the configured format
    pub format: Option<DocsFormat>,
}

/// Merge the command line with the `[docs]` configuration.
pub fn docs_options(args: &DocsWorkflowArgs) -> Result<DocsOptions> {
    let config = load_config(args.config_path.as_deref(), &args.base_dir)
        .context("cannot load configuration")?;
    let docs = config.docs;

    let search_paths = docs
        .search_paths
        .iter()
        .chain(args.search_paths.iter())
        .map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                args.base_dir.join(p)
            }
        })
        .collect();

    let mut exclude = docs.exclude;
    exclude.extend(args.exclude.iter().cloned());

    Ok(DocsOptions {
        toplevel: args.toplevel.clone(),
        docs_dir: args.docs_dir.clone(),
        search_paths,
        exclude,
        with_source: args.with_source || docs.with_source,
        format: args.format.unwrap_or(docs.format),
    })
}

/// Generate the documentation and report each written page.
///
/// # Returns
/// * `Ok(files)` - Pages written
/// * `Err` - If the config, module lookup or output fails
pub fn run_docs_workflow(args: &DocsWorkflowArgs, reporter: &Reporter) -> Result<Vec<PathBuf>> {
    let options = docs_options(args)?;
    log::debug!("documentation options: {:?}", options);

    let written = generate(&options)
        .with_context(|| format!("cannot document '{}'", options.toplevel))?;

    for path in &written {
        reporter.status("docs", &format!("wrote {}", path.display()));
    }
    reporter.status(
        "docs",
        &format!(
            "{} page(s) for '{}' in '{}'",
            written.len(),
            options.toplevel,
            options.docs_dir.display()
        ),
    );
    Ok(written)
}
