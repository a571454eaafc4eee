use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::DocsFormat;
use crate::docs::discover::{Module, ModuleTree};
use crate::docs::extract::extract;
use crate::docs::render::{child_href, page_path, render_page, SubmoduleLink, Template};
use crate::error::{BuildToolsError, Result};

/// Directory below the docs dir holding page template overrides
pub const TEMPLATES_DIR: &str = "templates";

/// Inputs of a documentation run
#[derive(Debug, Clone, PartialEq)]
pub struct DocsOptions {
    /// Top-level package or module name
    pub toplevel: String,
    /// Output directory
    pub docs_dir: PathBuf,
    pub search_paths: Vec<PathBuf>,
    /// Fully qualified names of modules and items to leave out
    pub exclude: Vec<String>,
    pub with_source: bool,
    pub format: DocsFormat,
}

/// Page template for `format`: `DOCS_DIR/templates/module.<ext>` when
/// present, the built-in one otherwise.
pub fn load_template(docs_dir: &Path, format: DocsFormat) -> Result<Template> {
    let path = docs_dir
        .join(TEMPLATES_DIR)
        .join(format!("module.{}", format.extension()));
    if path.is_file() {
        log::debug!("using template {}", path.display());
        Ok(Template::new(fs::read_to_string(&path)?))
    } else {
        Ok(Template::builtin(format))
    }
}

/// Remove previously generated pages of `toplevel`.
pub fn clean(docs_dir: &Path, toplevel: &str) -> Result<()> {
    let target: PathBuf = toplevel.split(['.', ':']).filter(|s| !s.is_empty()).collect();
    let target = docs_dir.join(target);
    if target.is_dir() {
        log::debug!("removing {}", target.display());
        fs::remove_dir_all(&target)?;
    }
    for format in [DocsFormat::Html, DocsFormat::Markdown] {
        let leaf = target.with_extension(format.extension());
        match fs::remove_file(&leaf) {
            Ok(()) => log::debug!("removed {}", leaf.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn is_excluded(module: &Module, exclude: &[String]) -> bool {
    exclude.iter().any(|name| name == &module.name)
}

/// Generate documentation pages for `options.toplevel` and every submodule.
///
/// # Returns
/// * `Ok(files)` - The pages written, in module order
/// * `Err` - If the module cannot be found or a page cannot be written
pub fn generate(options: &DocsOptions) -> Result<Vec<PathBuf>> {
    let tree = ModuleTree::discover(&options.toplevel, &options.search_paths)?;
    let template = load_template(&options.docs_dir, options.format)?;

    clean(&options.docs_dir, &options.toplevel)?;

    let mut written = Vec::new();
    write_module(&tree.root, options, &template, &mut written)?;
    Ok(written)
}

fn write_module(
    module: &Module,
    options: &DocsOptions,
    template: &Template,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    if is_excluded(module, &options.exclude) {
        log::debug!("excluding module {}", module.name);
        return Ok(());
    }

    let mut doc = extract(module)?;
    doc.exclude(&options.exclude);

    let links: Vec<SubmoduleLink> = module
        .submodules
        .iter()
        .filter(|sub| !is_excluded(sub, &options.exclude))
        .map(|sub| SubmoduleLink {
            name: sub.name.clone(),
            href: child_href(sub, options.format),
        })
        .collect();

    let page = render_page(&doc, &links, options.with_source, options.format, template);
    let path = options.docs_dir.join(page_path(module, options.format));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BuildToolsError::docs(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }
    fs::write(&path, page)?;
    log::info!("wrote {}", path.display());
    written.push(path);

    for sub in &module.submodules {
        write_module(sub, options, template, written)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("pkg/old.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();
        fs::write(dir.path().join("other.html"), "keep").unwrap();

        clean(dir.path(), "pkg").unwrap();
        assert!(!dir.path().join("pkg").exists());
        assert!(dir.path().join("other.html").exists());
    }

    #[test]
    fn test_clean_single_file_pages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blink.md"), "stale").unwrap();
        clean(dir.path(), "blink").unwrap();
        assert!(!dir.path().join("blink.md").exists());
        clean(dir.path(), "blink").unwrap();
    }

    #[test]
    fn test_clean_reports_unremovable_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blink.html")).unwrap();
        assert!(clean(dir.path(), "blink").is_err());
    }

    #[test]
    fn test_load_template_override() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load_template(dir.path(), DocsFormat::Html).unwrap(),
            Template::builtin(DocsFormat::Html)
        );

        fs::create_dir_all(dir.path().join(TEMPLATES_DIR)).unwrap();
        fs::write(
            dir.path().join(TEMPLATES_DIR).join("module.html"),
            "<x>{{ content }}</x>",
        )
        .unwrap();
        assert_eq!(
            load_template(dir.path(), DocsFormat::Html).unwrap(),
            Template::new("<x>{{ content }}</x>")
        );
    }
}
