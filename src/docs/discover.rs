use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{BuildToolsError, Result};

/// Source language of a documented module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Rust,
}

impl Language {
    /// Separator between path segments of a qualified name
    pub fn separator(&self) -> &'static str {
        match self {
            Language::Python => ".",
            Language::Rust => "::",
        }
    }

    /// Code block language tag used in markdown output
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }
}

/// A module found on disk, with its submodules
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Fully qualified name, e.g. `kyanit.wifi` or `kyanit::wifi`
    pub name: String,
    pub language: Language,
    /// File holding the module's own source
    pub source: PathBuf,
    /// Packages get an index page and may have submodules
    pub is_package: bool,
    pub submodules: Vec<Module>,
}

impl Module {
    /// Last segment of the qualified name
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit(self.language.separator())
            .next()
            .unwrap_or(&self.name)
    }

    /// Name segments, used to build output paths
    pub fn segments(&self) -> Vec<&str> {
        self.name.split(self.language.separator()).collect()
    }

    /// This module and all its descendants, depth first
    pub fn walk(&self) -> Vec<&Module> {
        let mut out = vec![self];
        for sub in &self.submodules {
            out.extend(sub.walk());
        }
        out
    }
}

/// The module hierarchy below a top-level package or module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleTree {
    pub root: Module,
}

impl ModuleTree {
    /// Find `toplevel` in the first search path that holds it.
    ///
    /// Python packages (`name/__init__.py`) and modules (`name.py`) are
    /// tried before Rust modules (`name/mod.rs`, `name/lib.rs`, `name.rs`).
    /// A dotted (or `::`-separated) name is resolved below its parents.
    pub fn discover(toplevel: &str, search_paths: &[PathBuf]) -> Result<ModuleTree> {
        for dir in search_paths {
            if let Some(root) = find_module(dir, toplevel) {
                log::debug!("found module '{}' at {}", toplevel, root.source.display());
                return Ok(ModuleTree { root });
            }
        }

        let searched: Vec<String> = search_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        Err(BuildToolsError::docs(format!(
            "module '{}' not found in {}",
            toplevel,
            searched.join(", ")
        )))
    }

    pub fn modules(&self) -> Vec<&Module> {
        self.root.walk()
    }
}

fn find_module(dir: &Path, toplevel: &str) -> Option<Module> {
    let (language, segments): (Option<Language>, Vec<&str>) = if toplevel.contains("::") {
        (Some(Language::Rust), toplevel.split("::").collect())
    } else if toplevel.contains('.') {
        (Some(Language::Python), toplevel.split('.').collect())
    } else {
        (None, vec![toplevel])
    };

    let (last, parents) = segments.split_last()?;
    let parent_dir = parents.iter().fold(dir.to_path_buf(), |acc, s| acc.join(s));

    if language != Some(Language::Rust) {
        if let Some(module) = python_module(&parent_dir, last, toplevel) {
            return Some(module);
        }
    }
    if language != Some(Language::Python) {
        if let Some(module) = rust_module(&parent_dir, last, toplevel) {
            return Some(module);
        }
    }
    None
}

/// Direct children of `dir`, sorted by name.
fn children(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .collect()
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn python_module(dir: &Path, name: &str, qualified: &str) -> Option<Module> {
    let package_dir = dir.join(name);
    let init = package_dir.join("__init__.py");
    if init.is_file() {
        let submodules = children(&package_dir)
            .into_iter()
            .filter_map(|child| {
                let child_name = if child.is_dir() {
                    file_name(&child)?.to_string()
                } else {
                    child
                        .extension()
                        .filter(|e| *e == "py")
                        .and(child.file_stem())
                        .and_then(|s| s.to_str())?
                        .to_string()
                };
                if child_name.starts_with('_') {
                    return None;
                }
                python_module(&package_dir, &child_name, &format!("{}.{}", qualified, child_name))
            })
            .collect();

        return Some(Module {
            name: qualified.to_string(),
            language: Language::Python,
            source: init,
            is_package: true,
            submodules,
        });
    }

    let file = dir.join(format!("{}.py", name));
    if file.is_file() {
        return Some(Module {
            name: qualified.to_string(),
            language: Language::Python,
            source: file,
            is_package: false,
            submodules: Vec::new(),
        });
    }
    None
}

fn rust_module(dir: &Path, name: &str, qualified: &str) -> Option<Module> {
    let module_dir = dir.join(name);
    let file = dir.join(format!("{}.rs", name));

    let source = ["mod.rs", "lib.rs"]
        .iter()
        .map(|root| module_dir.join(root))
        .find(|p| p.is_file())
        .or_else(|| Some(file.clone()).filter(|f| f.is_file()))?;

    let submodules = if module_dir.is_dir() {
        rust_submodules(&module_dir, qualified)
    } else {
        Vec::new()
    };

    Some(Module {
        name: qualified.to_string(),
        language: Language::Rust,
        source,
        is_package: module_dir.is_dir(),
        submodules,
    })
}

fn rust_submodules(dir: &Path, qualified: &str) -> Vec<Module> {
    // `net.rs` and `net/` describe the same module
    let mut names = BTreeMap::new();
    for child in children(dir) {
        let name = if child.is_dir() {
            file_name(&child).map(str::to_string)
        } else if child.extension().is_some_and(|e| e == "rs") {
            child
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !matches!(*s, "mod" | "lib" | "main"))
                .map(str::to_string)
        } else {
            None
        };
        if let Some(name) = name {
            names.insert(name, ());
        }
    }

    names
        .into_keys()
        .filter_map(|name| rust_module(dir, &name, &format!("{}::{}", qualified, name)))
        .collect()
}
