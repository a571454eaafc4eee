//! Documentation extraction from source files.
//!
//! Extraction is line based and tolerant: anything that does not look like a
//! documented public definition is ignored.

pub mod python;
pub mod rust;

use std::fs;

use crate::docs::discover::{Language, Module};
use crate::error::{BuildToolsError, Result};

/// Kind of a documented definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Function,
    Class,
    Method,
    Struct,
    Enum,
    Trait,
    Const,
    Static,
    Type,
    Module,
}

impl ItemKind {
    /// Heading under which items of this kind are listed
    pub fn heading(&self) -> &'static str {
        match self {
            ItemKind::Function => "Functions",
            ItemKind::Class => "Classes",
            ItemKind::Method => "Methods",
            ItemKind::Struct => "Structs",
            ItemKind::Enum => "Enums",
            ItemKind::Trait => "Traits",
            ItemKind::Const | ItemKind::Static => "Constants",
            ItemKind::Type => "Type aliases",
            ItemKind::Module => "Re-exported modules",
        }
    }
}

/// A documented definition
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub name: String,
    /// Declaration line(s), whitespace normalised
    pub signature: String,
    pub doc: Option<String>,
    /// Full source text of the definition
    pub source: String,
    /// Methods of a class or of an inherent impl
    pub members: Vec<Item>,
}

/// Documentation of one module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDoc {
    pub name: String,
    pub language: Language,
    pub doc: Option<String>,
    pub items: Vec<Item>,
}

impl ModuleDoc {
    /// Qualified name of an item of this module
    pub fn qualify(&self, item: &str) -> String {
        format!("{}{}{}", self.name, self.language.separator(), item)
    }

    /// Drop items (and members) whose qualified names are excluded.
    pub fn exclude(&mut self, excluded: &[String]) {
        let separator = self.language.separator();
        let module = self.name.clone();
        self.items.retain_mut(|item| {
            let qualified = format!("{}{}{}", module, separator, item.name);
            if excluded.contains(&qualified) {
                log::debug!("excluding {}", qualified);
                return false;
            }
            item.members.retain(|member| {
                let member_name = format!("{}{}{}", qualified, separator, member.name);
                !excluded.contains(&member_name)
            });
            true
        });
    }
}

/// Read a module's source file and extract its documentation.
pub fn extract(module: &Module) -> Result<ModuleDoc> {
    let text = fs::read_to_string(&module.source).map_err(|e| {
        BuildToolsError::docs(format!("cannot read {}: {}", module.source.display(), e))
    })?;

    let (doc, items) = match module.language {
        Language::Python => python::extract(&text),
        Language::Rust => rust::extract(&text),
    };

    Ok(ModuleDoc {
        name: module.name.clone(),
        language: module.language,
        doc,
        items,
    })
}

/// Remove the common leading indentation of all non-blank lines and trim
/// surrounding blank lines.
pub(crate) fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let body: Vec<&str> = lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .map(str::trim_end)
        .collect();

    body.join("\n").trim_matches('\n').to_string()
}

/// Collapse runs of whitespace, as used for multi-line signatures.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    joined.replace("( ", "(").replace(" )", ")")
}
