//! API documentation generator for Python and Rust sources.
//!
//! Modules are discovered on disk ([ModuleTree]), their docs extracted
//! ([extract]) and rendered to one page per module ([render]).

pub mod discover;
pub mod extract;
pub mod generate;
pub mod render;

pub use discover::{Language, Module, ModuleTree};
pub use extract::{Item, ItemKind, ModuleDoc};
pub use generate::{clean, generate, DocsOptions};
pub use render::Template;
