use std::fs;
use std::path::Path;

use semver::Version;

use crate::error::Result;

/// Render the version file contents for `path`, picking the format from
/// the file extension.
pub fn render_version_file(path: &Path, version: &Version, macro_name: &str) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("py") => format!("__version__ = \"{}\"\n", version),
        Some("h") | Some("c") => format!("#define {} \"{}\"\n", macro_name, version),
        Some("toml") => format!("version = \"{}\"\n", version),
        _ => format!("{}\n", version),
    }
}

/// Write the version file, replacing any previous contents.
pub fn write_version_file(path: &Path, version: &Version, macro_name: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_version_file(path, version, macro_name))?;
    log::info!("wrote version {} to {}", version, path.display());
    Ok(())
}
