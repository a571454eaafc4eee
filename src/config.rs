use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the configuration file looked up in the working directory and the
/// user config directory.
pub const CONFIG_FILE_NAME: &str = "buildtools.toml";

/// Represents the complete configuration shared by the three tools.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub docs: DocsConfig,

    #[serde(default)]
    pub builder: BuilderConfig,
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_changelog_types() -> Vec<String> {
    vec!["feat".to_string(), "fix".to_string()]
}

fn default_sections() -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert("feat".to_string(), "Features".to_string());
    map.insert("fix".to_string(), "Fixes".to_string());
    map.insert("perf".to_string(), "Performance".to_string());
    map
}

fn default_breaking_change_indicators() -> Vec<String> {
    vec!["BREAKING CHANGE".to_string(), "BREAKING-CHANGE".to_string()]
}

fn default_version_macro() -> String {
    "FIRMWARE_VERSION".to_string()
}

/// Settings for version and changelog generation.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReleaseConfig {
    /// Prefix in front of the semantic version in release tags
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Commit types listed in the changelog, in display order
    #[serde(default = "default_changelog_types")]
    pub changelog_types: Vec<String>,

    /// Changelog section heading per commit type
    #[serde(default = "default_sections")]
    pub sections: BTreeMap<String, String>,

    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,

    /// Fail on commits that do not follow conventional commits
    #[serde(default)]
    pub strict: bool,

    /// Macro name used when writing C header version files
    #[serde(default = "default_version_macro")]
    pub version_macro: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            tag_prefix: default_tag_prefix(),
            changelog_types: default_changelog_types(),
            sections: default_sections(),
            breaking_change_indicators: default_breaking_change_indicators(),
            strict: false,
            version_macro: default_version_macro(),
        }
    }
}

impl ReleaseConfig {
    /// Changelog heading for a commit type, falling back to the type itself.
    pub fn section_title(&self, commit_type: &str) -> String {
        self.sections
            .get(commit_type)
            .cloned()
            .unwrap_or_else(|| commit_type.to_string())
    }
}

/// Output format of generated documentation.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocsFormat {
    #[default]
    Html,
    Markdown,
}

impl DocsFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocsFormat::Html => "html",
            DocsFormat::Markdown => "md",
        }
    }
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

/// Settings for the documentation generator.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DocsConfig {
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub with_source: bool,

    #[serde(default)]
    pub format: DocsFormat,
}

impl Default for DocsConfig {
    fn default() -> Self {
        DocsConfig {
            search_paths: default_search_paths(),
            exclude: Vec::new(),
            with_source: false,
            format: DocsFormat::default(),
        }
    }
}

/// Success criteria of a toolchain build step, on top of a zero exit status.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SuccessCheck {
    /// Text that must appear in the step's build log
    #[serde(default)]
    pub log_contains: Option<String>,

    /// Path, relative to the component clone, that the step must create
    #[serde(default)]
    pub creates: Option<PathBuf>,
}

/// One build step of a toolchain component.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolchainStep {
    pub name: String,

    /// Directory relative to the component clone
    #[serde(default)]
    pub dir: PathBuf,

    pub command: Vec<String>,

    /// Directories relative to the work dir prepended to PATH
    #[serde(default)]
    pub path_prepend: Vec<PathBuf>,

    #[serde(default)]
    pub success: SuccessCheck,
}

/// A toolchain component cloned from git and built once.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolchainComponent {
    pub name: String,
    pub url: String,
    pub rev: String,

    #[serde(default)]
    pub submodules: bool,

    #[serde(default)]
    pub steps: Vec<ToolchainStep>,
}

fn default_port_dir() -> PathBuf {
    PathBuf::from("micropython/ports/esp8266")
}

fn default_board() -> String {
    "CUSTOM".to_string()
}

fn default_base_board() -> String {
    "GENERIC".to_string()
}

fn default_frozen_modules_dir() -> Option<PathBuf> {
    Some(PathBuf::from("modules"))
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_manifest() -> Option<PathBuf> {
    Some(PathBuf::from("mpbuild/manifest.py"))
}

fn default_remove() -> Vec<PathBuf> {
    vec![PathBuf::from("modules/inisetup.py")]
}

fn default_version_file() -> PathBuf {
    PathBuf::from("modules/_version.py")
}

fn default_firmware_command() -> Vec<String> {
    vec!["make".to_string(), "BOARD={board}".to_string()]
}

fn default_xtensa_path() -> Vec<PathBuf> {
    vec![PathBuf::from("esp-open-sdk/xtensa-lx106-elf/bin")]
}

fn default_build_dir() -> String {
    "build-{board}".to_string()
}

fn default_binary() -> PathBuf {
    PathBuf::from("firmware-combined.bin")
}

/// Board configuration and final firmware build.
///
/// `port_dir` is relative to the work dir and `frozen_modules_dir` to the port.
/// `remove` and `version_file` are relative to the board directory
/// (`<port_dir>/boards/<board>`). `source_dir`, `manifest` and
/// `project_marker` are relative to the project directory.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FirmwareConfig {
    #[serde(default = "default_port_dir")]
    pub port_dir: PathBuf,

    #[serde(default = "default_board")]
    pub board: String,

    #[serde(default = "default_base_board")]
    pub base_board: String,

    /// Port directory copied into the board's `modules`
    #[serde(default = "default_frozen_modules_dir")]
    pub frozen_modules_dir: Option<PathBuf>,

    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default = "default_manifest")]
    pub manifest: Option<PathBuf>,

    #[serde(default = "default_remove")]
    pub remove: Vec<PathBuf>,

    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,

    /// Must exist in the project directory before building
    #[serde(default = "default_source_dir")]
    pub project_marker: PathBuf,

    #[serde(default = "default_firmware_command")]
    pub command: Vec<String>,

    #[serde(default = "default_xtensa_path")]
    pub path_prepend: Vec<PathBuf>,

    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Firmware image inside the build directory
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        FirmwareConfig {
            port_dir: default_port_dir(),
            board: default_board(),
            base_board: default_base_board(),
            frozen_modules_dir: default_frozen_modules_dir(),
            source_dir: default_source_dir(),
            manifest: default_manifest(),
            remove: default_remove(),
            version_file: default_version_file(),
            project_marker: default_source_dir(),
            command: default_firmware_command(),
            path_prepend: default_xtensa_path(),
            build_dir: default_build_dir(),
            binary: default_binary(),
        }
    }
}

fn default_erase_command() -> Vec<String> {
    ["esptool.py", "--port", "{port}", "erase_flash"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_write_command() -> Vec<String> {
    [
        "esptool.py",
        "--port",
        "{port}",
        "--baud",
        "230400",
        "write_flash",
        "--flash_size=detect",
        "0",
        "{file}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Commands used to flash a firmware image to a device.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FlashConfig {
    #[serde(default = "default_erase_command")]
    pub erase: Vec<String>,

    #[serde(default = "default_write_command")]
    pub write: Vec<String>,
}

impl Default for FlashConfig {
    fn default() -> Self {
        FlashConfig {
            erase: default_erase_command(),
            write: default_write_command(),
        }
    }
}

fn default_firmware_name() -> String {
    "firmware".to_string()
}

fn default_toolchain() -> Vec<ToolchainComponent> {
    vec![
        ToolchainComponent {
            name: "esp-open-sdk".to_string(),
            url: "https://github.com/kyanit-project/esp-open-sdk".to_string(),
            rev: "fd14e15".to_string(),
            submodules: true,
            steps: vec![ToolchainStep {
                name: "build".to_string(),
                dir: PathBuf::new(),
                command: vec!["make".to_string()],
                path_prepend: Vec::new(),
                success: SuccessCheck {
                    log_contains: Some("Xtensa toolchain is built".to_string()),
                    creates: None,
                },
            }],
        },
        ToolchainComponent {
            name: "micropython".to_string(),
            url: "https://github.com/micropython/micropython".to_string(),
            rev: "42342fa".to_string(),
            submodules: false,
            steps: vec![
                ToolchainStep {
                    name: "mpy-cross".to_string(),
                    dir: PathBuf::from("mpy-cross"),
                    command: vec!["make".to_string()],
                    path_prepend: Vec::new(),
                    success: SuccessCheck {
                        log_contains: None,
                        creates: Some(PathBuf::from("mpy-cross/mpy-cross")),
                    },
                },
                ToolchainStep {
                    name: "submodules".to_string(),
                    dir: PathBuf::from("ports/esp8266"),
                    command: vec!["make".to_string(), "submodules".to_string()],
                    path_prepend: default_xtensa_path(),
                    success: SuccessCheck::default(),
                },
            ],
        },
    ]
}

/// Settings for the firmware build orchestrator.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BuilderConfig {
    /// Toolchain work directory; `~/.fw-builder` when unset
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Stem of exported firmware file names
    #[serde(default = "default_firmware_name")]
    pub firmware_name: String,

    #[serde(default = "default_toolchain")]
    pub toolchain: Vec<ToolchainComponent>,

    #[serde(default)]
    pub firmware: FirmwareConfig,

    #[serde(default)]
    pub flash: FlashConfig,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            work_dir: None,
            firmware_name: default_firmware_name(),
            toolchain: default_toolchain(),
            firmware: FirmwareConfig::default(),
            flash: FlashConfig::default(),
        }
    }
}

impl BuilderConfig {
    /// Resolves the work directory, defaulting to `~/.fw-builder`.
    pub fn resolve_work_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.work_dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".fw-builder"))
            .ok_or_else(|| {
                crate::error::BuildToolsError::config(
                    "cannot determine home directory; set builder.work_dir",
                )
            })
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `buildtools.toml` in `base_dir`
/// 3. `buildtools.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `base_dir` - Directory searched before the user config directory
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, base_dir: &Path) -> Result<Config> {
    let local = base_dir.join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        log::debug!("loading config from {}", path.display());
        fs::read_to_string(path)?
    } else if local.exists() {
        log::debug!("loading config from {}", local.display());
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(CONFIG_FILE_NAME);
        if user_config.exists() {
            log::debug!("loading config from {}", user_config.display());
            fs::read_to_string(user_config)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
