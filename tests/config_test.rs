// tests/config_test.rs
use firmware_buildtools::config::{load_config, Config, DocsFormat, CONFIG_FILE_NAME};
use serial_test::serial;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.release.tag_prefix, "v");
    assert_eq!(config.release.changelog_types, vec!["feat", "fix"]);
    assert!(!config.release.strict);
    assert_eq!(config.docs.search_paths, vec![PathBuf::from(".")]);
    assert_eq!(config.docs.format, DocsFormat::Html);
    assert_eq!(config.builder.firmware_name, "firmware");
}

#[test]
fn test_load_from_explicit_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[release]
tag_prefix = "release-"
changelog_types = ["feat", "fix", "perf"]

[builder.firmware]
board = "KYANIT"

[builder.flash]
erase = ["flasher", "--port", "{port}", "wipe"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let base = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path()), base.path()).unwrap();
    assert_eq!(config.release.tag_prefix, "release-");
    assert!(config.release.changelog_types.contains(&"perf".to_string()));
    assert_eq!(config.builder.firmware.board, "KYANIT");
    assert_eq!(config.builder.firmware.base_board, "GENERIC");
    assert_eq!(config.builder.flash.erase[3], "wipe");
    assert!(config.builder.flash.write.contains(&"{file}".to_string()));
}

#[test]
fn test_local_file_is_found() {
    let base = TempDir::new().unwrap();
    fs::write(
        base.path().join(CONFIG_FILE_NAME),
        "[docs]\nexclude = [\"pkg.tests\"]\n",
    )
    .unwrap();

    let config = load_config(None, base.path()).unwrap();
    assert_eq!(config.docs.exclude, vec!["pkg.tests"]);
}

#[test]
fn test_malformed_file_is_an_error() {
    let base = TempDir::new().unwrap();
    fs::write(base.path().join(CONFIG_FILE_NAME), "[release\nstrict = ").unwrap();
    let err = load_config(None, base.path()).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let base = TempDir::new().unwrap();
    assert!(load_config(Some(&base.path().join("nope.toml")), base.path()).is_err());
}

#[test]
#[serial]
fn test_default_work_dir_under_home() {
    let home = TempDir::new().unwrap();
    let original = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let work_dir = Config::default().builder.resolve_work_dir();

    match original {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
    assert_eq!(work_dir.unwrap(), home.path().join(".fw-builder"));
}

#[test]
fn test_toolchain_steps_from_file() {
    let base = TempDir::new().unwrap();
    fs::write(
        base.path().join(CONFIG_FILE_NAME),
        r#"
[[builder.toolchain]]
name = "sdk"
url = "https://example.com/sdk.git"
rev = "1234abc"

[[builder.toolchain.steps]]
name = "build"
command = ["make", "-j4"]
success = { log_contains = "done" }
"#,
    )
    .unwrap();

    let config = load_config(None, base.path()).unwrap();
    let toolchain = &config.builder.toolchain;
    assert_eq!(toolchain.len(), 1);
    assert!(!toolchain[0].submodules);
    assert_eq!(toolchain[0].steps[0].command, vec!["make", "-j4"]);
    assert_eq!(
        toolchain[0].steps[0].success.log_contains.as_deref(),
        Some("done")
    );
    assert_eq!(toolchain[0].steps[0].success.creates, None);
}
