//! Configuration discovery across formats and directory levels

use std::fs;
use std::time::Duration;

use anyhow::Result;
use recast_core::{ConfigLoader, IndentStyle};
use tempfile::TempDir;

#[test]
fn test_every_format_yields_the_same_settings() -> Result<()> {
    let dir = TempDir::new()?;
    let toml = dir.path().join(".recastrc.toml");
    let yaml = dir.path().join("recast.yaml");
    let json = dir.path().join("recast.json");
    fs::write(&toml, "[scheduler]\nmaxCycles = 4\ndeadlineMs = 100\n\n[template]\nindent = \"2\"\n")?;
    fs::write(&yaml, "scheduler:\n  maxCycles: 4\n  deadlineMs: 100\ntemplate:\n  indent: \"2\"\n")?;
    fs::write(
        &json,
        r#"{"scheduler": {"maxCycles": 4, "deadlineMs": 100}, "template": {"indent": "2"}}"#,
    )?;

    let from_toml = ConfigLoader::load_from_file(&toml)?;
    assert_eq!(from_toml, ConfigLoader::load_from_file(&yaml)?);
    assert_eq!(from_toml, ConfigLoader::load_from_file(&json)?);

    let scheduler = from_toml.scheduler_config()?;
    assert_eq!(scheduler.max_cycles, 4);
    assert_eq!(scheduler.deadline, Some(Duration::from_millis(100)));
    assert_eq!(from_toml.indent_style()?, Some(IndentStyle::spaces(2)));
    Ok(())
}

#[test]
fn test_nearest_config_wins() -> Result<()> {
    let dir = TempDir::new()?;
    let module = dir.path().join("module");
    fs::create_dir(&module)?;
    fs::write(dir.path().join("recast.yaml"), "scheduler:\n  maxCycles: 7\n")?;
    fs::write(module.join("recast.json"), r#"{"scheduler": {"maxCycles": 2}}"#)?;

    let config = ConfigLoader::load(None, Some(&module))?;
    assert_eq!(config.scheduler_config()?.max_cycles, 2);
    let config = ConfigLoader::load(None, Some(dir.path()))?;
    assert_eq!(config.scheduler_config()?.max_cycles, 7);
    Ok(())
}

#[test]
fn test_invalid_scheduler_settings_are_reported() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("recast.yml");
    fs::write(&path, "scheduler:\n  maxCycles: 0\n")?;

    let config = ConfigLoader::load_from_file(&path)?;
    let err = config.scheduler_config().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Configuration error: scheduler.maxCycles must be at least 1");
    Ok(())
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(ConfigLoader::load(Some(&missing), None).is_err());
}
