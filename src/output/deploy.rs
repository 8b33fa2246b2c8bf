use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::expand_home;
use crate::error::{Error, Result};
use crate::report::ItemReport;

pub const DEPLOY_FILE: &str = "deploy.json";

/// Copy `<cache>/<source>` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRule {
    pub source: String,
    pub destination: String,
}

impl DeploymentRule {
    fn new(source: &str, destination: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }
}

/// Contents of `deploy.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub deployments: Vec<DeploymentRule>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            deployments: vec![
                DeploymentRule::new("colors-nvim.lua", "~/.config/nvim/lua/themes/material3.lua"),
                DeploymentRule::new("gtkrc", "~/.local/share/themes/FlatColor/gtk-2.0/gtkrc"),
                DeploymentRule::new("gtk.css", "~/.local/share/themes/FlatColor/gtk-3.0/gtk.css"),
                DeploymentRule::new("gtk.3.20", "~/.local/share/themes/FlatColor/gtk-3.20/gtk.css"),
            ],
        }
    }
}

impl DeployConfig {
    /// Read the mapping, writing the default one if it does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::write(path, serde_json::to_string_pretty(&config)?)
                .map_err(|e| Error::io(path, e))?;
            return Ok(config);
        }
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Copy a single rule's file, keeping the source modification time.
pub fn deploy_one(rule: &DeploymentRule, source_dir: &Path) -> Result<PathBuf> {
    let src = source_dir.join(&rule.source);
    if !src.is_file() {
        return Err(Error::NotFound(src));
    }
    let dest = expand_home(&rule.destination);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(&src, &dest).map_err(|e| Error::io(&dest, e))?;

    let modified = fs::metadata(&src)
        .and_then(|meta| meta.modified())
        .map_err(|e| Error::io(&src, e))?;
    File::options()
        .write(true)
        .open(&dest)
        .and_then(|file| file.set_modified(modified))
        .map_err(|e| Error::io(&dest, e))?;

    Ok(dest)
}

/// Run every rule; a failing rule never stops the rest.
pub fn deploy(rules: &[DeploymentRule], source_dir: &Path) -> Vec<ItemReport> {
    rules
        .iter()
        .map(|rule| {
            let result = deploy_one(rule, source_dir);
            if let Err(err) = &result {
                tracing::debug!(source = %rule.source, error = %err, "deployment did not complete");
            }
            ItemReport::new(rule.source.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Outcome;
    use std::time::{Duration, SystemTime};

    #[test]
    fn default_mapping_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(DEPLOY_FILE);

        let config = DeployConfig::load_or_create(&path).unwrap();
        assert_eq!(config.deployments.len(), 4);
        assert_eq!(config.deployments[1].source, "gtkrc");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["deployments"][0]["source"], "colors-nvim.lua");
    }

    #[test]
    fn existing_mapping_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEPLOY_FILE);
        fs::write(
            &path,
            r#"{"deployments": [{"source": "kitty.conf", "destination": "/tmp/k.conf"}]}"#,
        )
        .unwrap();

        let config = DeployConfig::load_or_create(&path).unwrap();
        assert_eq!(
            config.deployments,
            vec![DeploymentRule::new("kitty.conf", "/tmp/k.conf")]
        );
    }

    #[test]
    fn malformed_mapping_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEPLOY_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            DeployConfig::load_or_create(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn missing_sources_are_skipped_and_rest_copied() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let dest = dir.path().join("dest");
        fs::create_dir(&cache).unwrap();
        fs::write(cache.join("a.conf"), b"alpha").unwrap();
        fs::write(cache.join("c.conf"), b"\x00gamma\xff").unwrap();

        let target = |name: &str| dest.join("nested").join(name).display().to_string();
        let rules = vec![
            DeploymentRule::new("a.conf", &target("a.conf")),
            DeploymentRule::new("b.conf", &target("b.conf")),
            DeploymentRule::new("c.conf", &target("c.conf")),
            DeploymentRule::new("d.conf", &target("d.conf")),
        ];

        let reports = deploy(&rules, &cache);
        assert_eq!(reports.len(), 4);
        let skipped = reports
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Skipped(_)))
            .count();
        assert_eq!(skipped, 2);
        assert!(reports[0].outcome.is_done() && reports[2].outcome.is_done());

        assert_eq!(fs::read(dest.join("nested/a.conf")).unwrap(), b"alpha");
        assert_eq!(fs::read(dest.join("nested/c.conf")).unwrap(), b"\x00gamma\xff");
        assert!(!dest.join("nested/b.conf").exists());
    }

    #[test]
    fn copy_preserves_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("gtkrc");
        fs::write(&src, "gtk").unwrap();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let dest = dir.path().join("out").join("gtkrc");
        let rule = DeploymentRule::new("gtkrc", &dest.display().to_string());
        deploy_one(&rule, dir.path()).unwrap();

        let copied = fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(copied, past);
    }

    #[test]
    fn destination_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("gtk.css"), "new").unwrap();
        let dest = dir.path().join("installed.css");
        fs::write(&dest, "old").unwrap();

        let rule = DeploymentRule::new("gtk.css", &dest.display().to_string());
        assert_eq!(deploy_one(&rule, dir.path()).unwrap(), dest);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }
}
