//! Side effects outside the cache: external commands and the wallpaper symlink.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{Error, Result};

pub const XRESOURCES_FILE: &str = "colors.Xresources";
pub const SYMLINK_NAME: &str = "current_wallpaper";

/// Runs external tools, optionally killing them after a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner {
    pub timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run `argv[0]` with the remaining arguments plus `extra`, inheriting stdio.
    pub fn run(&self, argv: &[String], extra: &[&Path]) -> Result<()> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::config("empty command"))?;
        let command_str = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .map(str::to_string)
            .chain(extra.iter().map(|p| p.display().to_string()))
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new(program);
        cmd.args(args).args(extra);
        tracing::debug!(command = %command_str, timeout = ?self.timeout, "spawning");

        let mut child = cmd.spawn().map_err(|e| Error::io(program, e))?;
        let status = match self.timeout {
            Some(duration) => match child
                .wait_timeout(duration)
                .map_err(|e| Error::io(program, e))?
            {
                Some(status) => status,
                None => {
                    child.kill().map_err(|e| Error::io(program, e))?;
                    let _ = child.wait();
                    return Err(Error::Timeout {
                        command: command_str,
                        after: duration,
                    });
                }
            },
            None => child.wait().map_err(|e| Error::io(program, e))?,
        };

        if !status.success() {
            return Err(Error::Subprocess {
                command: command_str,
                status,
            });
        }
        Ok(())
    }
}

/// Hand the wallpaper to the configured setter (feh by default).
pub fn set_wallpaper(
    runner: &CommandRunner,
    command: &[String],
    wallpaper: &Path,
) -> Result<PathBuf> {
    if !wallpaper.exists() {
        return Err(Error::NotFound(wallpaper.to_path_buf()));
    }
    runner.run(command, &[wallpaper])?;
    Ok(wallpaper.to_path_buf())
}

/// Merge `<cache>/colors.Xresources` into the X resource database.
pub fn apply_xresources(
    runner: &CommandRunner,
    command: &[String],
    cache_dir: &Path,
) -> Result<PathBuf> {
    let file = cache_dir.join(XRESOURCES_FILE);
    if !file.is_file() {
        return Err(Error::NotFound(file));
    }
    runner.run(command, &[file.as_path()])?;
    Ok(file)
}

/// Run the user's post-generation script through `shell`.
pub fn run_post_script(runner: &CommandRunner, shell: &str, script: &Path) -> Result<PathBuf> {
    if !script.is_file() {
        return Err(Error::NotFound(script.to_path_buf()));
    }
    runner.run(&[shell.to_string()], &[script])?;
    Ok(script.to_path_buf())
}

/// Point `<config_dir>/current_wallpaper` at the wallpaper, replacing any old link.
#[cfg(unix)]
pub fn link_wallpaper(config_dir: &Path, wallpaper: &Path) -> Result<PathBuf> {
    fs::create_dir_all(config_dir).map_err(|e| Error::io(config_dir, e))?;
    let target = fs::canonicalize(wallpaper).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(wallpaper.to_path_buf()),
        _ => Error::io(wallpaper, e),
    })?;

    let link = config_dir.join(SYMLINK_NAME);
    if link.symlink_metadata().is_ok() {
        fs::remove_file(&link).map_err(|e| Error::io(&link, e))?;
    }
    std::os::unix::fs::symlink(&target, &link).map_err(|e| Error::io(&link, e))?;
    Ok(link)
}

#[cfg(not(unix))]
pub fn link_wallpaper(_config_dir: &Path, _wallpaper: &Path) -> Result<PathBuf> {
    Err(Error::config("wallpaper symlinks need a unix platform"))
}
