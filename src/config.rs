//! Persisted configuration and its resolution into an immutable [`RunConfig`].
//!
//! The file lives at `<config dir>/m3-colors/m3-colors.toml` and is written with
//! defaults the first time it is missing. CLI overrides win over file values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::detect::DEFAULT_BRIGHTNESS_THRESHOLD;
use crate::theme::{ModePreference, Variant};

pub const APP_DIR: &str = "m3-colors";
pub const CONFIG_FILE: &str = "m3-colors.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSection {
    pub mode: ModePreference,
    /// Variant name; matched case-insensitively, unknown names mean CONTENT.
    pub variant: String,
    pub brightness_threshold: u8,
    /// Kill external commands that run longer than this. Unset waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            mode: ModePreference::Auto,
            variant: Variant::Content.as_str().to_string(),
            brightness_threshold: DEFAULT_BRIGHTNESS_THRESHOLD,
            command_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub templates_dir: String,
    pub cache_dir: String,
    pub config_dir: String,
    /// Directory for the JSON export, relative to the working directory.
    pub output_dir: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            templates_dir: "~/.config/m3-colors/templates".to_string(),
            cache_dir: "~/.cache/m3-colors".to_string(),
            config_dir: "~/.config/m3-colors".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub set_wallpaper: bool,
    pub apply_xresources: bool,
    pub generate_palette_preview: bool,
    pub run_post_script: bool,
    pub create_symlink: bool,
    pub print_colors: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            set_wallpaper: true,
            apply_xresources: true,
            generate_palette_preview: true,
            run_post_script: true,
            create_symlink: true,
            print_colors: true,
        }
    }
}

impl Features {
    pub fn none() -> Self {
        Self {
            set_wallpaper: false,
            apply_xresources: false,
            generate_palette_preview: false,
            run_post_script: false,
            create_symlink: false,
            print_colors: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostScriptSection {
    pub script_path: String,
}

impl Default for PostScriptSection {
    fn default() -> Self {
        Self {
            script_path: "m3wal-post.sh".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesSection {
    pub extensions: Vec<String>,
}

impl Default for TemplatesSection {
    fn default() -> Self {
        Self {
            extensions: vec!["template".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsSection {
    pub wallpaper: Vec<String>,
    pub xresources: Vec<String>,
    pub shell: String,
}

impl Default for CommandsSection {
    fn default() -> Self {
        Self {
            wallpaper: vec!["feh".to_string(), "--bg-fill".to_string()],
            xresources: vec!["xrdb".to_string(), "-merge".to_string()],
            shell: "bash".to_string(),
        }
    }
}

/// On-disk layout of `m3-colors.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub general: GeneralSection,
    pub paths: PathsSection,
    pub features: Features,
    pub post_script: PostScriptSection,
    pub templates: TemplatesSection,
    pub commands: CommandsSection,
}

impl ConfigFile {
    /// Default location under the platform config directory.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::config("could not determine the user config directory"))?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Read the config, writing the defaults first if the file is missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))?;
        fs::write(path, content).map_err(|e| Error::io(path, e))
    }
}

/// Values supplied on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<ModePreference>,
    pub variant: Option<String>,
    pub brightness_threshold: Option<u8>,
    pub command_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub templates_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commands {
    pub wallpaper: Vec<String>,
    pub xresources: Vec<String>,
    pub shell: String,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub mode: ModePreference,
    pub variant: Variant,
    pub brightness_threshold: u8,
    pub command_timeout: Option<Duration>,
    pub paths: Paths,
    pub features: Features,
    pub post_script: PathBuf,
    pub template_extensions: Vec<String>,
    pub commands: Commands,
}

impl RunConfig {
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<Self> {
        let ConfigFile {
            general,
            paths,
            features,
            post_script,
            templates,
            commands,
        } = file;

        if commands.wallpaper.is_empty() || commands.xresources.is_empty() {
            return Err(Error::config("[commands] entries must name a program"));
        }
        let template_extensions: Vec<String> = templates
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
        if template_extensions.iter().any(|ext| ext.is_empty()) {
            return Err(Error::config("[templates] extensions must not be empty"));
        }

        let variant_name = overrides.variant.unwrap_or(general.variant);
        let paths = Paths {
            templates_dir: expand_home(&paths.templates_dir),
            cache_dir: expand_home(&paths.cache_dir),
            config_dir: expand_home(&paths.config_dir),
            output_dir: expand_home(&paths.output_dir),
        };

        let script = expand_home(&post_script.script_path);
        let post_script = if script.is_absolute() {
            script
        } else {
            paths.config_dir.join(script)
        };

        Ok(Self {
            mode: overrides.mode.unwrap_or(general.mode),
            variant: Variant::from_name_lossy(&variant_name),
            brightness_threshold: overrides
                .brightness_threshold
                .unwrap_or(general.brightness_threshold),
            command_timeout: overrides
                .command_timeout_secs
                .or(general.command_timeout_secs)
                .map(Duration::from_secs),
            paths,
            features,
            post_script,
            template_extensions,
            commands: Commands {
                wallpaper: commands.wallpaper,
                xresources: commands.xresources,
                shell: commands.shell,
            },
        })
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
