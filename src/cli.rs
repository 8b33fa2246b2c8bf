use std::path::PathBuf;

use clap::Parser;

use crate::config::Overrides;
use crate::theme::ModePreference;

/// Generate a Material 3 color scheme from a wallpaper and apply it.
#[derive(Parser, Debug)]
#[command(name = "m3wal", version, about)]
pub struct Args {
    /// Path to the wallpaper image
    pub wallpaper: PathBuf,

    /// Scheme mode; `auto` picks from wallpaper brightness (default from config)
    #[arg(value_enum)]
    pub mode: Option<ModePreference>,

    /// Palette variant: TONALSPOT, VIBRANT, EXPRESSIVE, NEUTRAL, FIDELITY,
    /// CONTENT or MONOCHROME (default from config)
    pub variant: Option<String>,

    /// Config file to use instead of ~/.config/m3-colors/m3-colors.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the JSON export to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Brightness threshold (0-255) below which a wallpaper counts as dark
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Kill external commands after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            mode: self.mode,
            variant: self.variant.clone(),
            brightness_threshold: self.threshold,
            command_timeout_secs: self.timeout,
        }
    }
}
