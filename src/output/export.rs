use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::pipeline::extract::ColorMap;
use crate::theme::{Mode, Variant};

/// JSON snapshot of a generated scheme.
#[derive(Debug, Serialize)]
pub struct SchemeExport<'a> {
    pub wallpaper: &'a str,
    pub mode: Mode,
    pub variant: Variant,
    pub source_color: &'a str,
    pub colors: &'a ColorMap,
}

/// `<wallpaper stem>_<VARIANT>_scheme.json`
pub fn export_file_name(wallpaper: &Path, variant: Variant) -> String {
    let stem = wallpaper
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wallpaper".to_string());
    format!("{stem}_{variant}_scheme.json")
}

/// Write the snapshot to `primary` and an identical copy to `mirror`.
/// Returns both written paths.
pub fn write_export(
    export: &SchemeExport<'_>,
    primary: &Path,
    mirror: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let json = serde_json::to_string_pretty(export)?;

    for path in [primary, mirror] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, &json).map_err(|e| Error::io(path, e))?;
    }
    Ok((primary.to_path_buf(), mirror.to_path_buf()))
}
