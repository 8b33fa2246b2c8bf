use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crossterm::style::{self, Stylize};
use image::{Rgb, RgbImage};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::pipeline::assign::TERMINAL_KEYS;
use crate::pipeline::extract::{ColorMap, MaterialColors};
use crate::theme::{Mode, Variant};

pub const MAX_COLS: u32 = 16;
pub const CELL_WIDTH: u32 = 80;
pub const CELL_HEIGHT: u32 = 60;

/// Swatch order of the preview grid. The background aliases are left out
/// since they repeat the surface cells.
pub fn preview_keys() -> impl Iterator<Item = &'static str> {
    MaterialColors::KEYS
        .iter()
        .copied()
        .filter(|key| !matches!(*key, "m3background" | "m3onBackground"))
        .chain(TERMINAL_KEYS)
}

/// Lay the colors out as a 16-column grid of solid cells.
pub fn render_preview(colors: &ColorMap) -> Result<RgbImage> {
    let cells = preview_keys()
        .filter_map(|key| colors.get(key))
        .map(Color::from_hex)
        .collect::<Result<Vec<_>>>()?;

    let rows = (cells.len() as u32).div_ceil(MAX_COLS);
    let mut img = RgbImage::from_pixel(
        CELL_WIDTH * MAX_COLS,
        CELL_HEIGHT * rows,
        Rgb([255, 255, 255]),
    );

    for (idx, color) in cells.iter().enumerate() {
        let idx = idx as u32;
        let x0 = (idx % MAX_COLS) * CELL_WIDTH;
        let y0 = (idx / MAX_COLS) * CELL_HEIGHT;
        for y in y0..y0 + CELL_HEIGHT {
            for x in x0..x0 + CELL_WIDTH {
                img.put_pixel(x, y, Rgb([color.r, color.g, color.b]));
            }
        }
    }
    Ok(img)
}

/// Render and save the preview PNG.
pub fn save_preview(colors: &ColorMap, path: &Path) -> Result<PathBuf> {
    let img = render_preview(colors)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    img.save(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

/// `<wallpaper stem>_<VARIANT>_palette.png`
pub fn preview_file_name(wallpaper: &Path, variant: Variant) -> String {
    let stem = wallpaper
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wallpaper".to_string());
    format!("{stem}_{variant}_palette.png")
}

/// Choose black or white text for readability on the given background.
fn contrast_fg(c: Color) -> style::Color {
    if c.relative_luminance() > 0.4 {
        style::Color::Black
    } else {
        style::Color::White
    }
}

fn swatch(hex: &str, styled: bool) -> String {
    let label = format!(" {hex} ");
    match Color::from_hex(hex) {
        Ok(c) if styled => label
            .on(style::Color::Rgb {
                r: c.r,
                g: c.g,
                b: c.b,
            })
            .with(contrast_fg(c))
            .to_string(),
        _ => label,
    }
}

/// Print the key roles and the terminal palette. Swatches carry truecolor
/// escapes only when `styled` is set.
pub fn print_colors(
    out: &mut impl Write,
    colors: &ColorMap,
    mode: Mode,
    source: &str,
    styled: bool,
) -> io::Result<()> {
    writeln!(out, "\nColor Preview ({mode} mode):")?;
    writeln!(out, "  Source: {}", swatch(source, styled))?;
    writeln!(out)?;
    for (label, key) in [
        ("Primary", "m3primary"),
        ("Secondary", "m3secondary"),
        ("Tertiary", "m3tertiary"),
        ("Surface", "m3surface"),
        ("Error", "m3error"),
    ] {
        let value = colors.get(key).unwrap_or_default();
        writeln!(out, "  {label}: {}", swatch(value, styled))?;
    }

    writeln!(out, "\n  Terminal Colors:")?;
    for (key, value) in colors.terminal.entries() {
        writeln!(out, "    {key}: {}", swatch(value, styled))?;
    }
    out.flush()
}
