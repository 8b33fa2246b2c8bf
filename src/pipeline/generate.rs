use std::path::Path;

use material_colors::color::Argb;
use material_colors::dynamic_color::Variant as MaterialVariant;
use material_colors::image::{FilterType, ImageReader};
use material_colors::scheme::Scheme as MaterialScheme;
use material_colors::theme::ThemeBuilder;

use crate::error::{Error, Result};
use crate::theme::{Scheme, SchemeColor, Theme, Variant};

/// Edge length the wallpaper is downscaled to before quantization.
const QUANTIZE_DIM: u32 = 128;

/// Produces a Material theme from a wallpaper.
pub trait ThemeGenerator {
    fn generate(&self, wallpaper: &Path, variant: Variant) -> Result<Theme>;
}

/// Theme generator backed by the `material-colors` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialGenerator;

impl ThemeGenerator for MaterialGenerator {
    fn generate(&self, wallpaper: &Path, variant: Variant) -> Result<Theme> {
        let bytes = std::fs::read(wallpaper).map_err(|e| Error::io(wallpaper, e))?;
        let mut image = ImageReader::read(bytes)
            .map_err(|e| Error::Generate(format!("{}: {e}", wallpaper.display())))?;
        image.resize(QUANTIZE_DIM, QUANTIZE_DIM, FilterType::Lanczos3);
        let source = ImageReader::extract_color(&image);
        tracing::debug!(source = %source.to_hex_with_pound(), %variant, "extracted source color");

        let theme = ThemeBuilder::with_source(source)
            .variant(material_variant(variant))
            .build();

        Ok(Theme {
            source: argb(source),
            light: convert_scheme(&theme.schemes.light),
            dark: convert_scheme(&theme.schemes.dark),
        })
    }
}

fn material_variant(variant: Variant) -> MaterialVariant {
    match variant {
        Variant::TonalSpot => MaterialVariant::TonalSpot,
        Variant::Vibrant => MaterialVariant::Vibrant,
        Variant::Expressive => MaterialVariant::Expressive,
        Variant::Neutral => MaterialVariant::Neutral,
        Variant::Fidelity => MaterialVariant::Fidelity,
        Variant::Content => MaterialVariant::Content,
        Variant::Monochrome => MaterialVariant::Monochrome,
    }
}

fn argb(color: Argb) -> SchemeColor {
    SchemeColor::Argb(u32::from_be_bytes([
        color.alpha,
        color.red,
        color.green,
        color.blue,
    ]))
}

fn convert_scheme(s: &MaterialScheme) -> Scheme {
    Scheme {
        primary: argb(s.primary),
        on_primary: argb(s.on_primary),
        primary_container: argb(s.primary_container),
        on_primary_container: argb(s.on_primary_container),
        primary_fixed: argb(s.primary_fixed),
        primary_fixed_dim: argb(s.primary_fixed_dim),
        on_primary_fixed: argb(s.on_primary_fixed),
        on_primary_fixed_variant: argb(s.on_primary_fixed_variant),
        secondary: argb(s.secondary),
        on_secondary: argb(s.on_secondary),
        secondary_container: argb(s.secondary_container),
        on_secondary_container: argb(s.on_secondary_container),
        secondary_fixed: argb(s.secondary_fixed),
        secondary_fixed_dim: argb(s.secondary_fixed_dim),
        on_secondary_fixed: argb(s.on_secondary_fixed),
        on_secondary_fixed_variant: argb(s.on_secondary_fixed_variant),
        tertiary: argb(s.tertiary),
        on_tertiary: argb(s.on_tertiary),
        tertiary_container: argb(s.tertiary_container),
        on_tertiary_container: argb(s.on_tertiary_container),
        tertiary_fixed: argb(s.tertiary_fixed),
        tertiary_fixed_dim: argb(s.tertiary_fixed_dim),
        on_tertiary_fixed: argb(s.on_tertiary_fixed),
        on_tertiary_fixed_variant: argb(s.on_tertiary_fixed_variant),
        error: argb(s.error),
        on_error: argb(s.on_error),
        error_container: argb(s.error_container),
        on_error_container: argb(s.on_error_container),
        surface: argb(s.surface),
        on_surface: argb(s.on_surface),
        surface_variant: argb(s.surface_variant),
        on_surface_variant: argb(s.on_surface_variant),
        surface_dim: argb(s.surface_dim),
        surface_bright: argb(s.surface_bright),
        surface_container_lowest: argb(s.surface_container_lowest),
        surface_container_low: argb(s.surface_container_low),
        surface_container: argb(s.surface_container),
        surface_container_high: argb(s.surface_container_high),
        surface_container_highest: argb(s.surface_container_highest),
        surface_tint: argb(s.surface_tint),
        outline: argb(s.outline),
        outline_variant: argb(s.outline_variant),
        inverse_surface: argb(s.inverse_surface),
        inverse_on_surface: argb(s.inverse_on_surface),
        inverse_primary: argb(s.inverse_primary),
        shadow: argb(s.shadow),
        scrim: argb(s.scrim),
    }
}
