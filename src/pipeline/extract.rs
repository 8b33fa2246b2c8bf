use std::path::Path;

use image::DynamicImage;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::pipeline::assign::{assign_slots, TerminalPalette, TERMINAL_KEYS};
use crate::theme::{Mode, Scheme, Theme};

/// Open and decode the wallpaper.
pub fn load_wallpaper(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })
}

macro_rules! material_colors {
    ($($key:literal => $field:ident = $role:ident),* $(,)?) => {
        /// The Material 3 half of a [`ColorMap`], one hex string per template key.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct MaterialColors {
            $(pub $field: String,)*
        }

        impl MaterialColors {
            /// Template keys in output order.
            pub const KEYS: &'static [&'static str] = &[$($key),*];

            fn from_scheme(scheme: &Scheme) -> Self {
                Self {
                    $($field: scheme.$role.to_hex(),)*
                }
            }

            pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
                [$(($key, self.$field.as_str())),*].into_iter()
            }
        }
    };
}

material_colors! {
    "m3primary" => primary = primary,
    "m3onPrimary" => on_primary = on_primary,
    "m3primaryContainer" => primary_container = primary_container,
    "m3onPrimaryContainer" => on_primary_container = on_primary_container,
    "m3primaryFixed" => primary_fixed = primary_fixed,
    "m3primaryFixedDim" => primary_fixed_dim = primary_fixed_dim,
    "m3onPrimaryFixed" => on_primary_fixed = on_primary_fixed,
    "m3onPrimaryFixedVariant" => on_primary_fixed_variant = on_primary_fixed_variant,
    "m3secondary" => secondary = secondary,
    "m3onSecondary" => on_secondary = on_secondary,
    "m3secondaryContainer" => secondary_container = secondary_container,
    "m3onSecondaryContainer" => on_secondary_container = on_secondary_container,
    "m3secondaryFixed" => secondary_fixed = secondary_fixed,
    "m3secondaryFixedDim" => secondary_fixed_dim = secondary_fixed_dim,
    "m3onSecondaryFixed" => on_secondary_fixed = on_secondary_fixed,
    "m3onSecondaryFixedVariant" => on_secondary_fixed_variant = on_secondary_fixed_variant,
    "m3tertiary" => tertiary = tertiary,
    "m3onTertiary" => on_tertiary = on_tertiary,
    "m3tertiaryContainer" => tertiary_container = tertiary_container,
    "m3onTertiaryContainer" => on_tertiary_container = on_tertiary_container,
    "m3tertiaryFixed" => tertiary_fixed = tertiary_fixed,
    "m3tertiaryFixedDim" => tertiary_fixed_dim = tertiary_fixed_dim,
    "m3onTertiaryFixed" => on_tertiary_fixed = on_tertiary_fixed,
    "m3onTertiaryFixedVariant" => on_tertiary_fixed_variant = on_tertiary_fixed_variant,
    "m3error" => error = error,
    "m3onError" => on_error = on_error,
    "m3errorContainer" => error_container = error_container,
    "m3onErrorContainer" => on_error_container = on_error_container,
    "m3surface" => surface = surface,
    "m3onSurface" => on_surface = on_surface,
    "m3surfaceVariant" => surface_variant = surface_variant,
    "m3onSurfaceVariant" => on_surface_variant = on_surface_variant,
    "m3surfaceDim" => surface_dim = surface_dim,
    "m3surfaceBright" => surface_bright = surface_bright,
    "m3surfaceContainerLowest" => surface_container_lowest = surface_container_lowest,
    "m3surfaceContainerLow" => surface_container_low = surface_container_low,
    "m3surfaceContainer" => surface_container = surface_container,
    "m3surfaceContainerHigh" => surface_container_high = surface_container_high,
    "m3surfaceContainerHighest" => surface_container_highest = surface_container_highest,
    "m3surfaceTint" => surface_tint = surface_tint,
    // Deprecated in M3; aliases kept so older templates still resolve.
    "m3background" => background = surface,
    "m3onBackground" => on_background = on_surface,
    "m3outline" => outline = outline,
    "m3outlineVariant" => outline_variant = outline_variant,
    "m3inverseSurface" => inverse_surface = inverse_surface,
    "m3inverseOnSurface" => inverse_on_surface = inverse_on_surface,
    "m3inversePrimary" => inverse_primary = inverse_primary,
    "m3shadow" => shadow = shadow,
    "m3scrim" => scrim = scrim,
}

/// Every color a template can reference, keyed by its stable name.
///
/// Material roles come first in [`MaterialColors::KEYS`] order, then
/// `term0`..`term15`. The order is part of the output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    pub material: MaterialColors,
    pub terminal: TerminalPalette,
}

impl ColorMap {
    pub const LEN: usize = 65;

    pub fn keys() -> impl Iterator<Item = &'static str> {
        MaterialColors::KEYS
            .iter()
            .copied()
            .chain(TERMINAL_KEYS)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.material.entries().chain(self.terminal.entries())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        MaterialColors::KEYS.len() + TERMINAL_KEYS.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Serialize for ColorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Flatten the scheme selected by `mode` into a fresh [`ColorMap`].
pub fn extract(theme: &Theme, mode: Mode) -> ColorMap {
    let scheme = theme.scheme(mode);
    ColorMap {
        material: MaterialColors::from_scheme(scheme),
        terminal: assign_slots(scheme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::SchemeColor;
    use pretty_assertions::assert_eq;

    /// Light roles count up from 0x100, dark roles from 0x200.
    fn sentinel_theme() -> Theme {
        let numbered = |base: u32| {
            let mut next = base;
            Scheme::from_fn(move |_| {
                next += 1;
                SchemeColor::Argb(0xff00_0000 | next)
            })
        };
        Theme {
            source: SchemeColor::Argb(0xff6750a4),
            light: numbered(0x100),
            dark: numbered(0x200),
        }
    }

    #[test]
    fn color_map_has_65_unique_keys() {
        let colors = extract(&sentinel_theme(), Mode::Dark);
        let keys: Vec<_> = colors.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), ColorMap::LEN);
        assert_eq!(colors.len(), ColorMap::LEN);

        let mut unique = keys.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ColorMap::LEN);
        assert_eq!(keys, ColorMap::keys().collect::<Vec<_>>());
    }

    #[test]
    fn background_aliases_surface() {
        for mode in [Mode::Light, Mode::Dark] {
            let colors = extract(&sentinel_theme(), mode);
            assert_eq!(colors.get("m3background"), colors.get("m3surface"));
            assert_eq!(colors.get("m3onBackground"), colors.get("m3onSurface"));
        }
    }

    #[test]
    fn mode_selects_scheme() {
        let theme = sentinel_theme();
        assert_eq!(extract(&theme, Mode::Light).material.primary, "#000101");
        assert_eq!(extract(&theme, Mode::Dark).material.primary, "#000201");
    }

    #[test]
    fn extraction_is_deterministic() {
        let theme = sentinel_theme();
        let a = extract(&theme, Mode::Light);
        let b = extract(&theme, Mode::Light);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn key_order_is_mode_independent() {
        let theme = sentinel_theme();
        let light: Vec<_> = extract(&theme, Mode::Light).iter().map(|(k, _)| k).collect();
        let dark: Vec<_> = extract(&theme, Mode::Dark).iter().map(|(k, _)| k).collect();
        assert_eq!(light, dark);
    }

    #[test]
    fn terminal_slots_use_role_values() {
        let theme = Theme {
            source: SchemeColor::Hex("#000000".into()),
            light: Scheme::from_fn(|role| SchemeColor::Hex(format!("<{role}>"))),
            dark: Scheme::from_fn(|role| SchemeColor::Hex(format!("<{role}>"))),
        };
        let colors = extract(&theme, Mode::Dark);
        assert_eq!(colors.get("term0"), Some("<surface_dim>"));
        assert_eq!(colors.get("term3"), Some("<primary_fixed_dim>"));
        assert_eq!(colors.get("term7"), Some("<on_surface>"));
        assert_eq!(colors.get("term8"), Some("<surface_container_high>"));
        assert_eq!(colors.get("term14"), Some("<tertiary_fixed_dim>"));
        assert_eq!(colors.get("m3onPrimaryFixedVariant"), Some("<on_primary_fixed_variant>"));
        assert_eq!(colors.get("m3surfaceContainerHighest"), Some("<surface_container_highest>"));
        assert_eq!(colors.get("notakey"), None);
    }

    #[test]
    fn json_preserves_key_order() {
        let colors = extract(&sentinel_theme(), Mode::Light);
        let json = serde_json::to_string(&colors).unwrap();
        let primary = json.find("\"m3primary\"").unwrap();
        let scrim = json.find("\"m3scrim\"").unwrap();
        let term0 = json.find("\"term0\"").unwrap();
        let term15 = json.find("\"term15\"").unwrap();
        assert!(primary < scrim && scrim < term0 && term0 < term15);
    }

    #[test]
    fn load_missing_wallpaper_is_not_found() {
        let err = load_wallpaper(Path::new("/nonexistent/wall.png")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn load_non_image_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, "this is not an image").unwrap();

        let err = load_wallpaper(&path).unwrap_err();
        assert!(matches!(err, Error::Image { .. }), "got {err}");
    }
}
