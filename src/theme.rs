use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Concrete light/dark mode of a generated scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Light,
    Dark,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested mode: either forced, or derived from wallpaper brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModePreference {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ModePreference {
    /// The forced mode, or `None` when brightness analysis decides.
    pub fn forced(self) -> Option<Mode> {
        match self {
            ModePreference::Auto => None,
            ModePreference::Light => Some(Mode::Light),
            ModePreference::Dark => Some(Mode::Dark),
        }
    }
}

/// Tonal-palette strategy handed to the theme generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    #[serde(rename = "TONALSPOT")]
    TonalSpot,
    #[serde(rename = "VIBRANT")]
    Vibrant,
    #[serde(rename = "EXPRESSIVE")]
    Expressive,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "FIDELITY")]
    Fidelity,
    #[default]
    #[serde(rename = "CONTENT")]
    Content,
    #[serde(rename = "MONOCHROME")]
    Monochrome,
}

impl Variant {
    pub const ALL: [Variant; 7] = [
        Variant::TonalSpot,
        Variant::Vibrant,
        Variant::Expressive,
        Variant::Neutral,
        Variant::Fidelity,
        Variant::Content,
        Variant::Monochrome,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::TonalSpot => "TONALSPOT",
            Variant::Vibrant => "VIBRANT",
            Variant::Expressive => "EXPRESSIVE",
            Variant::Neutral => "NEUTRAL",
            Variant::Fidelity => "FIDELITY",
            Variant::Content => "CONTENT",
            Variant::Monochrome => "MONOCHROME",
        }
    }

    /// Case-insensitive lookup that falls back to `Content` for unknown names.
    pub fn from_name_lossy(name: &str) -> Variant {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(variant = name, "unknown variant, falling back to CONTENT");
            Variant::Content
        })
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown variant: {s}"))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role value as handed over by the theme generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeColor {
    Argb(u32),
    Hex(String),
}

impl SchemeColor {
    /// `#rrggbb` for packed values; strings pass through unchanged.
    pub fn to_hex(&self) -> String {
        match self {
            SchemeColor::Argb(argb) => Color::from_argb(*argb).to_hex(),
            SchemeColor::Hex(hex) => hex.clone(),
        }
    }
}

impl From<u32> for SchemeColor {
    fn from(argb: u32) -> Self {
        SchemeColor::Argb(argb)
    }
}

macro_rules! scheme_roles {
    ($($role:ident),* $(,)?) => {
        /// One generated Material 3 scheme (light or dark).
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct Scheme {
            $(pub $role: SchemeColor,)*
        }

        impl Scheme {
            /// Role names in declaration order.
            pub const ROLES: &'static [&'static str] = &[$(stringify!($role)),*];

            /// Build a scheme by asking `f` for each role by name.
            pub fn from_fn(mut f: impl FnMut(&'static str) -> SchemeColor) -> Self {
                Self {
                    $($role: f(stringify!($role)),)*
                }
            }
        }
    };
}

scheme_roles! {
    primary,
    on_primary,
    primary_container,
    on_primary_container,
    primary_fixed,
    primary_fixed_dim,
    on_primary_fixed,
    on_primary_fixed_variant,
    secondary,
    on_secondary,
    secondary_container,
    on_secondary_container,
    secondary_fixed,
    secondary_fixed_dim,
    on_secondary_fixed,
    on_secondary_fixed_variant,
    tertiary,
    on_tertiary,
    tertiary_container,
    on_tertiary_container,
    tertiary_fixed,
    tertiary_fixed_dim,
    on_tertiary_fixed,
    on_tertiary_fixed_variant,
    error,
    on_error,
    error_container,
    on_error_container,
    surface,
    on_surface,
    surface_variant,
    on_surface_variant,
    surface_dim,
    surface_bright,
    surface_container_lowest,
    surface_container_low,
    surface_container,
    surface_container_high,
    surface_container_highest,
    surface_tint,
    outline,
    outline_variant,
    inverse_surface,
    inverse_on_surface,
    inverse_primary,
    shadow,
    scrim,
}

/// Output of the theme generator: the seed color plus both schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub source: SchemeColor,
    pub light: Scheme,
    pub dark: Scheme,
}

impl Theme {
    pub fn scheme(&self, mode: Mode) -> &Scheme {
        match mode {
            Mode::Dark => &self.dark,
            Mode::Light => &self.light,
        }
    }
}
