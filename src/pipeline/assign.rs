use crate::theme::Scheme;

/// Template keys of the 16 terminal slots, normal colors first.
pub const TERMINAL_KEYS: [&str; 16] = [
    "term0", "term1", "term2", "term3", "term4", "term5", "term6", "term7", "term8", "term9",
    "term10", "term11", "term12", "term13", "term14", "term15",
];

/// The 16 ANSI palette slots derived from a Material scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalPalette {
    pub slots: [String; 16],
}

impl TerminalPalette {
    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        TERMINAL_KEYS
            .into_iter()
            .zip(self.slots.iter().map(String::as_str))
    }
}

/// Map scheme roles onto the 16 terminal slots.
pub fn assign_slots(scheme: &Scheme) -> TerminalPalette {
    let roles = [
        &scheme.surface_dim,            // black
        &scheme.error,                  // red
        &scheme.tertiary,               // green
        &scheme.primary_fixed_dim,      // yellow
        &scheme.primary,                // blue
        &scheme.secondary,              // magenta
        &scheme.tertiary_container,     // cyan
        &scheme.on_surface,             // white
        &scheme.surface_container_high, // bright black
        &scheme.error_container,
        &scheme.tertiary_fixed,
        &scheme.primary_fixed,
        &scheme.primary_container,
        &scheme.secondary_container,
        &scheme.tertiary_fixed_dim,
        &scheme.surface_bright,
    ];
    TerminalPalette {
        slots: roles.map(|color| color.to_hex()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::SchemeColor;

    /// Each role carries its own name so the mapping is readable in asserts.
    fn named_scheme() -> Scheme {
        Scheme::from_fn(|role| SchemeColor::Hex(role.to_string()))
    }

    #[test]
    fn slots_follow_role_table() {
        let palette = assign_slots(&named_scheme());
        let expected = [
            "surface_dim",
            "error",
            "tertiary",
            "primary_fixed_dim",
            "primary",
            "secondary",
            "tertiary_container",
            "on_surface",
            "surface_container_high",
            "error_container",
            "tertiary_fixed",
            "primary_fixed",
            "primary_container",
            "secondary_container",
            "tertiary_fixed_dim",
            "surface_bright",
        ];
        assert_eq!(palette.slots, expected.map(String::from));
    }

    #[test]
    fn entries_pair_keys_with_slots() {
        let palette = assign_slots(&named_scheme());
        let entries: Vec<_> = palette.entries().collect();
        assert_eq!(entries.len(), 16);
        assert_eq!(entries[0], ("term0", "surface_dim"));
        assert_eq!(entries[15], ("term15", "surface_bright"));
    }

    #[test]
    fn argb_roles_become_hex() {
        let scheme = Scheme::from_fn(|_| SchemeColor::Argb(0xff1a2b3c));
        let palette = assign_slots(&scheme);
        assert!(palette.slots.iter().all(|s| s == "#1a2b3c"));
        assert_eq!(palette.slot(16), None);
    }
}
