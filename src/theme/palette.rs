use bevy::prelude::*;

use crate::game::GameRng;

/// #FFD1DC, used when nothing else resolves.
pub const DEFAULT_BUBBLE_COLOUR: Color = Color::srgb(1.0, 0.820, 0.863);

/// Dark text on pastel bubbles.
pub const LABEL_TEXT: Color = Color::srgb(0.133, 0.133, 0.133);

/// Rim flash after a tap.
pub const FLASH_RIM: Color = Color::WHITE;

/// Rim flash after a wrong answer.
pub const ERROR_RIM: Color = Color::srgb(0.9, 0.2, 0.2);

/// Built-in pastel set for when the theme palette is missing or empty.
const FALLBACK_HEX: [&str; 5] = ["#ffaaa5", "#ffd3b6", "#c7ceea", "#e2f0cb", "#b5ead7"];

const EMBEDDED_PALETTE: &str = include_str!("../../assets/themes/pastel-pond/palette.json");

/// Bubble fill colours of the active theme.
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct ThemePalette {
    colours: Vec<Color>,
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::from_hex(FALLBACK_HEX)
    }
}

impl ThemePalette {
    /// Build from `#rrggbb` strings; unparsable entries are skipped.
    pub fn from_hex<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let colours = entries
            .into_iter()
            .filter_map(|hex| match Srgba::hex(hex.as_ref()) {
                Ok(c) => Some(Color::from(c)),
                Err(e) => {
                    warn!("Skipping palette entry {:?}: {}", hex.as_ref(), e);
                    None
                }
            })
            .collect();
        Self { colours }
    }

    /// Parse the bundled theme palette; an unusable one yields the built-in set.
    pub fn load_embedded() -> Self {
        let palette = match serde_json::from_str::<Vec<String>>(EMBEDDED_PALETTE) {
            Ok(entries) => Self::from_hex(entries),
            Err(e) => {
                warn!("Failed to parse theme palette: {}", e);
                return Self::default();
            }
        };
        if palette.colours.is_empty() {
            warn!("Theme palette is empty, using fallback colours");
            return Self::default();
        }
        palette
    }

    /// Uniform pick; never fails, even for an empty palette.
    pub fn random_colour(&self, rng: &mut GameRng) -> Color {
        if self.colours.is_empty() {
            return DEFAULT_BUBBLE_COLOUR;
        }
        self.colours
            .get(rng.index(self.colours.len()))
            .or_else(|| self.colours.first())
            .copied()
            .unwrap_or(DEFAULT_BUBBLE_COLOUR)
    }
}
