//! Language data: the symbols the player learns.
//!
//! A language document lists each symbol's glyph in every script it is
//! written in (hiragana and katakana for Japanese), its romanization, the
//! pronunciation clip and a category. The data ships inside the binary as
//! JSON and is parsed once at startup into a [`SymbolSet`].

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use super::rng::GameRng;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(SymbolSet::load_embedded());
}

const EMBEDDED_LANGUAGE: &str = include_str!("../../assets/lang/ja.json");

/// Clips with this file name are placeholders and never played.
pub const FALLBACK_AUDIO: &str = "fallback.ogg";

/// Errors raised while reading a language document.
#[derive(Error, Debug)]
pub enum LanguageError {
    #[error("Failed to parse language data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Language '{0}' has no symbols")]
    Empty(String),

    #[error("Symbol '{0}' has no glyphs")]
    NoGlyphs(String),
}

/// Grouping used by the source data (plain, voiced, semi-voiced, digraphs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCategory {
    #[default]
    Basic,
    Dakuten,
    Handakuten,
    Combo,
    Other,
}

/// One learnable symbol.
#[derive(Debug, Clone, PartialEq, Deserialize, Reflect)]
pub struct SymbolDef {
    /// Script name to glyph, e.g. `hiragana -> あ`.
    pub glyphs: BTreeMap<String, String>,
    /// Romanization; this is what "matching" compares.
    pub roman: String,
    /// Clip file name relative to `audio/<code>/`.
    pub audio: String,
    #[serde(default)]
    pub category: SymbolCategory,
}

#[derive(Debug, Deserialize)]
struct LanguageDef {
    code: String,
    name: String,
    #[serde(default)]
    scripts: Vec<String>,
    symbols: Vec<SymbolDef>,
}

/// Loaded language, consumed read-only by the spawner and the scene.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct SymbolSet {
    pub code: String,
    pub name: String,
    /// Script order the indicator cycles through after the romaji face.
    pub scripts: Vec<String>,
    pub symbols: Vec<SymbolDef>,
}

impl SymbolSet {
    pub fn from_json(json: &str) -> Result<Self, LanguageError> {
        let def: LanguageDef = serde_json::from_str(json)?;
        if def.symbols.is_empty() {
            return Err(LanguageError::Empty(def.code));
        }
        if let Some(bare) = def.symbols.iter().find(|s| s.glyphs.is_empty()) {
            return Err(LanguageError::NoGlyphs(bare.roman.clone()));
        }

        let scripts = if def.scripts.is_empty() {
            // No explicit order: fall back to the script names used by the data.
            let mut names: Vec<String> = def
                .symbols
                .iter()
                .flat_map(|s| s.glyphs.keys().cloned())
                .collect();
            names.sort();
            names.dedup();
            names
        } else {
            def.scripts
        };

        Ok(Self {
            code: def.code,
            name: def.name,
            scripts,
            symbols: def.symbols,
        })
    }

    /// Parse the bundled language. An unusable document leaves the set empty,
    /// which turns spawning into a no-op instead of crashing the frame loop.
    pub fn load_embedded() -> Self {
        match Self::from_json(EMBEDDED_LANGUAGE) {
            Ok(set) => {
                info!(
                    "Loaded {} ('{}', {} symbols, scripts: {:?})",
                    set.name,
                    set.code,
                    set.symbols.len(),
                    set.scripts
                );
                set
            }
            Err(e) => {
                error!("{}", e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Uniformly random symbol, `None` while no language is loaded.
    pub fn random_symbol(&self, rng: &mut GameRng) -> Option<&SymbolDef> {
        if self.symbols.is_empty() {
            return None;
        }
        self.symbols.get(rng.index(self.symbols.len()))
    }

    /// Uniformly random glyph among the symbol's scripts.
    pub fn random_glyph<'a>(&self, symbol: &'a SymbolDef, rng: &mut GameRng) -> &'a str {
        if symbol.glyphs.is_empty() {
            return &symbol.roman;
        }
        symbol
            .glyphs
            .values()
            .nth(rng.index(symbol.glyphs.len()))
            .map(String::as_str)
            .unwrap_or(&symbol.roman)
    }

    /// Glyph for the `index`-th script in [`Self::scripts`]. Symbols missing
    /// that script fall back to any glyph they do have.
    pub fn variant<'a>(&self, symbol: &'a SymbolDef, index: usize) -> &'a str {
        self.scripts
            .get(index)
            .and_then(|script| symbol.glyphs.get(script))
            .or_else(|| symbol.glyphs.values().next())
            .map(String::as_str)
            .unwrap_or(&symbol.roman)
    }

    pub fn find_by_roman(&self, roman: &str) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.roman == roman)
    }

    /// Asset path of the symbol's clip, `None` for placeholder clips.
    pub fn audio_path(&self, symbol: &SymbolDef) -> Option<String> {
        if symbol.audio.is_empty() || symbol.audio.ends_with(FALLBACK_AUDIO) {
            return None;
        }
        Some(format!("audio/{}/{}", self.code, symbol.audio))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "code": "ja",
        "name": "Japanese",
        "scripts": ["hiragana", "katakana"],
        "symbols": [
            { "glyphs": { "hiragana": "あ", "katakana": "ア" }, "roman": "a", "audio": "a.ogg" },
            { "glyphs": { "hiragana": "か", "katakana": "カ" },
              "roman": "ka", "audio": "ka.ogg" },
            { "glyphs": { "hiragana": "が" },
              "roman": "ga", "audio": "fallback.ogg", "category": "dakuten" }
        ]
    }"#;

    pub(crate) fn sample() -> SymbolSet {
        SymbolSet::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn embedded_language_is_valid() {
        let set = SymbolSet::from_json(EMBEDDED_LANGUAGE).unwrap();
        assert_eq!(set.scripts, vec!["hiragana", "katakana"]);
        assert!(set.symbols.len() >= 46);
    }

    #[test]
    fn variants_follow_script_order() {
        let set = sample();
        let a = set.find_by_roman("a").unwrap();
        assert_eq!(set.variant(a, 0), "あ");
        assert_eq!(set.variant(a, 1), "ア");
    }

    #[test]
    fn missing_variant_falls_back_to_any_glyph() {
        let set = sample();
        let ga = set.find_by_roman("ga").unwrap();
        assert_eq!(ga.category, SymbolCategory::Dakuten);
        assert_eq!(set.variant(ga, 1), "が");
    }

    #[test]
    fn random_glyph_belongs_to_symbol() {
        let set = sample();
        let ka = set.find_by_roman("ka").unwrap();
        let mut rng = GameRng::seeded(9);
        for _ in 0..20 {
            let glyph = set.random_glyph(ka, &mut rng);
            assert!(glyph == "か" || glyph == "カ");
        }
    }

    #[test]
    fn placeholder_audio_is_skipped() {
        let set = sample();
        assert_eq!(
            set.audio_path(set.find_by_roman("a").unwrap()).as_deref(),
            Some("audio/ja/a.ogg")
        );
        assert_eq!(set.audio_path(set.find_by_roman("ga").unwrap()), None);
    }

    #[test]
    fn empty_language_is_rejected() {
        let err = SymbolSet::from_json(r#"{ "code": "xx", "name": "", "symbols": [] }"#)
            .unwrap_err();
        assert!(matches!(err, LanguageError::Empty(code) if code == "xx"));
    }

    #[test]
    fn empty_set_never_picks() {
        let mut rng = GameRng::seeded(1);
        assert!(SymbolSet::default().random_symbol(&mut rng).is_none());
    }
}
