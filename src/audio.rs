//! Sound effects and pronunciation clips.
//!
//! Playback is fire-and-forget: a clip that fails to load only produces an
//! asset warning, and gameplay never waits on audio.

use bevy::prelude::*;

use crate::game::{GameCue, SymbolSet};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<SoundEffect>();
    app.init_resource::<PopRotation>();
    // Cues are flushed during `Update`.
    app.add_systems(PostUpdate, play_cue_audio);
}

/// Marker for short one-shot sounds.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct SoundEffect;

/// A one-shot sound that despawns itself when it finishes.
pub fn sound_effect(handle: Handle<AudioSource>) -> impl Bundle {
    (AudioPlayer(handle), PlaybackSettings::DESPAWN, SoundEffect)
}

const POP_CLIPS: [&str; 5] = [
    "audio/sfx/pop1.ogg",
    "audio/sfx/pop2.ogg",
    "audio/sfx/pop3.ogg",
    "audio/sfx/pop4.ogg",
    "audio/sfx/pop5.ogg",
];

/// Cycles through the pop variations so repeated pops don't sound identical.
#[derive(Resource, Debug, Default)]
struct PopRotation(usize);

impl PopRotation {
    fn next_clip(&mut self) -> &'static str {
        let clip = POP_CLIPS[self.0 % POP_CLIPS.len()];
        self.0 = (self.0 + 1) % POP_CLIPS.len();
        clip
    }
}

/// Asset path for a cue, `None` when the cue has no sound.
fn cue_clip(cue: &GameCue, symbols: &SymbolSet, pops: &mut PopRotation) -> Option<String> {
    match cue {
        GameCue::PlayRoman { roman } => {
            let symbol = symbols.find_by_roman(roman)?;
            symbols.audio_path(symbol)
        }
        GameCue::PlayPop => Some(pops.next_clip().to_string()),
        GameCue::Haptic(_) => None,
    }
}

fn play_cue_audio(
    mut commands: Commands,
    mut cues: MessageReader<GameCue>,
    asset_server: Res<AssetServer>,
    symbols: Res<SymbolSet>,
    mut pops: ResMut<PopRotation>,
) {
    for cue in cues.read() {
        let Some(path) = cue_clip(cue, &symbols, &mut pops) else {
            continue;
        };
        debug!("Playing {}", path);
        commands.spawn(sound_effect(asset_server.load(path)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> SymbolSet {
        SymbolSet::from_json(
            r#"{
                "code": "ja",
                "name": "Japanese",
                "symbols": [
                    { "glyphs": { "hiragana": "あ" }, "roman": "a", "audio": "a.ogg" },
                    { "glyphs": { "hiragana": "が" }, "roman": "ga", "audio": "fallback.ogg" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn roman_cue_resolves_clip() {
        let mut pops = PopRotation::default();
        let clip = cue_clip(&GameCue::PlayRoman { roman: "a".into() }, &symbols(), &mut pops);
        assert_eq!(clip.as_deref(), Some("audio/ja/a.ogg"));
    }

    #[test]
    fn placeholder_and_unknown_clips_are_silent() {
        let mut pops = PopRotation::default();
        let set = symbols();
        assert_eq!(cue_clip(&GameCue::PlayRoman { roman: "ga".into() }, &set, &mut pops), None);
        assert_eq!(cue_clip(&GameCue::PlayRoman { roman: "zz".into() }, &set, &mut pops), None);
    }

    #[test]
    fn pops_rotate_through_variations() {
        let mut pops = PopRotation::default();
        let set = symbols();
        let clips: Vec<_> = (0..6)
            .filter_map(|_| cue_clip(&GameCue::PlayPop, &set, &mut pops))
            .collect();
        assert_eq!(clips[0], "audio/sfx/pop1.ogg");
        assert_eq!(clips[4], "audio/sfx/pop5.ogg");
        assert_eq!(clips[5], "audio/sfx/pop1.ogg");
    }
}
