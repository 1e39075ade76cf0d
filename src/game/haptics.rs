//! Haptic feedback.
//!
//! Platforms without a vibration motor just trace the request. Nothing here
//! can fail back into gameplay.

use bevy::prelude::*;

use super::cues::{GameCue, HapticPattern};

pub(super) fn plugin(app: &mut App) {
    // Cues are flushed during `Update`.
    app.add_systems(PostUpdate, play_haptics);
}

/// Total vibration time of a pattern: every other entry is a pause.
pub fn vibration_ms(pattern: HapticPattern) -> u32 {
    pattern.durations_ms().iter().step_by(2).sum()
}

fn play_haptics(mut cues: MessageReader<GameCue>) {
    for cue in cues.read() {
        let GameCue::Haptic(pattern) = cue else {
            continue;
        };
        debug!(
            "Vibrate {:?} {:?} ({} ms on)",
            pattern,
            pattern.durations_ms(),
            vibration_ms(*pattern)
        );
    }
}
