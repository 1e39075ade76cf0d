//! Peripheral requests raised by gameplay.
//!
//! The bubble core never touches audio or haptics directly. It pushes
//! [`GameCue`]s into the [`CueQueue`]; once per frame the queue is flushed into
//! Bevy messages that the audio and haptics plugins consume. Those consumers
//! are fire-and-forget: a missing clip or an absent vibration motor never
//! feeds back into gameplay state.

use bevy::prelude::*;

use crate::{AppSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<GameCue>();
    app.init_resource::<CueQueue>();
    app.add_systems(
        Update,
        flush_cues
            .in_set(AppSystems::Update)
            .after(super::input::handle_pointer_presses)
            .after(super::scene::advance_play_scene)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Named vibration recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum HapticPattern {
    /// Short single tap on any bubble.
    Pop,
    /// Double buzz after a wrong answer.
    Error,
    /// Short fanfare after a right answer.
    Success,
}

impl HapticPattern {
    /// Alternating vibrate / pause durations in milliseconds.
    pub fn durations_ms(self) -> &'static [u32] {
        match self {
            HapticPattern::Pop => &[50],
            HapticPattern::Error => &[50, 100, 50],
            HapticPattern::Success => &[50, 50, 50, 50, 100],
        }
    }
}

#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameCue {
    /// Pronounce the symbol with this romanization.
    PlayRoman { roman: String },
    /// Generic pop sound effect.
    PlayPop,
    Haptic(HapticPattern),
}

/// Cues raised during the current frame, in order.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct CueQueue(Vec<GameCue>);

impl CueQueue {
    pub fn push(&mut self, cue: GameCue) {
        self.0.push(cue);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameCue> + '_ {
        self.0.drain(..)
    }
}

fn flush_cues(mut queue: ResMut<CueQueue>, mut cues: MessageWriter<GameCue>) {
    if queue.is_empty() {
        return;
    }
    cues.write_batch(queue.drain());
}
