//! The main game module for the glyph bubble game.
//!
//! This module contains all the gameplay logic including:
//! - Bubble entities and their tap animations
//! - The bubble pool: spawning, difficulty and hit testing
//! - Pointer input routing
//! - The play scene: target, streak and fairness guarantee
//! - Side-effect cues for audio and haptics

mod bubble;
mod canvas;
mod config;
mod cues;
mod debug;
mod haptics;
mod input;
mod label;
mod language;
mod manager;
mod render;
mod rng;
mod scene;
mod spring;

use bevy::prelude::*;

pub use cues::GameCue;
pub use language::SymbolSet;
pub use rng::GameRng;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        config::plugin,
        rng::plugin,
        language::plugin,
        canvas::plugin,
        cues::plugin,
        scene::plugin,
        input::plugin,
        haptics::plugin,
        render::plugin,
        debug::plugin,
    ));
}
