//! Gameplay tuning.
//!
//! Every tunable has a compile-time default below. At startup the embedded
//! `assets/config.json` may override any subset of them; a broken file only
//! logs a warning and the defaults stay in effect.

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<GameConfig>();
    app.register_type::<TravelDirection>();
    app.insert_resource(GameConfig::load_embedded());
}

/// Seconds between spawn batches at difficulty 1.
pub const SPAWN_INTERVAL: f32 = 1.2;

/// Base bubble speed, in canvas heights per second.
pub const BUBBLE_SPEED: f32 = 0.2;

/// Difficulty above this no longer makes bubbles faster.
pub const SPEED_DIFFICULTY_CAP: f32 = 2.0;

/// Upper bound on bubbles created by a single spawn batch.
pub const MAX_BUBBLES_PER_SPAWN: u32 = 3;

/// Upper bound on batches created by a single `update` after a long frame.
pub const MAX_SPAWN_BATCHES_PER_UPDATE: u32 = 4;

/// Relative speed spread: 0.3 means each bubble gets 0.7x to 1.3x.
pub const BUBBLE_SPEED_VARIANCE: f32 = 0.3;

/// Chance that a fresh bubble starts on its romaji face.
pub const ROMAJI_SPAWN_PROB: f32 = 0.25;

/// Correct taps needed for a full +1 difficulty step.
pub const STREAK_FOR_LEVEL_UP: u32 = 20;

/// Difficulty ceiling reached by long streaks.
pub const MAX_DIFFICULTY: f32 = 4.0;

/// Gameplay bubble radius as a fraction of the smaller canvas side.
pub const BUBBLE_RADIUS_RATIO: f32 = 0.06;

/// Indicator radius as a fraction of the smaller canvas side.
pub const INDICATOR_RADIUS_RATIO: f32 = 0.1;

/// Gap between the top edge and the indicator rim, as a fraction of height.
pub const INDICATOR_TOP_MARGIN: f32 = 0.02;

/// Longest frame the simulation accepts; longer frames are clamped.
pub const MAX_FRAME_DT: f32 = 0.1;

const EMBEDDED_CONFIG: &str = include_str!("../../assets/config.json");

/// Errors raised while reading a configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which screen edge bubbles travel toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum TravelDirection {
    /// Spawn below the bottom edge and rise.
    #[default]
    Up,
    /// Spawn above the top edge and fall.
    Down,
}

impl TravelDirection {
    /// Sign applied to speed when advancing `y`.
    pub fn sign(self) -> f32 {
        match self {
            TravelDirection::Up => -1.0,
            TravelDirection::Down => 1.0,
        }
    }

    /// Normalized spawn `y` that keeps a bubble of normalized radius
    /// `r_norm` just outside the entry edge.
    pub fn spawn_y(self, r_norm: f32) -> f32 {
        match self {
            TravelDirection::Up => 1.0 + r_norm,
            TravelDirection::Down => -r_norm,
        }
    }

    /// Whether `y` is past the exit edge plus `margin`.
    pub fn has_exited(self, y: f32, margin: f32) -> bool {
        match self {
            TravelDirection::Up => y < -margin,
            TravelDirection::Down => y > 1.0 + margin,
        }
    }
}

/// Spawn, speed and difficulty tuning shared by the manager and the scene.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct GameConfig {
    pub spawn_interval: f32,
    pub bubble_speed: f32,
    pub speed_difficulty_cap: f32,
    pub max_bubbles_per_spawn: u32,
    pub max_spawn_batches_per_update: u32,
    pub speed_variance: f32,
    pub romaji_spawn_prob: f32,
    pub direction: TravelDirection,
    pub streak_for_level_up: u32,
    pub max_difficulty: f32,
    pub bubble_radius_ratio: f32,
    pub indicator_radius_ratio: f32,
    pub max_frame_dt: f32,
    /// Fixed seed for reproducible sessions; entropy when absent.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_interval: SPAWN_INTERVAL,
            bubble_speed: BUBBLE_SPEED,
            speed_difficulty_cap: SPEED_DIFFICULTY_CAP,
            max_bubbles_per_spawn: MAX_BUBBLES_PER_SPAWN,
            max_spawn_batches_per_update: MAX_SPAWN_BATCHES_PER_UPDATE,
            speed_variance: BUBBLE_SPEED_VARIANCE,
            romaji_spawn_prob: ROMAJI_SPAWN_PROB,
            direction: TravelDirection::default(),
            streak_for_level_up: STREAK_FOR_LEVEL_UP,
            max_difficulty: MAX_DIFFICULTY,
            bubble_radius_ratio: BUBBLE_RADIUS_RATIO,
            indicator_radius_ratio: INDICATOR_RADIUS_RATIO,
            max_frame_dt: MAX_FRAME_DT,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config bundled with the binary, falling back to defaults.
    pub fn load_embedded() -> Self {
        match Self::from_json(EMBEDDED_CONFIG) {
            Ok(config) => {
                info!("Loaded game config (seed: {:?})", config.rng_seed);
                config
            }
            Err(e) => {
                warn!("{}; using default config", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("spawn_interval", self.spawn_interval),
            ("bubble_speed", self.bubble_speed),
            ("bubble_radius_ratio", self.bubble_radius_ratio),
            ("indicator_radius_ratio", self.indicator_radius_ratio),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if self.speed_difficulty_cap < 1.0 {
            return Err(ConfigError::Invalid {
                field: "speed_difficulty_cap",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_difficulty < 1.0 {
            return Err(ConfigError::Invalid {
                field: "max_difficulty",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_bubbles_per_spawn == 0 || self.max_spawn_batches_per_update == 0 {
            return Err(ConfigError::Invalid {
                field: "max_bubbles_per_spawn",
                reason: "spawn caps must be non-zero".into(),
            });
        }
        if self.streak_for_level_up == 0 {
            return Err(ConfigError::Invalid {
                field: "streak_for_level_up",
                reason: "must be non-zero".into(),
            });
        }
        if !(0.0..1.0).contains(&self.speed_variance) {
            return Err(ConfigError::Invalid {
                field: "speed_variance",
                reason: "must be in [0, 1)".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.romaji_spawn_prob) {
            return Err(ConfigError::Invalid {
                field: "romaji_spawn_prob",
                reason: "must be a probability".into(),
            });
        }
        Ok(())
    }
}
