//! Game configuration and tuning
//!
//! Every magic number of the race lives here so it can be tuned from a JSON
//! file without recompiling. Missing keys fall back to `crate::consts`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// Sprites and part layout of one car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarSetup {
    pub body_texture: String,
    pub front_wheel_texture: String,
    pub back_wheel_texture: String,
    /// Spawn position in the play area
    pub start: Vec2,
    /// Wheel and exhaust offsets in body-local coordinates, relative to the body center
    pub front_wheel_offset: Vec2,
    pub back_wheel_offset: Vec2,
    pub exhaust_offset: Vec2,
}

impl CarSetup {
    fn named(name: &str, start: Vec2) -> Self {
        Self {
            body_texture: format!("models/{name}.png"),
            front_wheel_texture: format!("models/{name}_front_wheel.png"),
            back_wheel_texture: format!("models/{name}_back_wheel.png"),
            start,
            front_wheel_offset: Vec2::new(40.0, 12.0),
            back_wheel_offset: Vec2::new(-40.0, 12.0),
            exhaust_offset: Vec2::new(-60.0, 0.0),
        }
    }
}

/// Sound effect and music file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundPaths {
    pub countdown_beep: String,
    pub race_start: String,
    pub pickup: String,
    pub last_lap: String,
    pub final_countdown: String,
    pub finish: String,
    pub music: String,
}

impl Default for SoundPaths {
    fn default() -> Self {
        Self {
            countdown_beep: "sounds/beep.wav".into(),
            race_start: "sounds/start.wav".into(),
            pickup: "sounds/pickup.wav".into(),
            last_lap: "sounds/last_lap.wav".into(),
            final_countdown: "sounds/tick.wav".into(),
            finish: "sounds/finish.wav".into(),
            music: "sounds/music.ogg".into(),
        }
    }
}

/// Full game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Play area and loop ===
    pub width: f32,
    pub height: f32,
    pub tick_rate_hz: f32,

    // === Race timing ===
    pub countdown_length: f32,
    pub game_length: f32,
    pub prestart_cue_secs: f32,
    pub last_lap_secs: f32,
    pub final_countdown_secs: f32,

    // === Car handling ===
    pub wall_speed_cap: f32,
    pub wall_bounce_accel: f32,
    pub orientation_speed_threshold: f32,
    pub wheel_spin_divisor: f32,
    pub key_advance_step: f32,
    pub key_turn_step: f32,
    pub joystick_accel: f32,

    // === Exhaust ===
    pub exhaust_random_range: f32,
    pub exhaust_threshold: f32,
    pub exhaust_bubble_base_radius: f32,
    pub exhaust_bubble_accel_factor: f32,

    // === Candy ===
    pub candy_separation_fraction: f32,
    pub candy_margin_fraction: f32,
    pub max_respawn_attempts: u32,
    pub candy_drift: Vec2,

    // === Ambient life ===
    pub fish_count: usize,
    pub fish_min_speed: f32,
    pub fish_max_speed: f32,
    pub bubble_amplitude: f32,
    pub bubble_rise_speed: f32,
    pub bubble_rise_jitter: f32,
    pub ambient_bubble_rate: f32,

    // === Assets ===
    pub cars: Vec<CarSetup>,
    pub candy_texture: String,
    pub bubble_texture: String,
    pub fish_textures: Vec<String>,
    /// HUD font
    pub font: String,
    pub sounds: SoundPaths,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: PLAY_WIDTH,
            height: PLAY_HEIGHT,
            tick_rate_hz: TICK_RATE_HZ,

            countdown_length: COUNTDOWN_LENGTH,
            game_length: GAME_LENGTH,
            prestart_cue_secs: PRESTART_CUE_SECS,
            last_lap_secs: LAST_LAP_SECS,
            final_countdown_secs: FINAL_COUNTDOWN_SECS,

            wall_speed_cap: WALL_SPEED_CAP,
            wall_bounce_accel: WALL_BOUNCE_ACCEL,
            orientation_speed_threshold: ORIENTATION_SPEED_THRESHOLD,
            wheel_spin_divisor: WHEEL_SPIN_DIVISOR,
            key_advance_step: KEY_ADVANCE_STEP,
            key_turn_step: KEY_TURN_STEP,
            joystick_accel: JOYSTICK_ACCEL,

            exhaust_random_range: EXHAUST_RANDOM_RANGE,
            exhaust_threshold: EXHAUST_THRESHOLD,
            exhaust_bubble_base_radius: EXHAUST_BUBBLE_BASE_RADIUS,
            exhaust_bubble_accel_factor: EXHAUST_BUBBLE_ACCEL_FACTOR,

            candy_separation_fraction: CANDY_SEPARATION_FRACTION,
            candy_margin_fraction: CANDY_MARGIN_FRACTION,
            max_respawn_attempts: MAX_RESPAWN_ATTEMPTS,
            candy_drift: Vec2::new(CANDY_DRIFT_X, 0.0),

            fish_count: FISH_COUNT,
            fish_min_speed: FISH_MIN_SPEED,
            fish_max_speed: FISH_MAX_SPEED,
            bubble_amplitude: BUBBLE_AMPLITUDE,
            bubble_rise_speed: BUBBLE_RISE_SPEED,
            bubble_rise_jitter: BUBBLE_RISE_JITTER,
            ambient_bubble_rate: AMBIENT_BUBBLE_RATE,

            cars: vec![
                CarSetup::named("arnaud", Vec2::new(200.0, 200.0)),
                CarSetup::named("unai", Vec2::new(200.0, 400.0)),
            ],
            candy_texture: "models/candy.png".into(),
            bubble_texture: "models/bubble.png".into(),
            fish_textures: vec!["models/fish1.png".into(), "models/fish2.png".into()],
            font: "fonts/DejaVuSans.ttf".into(),
            sounds: SoundPaths::default(),
        }
    }
}

impl GameConfig {
    /// Parse a configuration from JSON; absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize for writing a starter config file
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("tick_rate_hz", self.tick_rate_hz),
            ("countdown_length", self.countdown_length),
            ("game_length", self.game_length),
            ("wall_speed_cap", self.wall_speed_cap),
            ("wheel_spin_divisor", self.wheel_spin_divisor),
            ("exhaust_random_range", self.exhaust_random_range),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(GameError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if self.cars.is_empty() {
            return Err(GameError::Config("at least one car is required".into()));
        }
        if self.max_respawn_attempts == 0 {
            return Err(GameError::Config("max_respawn_attempts must be at least 1".into()));
        }
        if !(0.0..0.5).contains(&self.candy_margin_fraction) {
            return Err(GameError::Config(format!(
                "candy_margin_fraction must be in [0, 0.5), got {}",
                self.candy_margin_fraction
            )));
        }
        if self.fish_min_speed < 0.0 || self.fish_min_speed > self.fish_max_speed {
            return Err(GameError::Config(format!(
                "fish speed range [{}, {}] is invalid",
                self.fish_min_speed, self.fish_max_speed
            )));
        }
        if self.fish_count > 0 && self.fish_textures.is_empty() {
            return Err(GameError::Config("fish_count > 0 needs at least one fish texture".into()));
        }
        if self.bubble_rise_jitter < 0.0 || self.ambient_bubble_rate < 0.0 {
            return Err(GameError::Config("bubble rates must not be negative".into()));
        }
        Ok(())
    }

    /// Target duration of one loop iteration
    pub fn tick_period(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cars.len(), 2);
        assert!((config.tick_period() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "game_length": 30.0, "width": 640 }"#).unwrap();
        assert_eq!(config.game_length, 30.0);
        assert_eq!(config.width, 640.0);
        assert_eq!(config.countdown_length, COUNTDOWN_LENGTH);
        assert_eq!(config.max_respawn_attempts, MAX_RESPAWN_ATTEMPTS);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(GameConfig::from_json(r#"{ "width": 0 }"#).is_err());
        assert!(GameConfig::from_json(r#"{ "cars": [] }"#).is_err());
        assert!(GameConfig::from_json(r#"{ "fish_min_speed": 90, "fish_max_speed": 10 }"#).is_err());
        assert!(GameConfig::from_json(r#"{ "max_respawn_attempts": 0 }"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_roundtrip_preserves_cars() {
        let config = GameConfig::default();
        let json = config.to_json().unwrap();
        let back = GameConfig::from_json(&json).unwrap();
        assert_eq!(back.cars.len(), config.cars.len());
        assert_eq!(back.cars[1].start, config.cars[1].start);
        assert_eq!(back.sounds.music, config.sounds.music);
    }
}
