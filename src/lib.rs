//! Candy Racers - a top-down candy-collecting race
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, spawning, race state)
//! - `platform`: Rendering/audio/input/clock collaborator abstractions
//! - `game`: Fixed-rate loop tying the simulation to the platform
//! - `config`: Data-driven tuning and asset paths

pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod platform;
pub mod sim;

pub use config::GameConfig;
pub use error::GameError;
pub use game::Game;

use glam::Vec2;

/// Default tuning constants (mirrored by `GameConfig::default`)
pub mod consts {
    /// Loop rate of the reference game (ticks per second)
    pub const TICK_RATE_HZ: f32 = 20.0;

    /// Play area dimensions
    pub const PLAY_WIDTH: f32 = 800.0;
    pub const PLAY_HEIGHT: f32 = 800.0;

    /// Race timing (seconds)
    pub const COUNTDOWN_LENGTH: f32 = 5.0;
    pub const GAME_LENGTH: f32 = 15.0;
    /// Pre-start beeps fire at or below this many seconds left in the countdown
    pub const PRESTART_CUE_SECS: f32 = 3.0;
    /// "Last lap" fires once when race time left drops through this value
    pub const LAST_LAP_SECS: f32 = 9.0;
    /// Final countdown beeps fire at or below this many seconds left in the race
    pub const FINAL_COUNTDOWN_SECS: f32 = 5.0;

    /// Speed cap applied when a car touches a wall
    pub const WALL_SPEED_CAP: f32 = 100.0;
    /// Acceleration pushing a car back inside when it touches a wall
    pub const WALL_BOUNCE_ACCEL: f32 = 100.0;
    /// Below this speed the car keeps its current orientation
    pub const ORIENTATION_SPEED_THRESHOLD: f32 = 10.0;
    /// Wheel spin rate = speed / divisor
    pub const WHEEL_SPIN_DIVISOR: f32 = 10.0;

    /// Candy must land farther than `width * fraction` from cars and its old spot
    pub const CANDY_SEPARATION_FRACTION: f32 = 1.0 / 3.0;
    /// Candy spawns inside the play area shrunk by this fraction on each side
    pub const CANDY_MARGIN_FRACTION: f32 = 0.1;
    pub const MAX_RESPAWN_ATTEMPTS: u32 = 100;
    /// Candy drifts left and respawns once it reaches x <= 0
    pub const CANDY_DRIFT_X: f32 = -15.0;

    /// Exhaust emission: `uniform(0, K) + |accel| > threshold`
    pub const EXHAUST_RANDOM_RANGE: f32 = 200.0;
    pub const EXHAUST_THRESHOLD: f32 = 190.0;
    pub const EXHAUST_BUBBLE_BASE_RADIUS: f32 = 2.0;
    pub const EXHAUST_BUBBLE_ACCEL_FACTOR: f32 = 0.025;

    /// Bubble motion
    pub const BUBBLE_AMPLITUDE: f32 = 20.0;
    pub const BUBBLE_RISE_SPEED: f32 = 40.0;
    pub const BUBBLE_RISE_JITTER: f32 = 20.0;
    /// Ambient bubbles seeded from the bottom edge, per second
    pub const AMBIENT_BUBBLE_RATE: f32 = 1.5;

    /// Fish
    pub const FISH_COUNT: usize = 4;
    pub const FISH_MIN_SPEED: f32 = 20.0;
    pub const FISH_MAX_SPEED: f32 = 60.0;

    /// Discrete keyboard controls
    pub const KEY_ADVANCE_STEP: f32 = 10.0;
    pub const KEY_TURN_STEP: f32 = 0.1;
    /// Full joystick deflection maps to this acceleration
    pub const JOYSTICK_ACCEL: f32 = 200.0;
    /// Raw axis range reported by the input layer
    pub const AXIS_MAX: f32 = 32767.0;

    /// Far-off position that takes the candy out of play
    pub const OFF_STAGE: f32 = -10_000.0;
}

/// Below this magnitude a vector is treated as zero
pub const NORM_EPSILON: f32 = 1e-6;

/// Rotate a vector by `angle` radians (counter-clockwise in math coordinates)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// Rescale `v` to `norm`, leaving it unchanged if it is (numerically) zero
#[inline]
pub fn renorm(v: Vec2, norm: f32) -> Vec2 {
    let current = v.length();
    if current.abs() < NORM_EPSILON {
        return v;
    }
    v * (norm / current)
}

/// Heading of a vector, `atan2(y, x)`
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}
