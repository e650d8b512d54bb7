//! Platform abstraction layer
//!
//! The simulation never touches a window, a sound card or the wall clock.
//! Those live behind the traits here:
//! - `Renderer`: texture/font loading and sprite/text drawing
//! - `AudioSink`: sound loading and playback
//! - `InputSource`: non-blocking event polling
//! - `Clock`: monotonic time and sleeping
//!
//! `headless` provides implementations that log and record instead of
//! drawing, used by the demo binary and the tests.

pub mod headless;

use std::time::{Duration, Instant};

use glam::Vec2;

use crate::error::GameError;
use crate::sim::TextureId;

/// Handle to a font loaded by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// Handle to a sound loaded by the audio sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub u32);

/// Drawing collaborator
pub trait Renderer {
    /// Load a texture, returning its handle and pixel size
    fn load_texture(&mut self, path: &str) -> Result<(TextureId, Vec2), GameError>;

    fn load_font(&mut self, path: &str) -> Result<FontId, GameError>;

    /// Start a new frame
    fn clear(&mut self);

    /// Draw a sprite centered on `position`
    fn draw_sprite(&mut self, texture: TextureId, position: Vec2, rotation: f32, scale: f32);

    /// Draw text with its top-left corner at `position`
    fn draw_text(&mut self, font: FontId, text: &str, position: Vec2);

    /// Show the finished frame
    fn present(&mut self);
}

/// Sound collaborator
pub trait AudioSink {
    fn load_sound(&mut self, path: &str) -> Result<SoundId, GameError>;
    fn play_sound(&mut self, sound: SoundId);
    /// Start looping background music
    fn play_music(&mut self, sound: SoundId);
    fn stop_music(&mut self);
}

/// Keys the game reacts to. Anything else arrives as `Other` and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    R,
    Return,
    Escape,
    Other(u32),
}

/// A raw input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    /// Joystick axis moved; `value` spans the full i16 range
    AxisMotion { device: u32, axis: u8, value: i16 },
}

/// Input collaborator; polling never blocks
pub trait InputSource {
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// Monotonic time source
pub trait Clock {
    /// Seconds since an arbitrary fixed origin
    fn now(&self) -> f64;

    /// Block for `secs` seconds
    fn sleep(&self, secs: f64);
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&self, secs: f64) {
        if secs > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(secs));
        }
    }
}

/// Stopwatch over a `Clock`
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: f64,
}

impl Timer {
    pub fn start(clock: &impl Clock) -> Self {
        Self { start: clock.now() }
    }

    pub fn reset(&mut self, clock: &impl Clock) {
        self.start = clock.now();
    }

    /// Seconds since creation or the last reset
    pub fn elapsed(&self, clock: &impl Clock) -> f64 {
        (clock.now() - self.start).max(0.0)
    }
}

/// Pads each loop iteration to a fixed period
#[derive(Debug, Clone, Copy)]
pub struct Rate {
    period: f64,
    timer: Timer,
}

impl Rate {
    pub fn new(hz: f64, clock: &impl Clock) -> Self {
        Self {
            period: 1.0 / hz,
            timer: Timer::start(clock),
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Sleep off whatever is left of the period since the previous call.
    ///
    /// Returns the time slept; an iteration that overran does not sleep.
    pub fn sleep(&mut self, clock: &impl Clock) -> f64 {
        let left = self.period - self.timer.elapsed(clock);
        let slept = left.max(0.0);
        clock.sleep(slept);
        self.timer.reset(clock);
        slept
    }
}
