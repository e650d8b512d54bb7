//! Collaborators without a window or a sound card
//!
//! They log what a real backend would do and record it so a run can be
//! inspected afterwards.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use glam::Vec2;

use super::{AudioSink, Clock, FontId, InputEvent, InputSource, Renderer, SoundId};
use crate::error::{AssetKind, GameError};
use crate::sim::TextureId;

/// Size reported for textures without an explicit size
pub const DEFAULT_TEXTURE_SIZE: Vec2 = Vec2::new(64.0, 32.0);

/// One recorded draw
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Sprite {
        texture: TextureId,
        position: Vec2,
        rotation: f32,
        scale: f32,
    },
    Text {
        font: FontId,
        text: String,
        position: Vec2,
    },
}

/// Renderer that records the last presented frame
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    textures: Vec<String>,
    fonts: Vec<String>,
    sizes: HashMap<String, Vec2>,
    missing: HashSet<String>,
    frame: Vec<DrawCall>,
    presented: Vec<DrawCall>,
    frames: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `size` for the texture at `path`
    pub fn with_size(mut self, path: &str, size: Vec2) -> Self {
        self.sizes.insert(path.to_string(), size);
        self
    }

    /// Make loading `path` fail
    pub fn with_missing(mut self, path: &str) -> Self {
        self.missing.insert(path.to_string());
        self
    }

    /// Draw calls of the last presented frame
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.presented
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn texture_path(&self, texture: TextureId) -> Option<&str> {
        self.textures.get(texture.0 as usize).map(String::as_str)
    }

    /// Texts of the last presented frame
    pub fn last_texts(&self) -> Vec<&str> {
        self.presented
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                DrawCall::Sprite { .. } => None,
            })
            .collect()
    }
}

impl Renderer for HeadlessRenderer {
    fn load_texture(&mut self, path: &str) -> Result<(TextureId, Vec2), GameError> {
        if self.missing.contains(path) {
            return Err(GameError::asset(AssetKind::Texture, path, "file not found"));
        }
        let id = TextureId(self.textures.len() as u32);
        let size = self.sizes.get(path).copied().unwrap_or(DEFAULT_TEXTURE_SIZE);
        self.textures.push(path.to_string());
        log::debug!("Texture {} -> {:?} ({}x{})", path, id, size.x, size.y);
        Ok((id, size))
    }

    fn load_font(&mut self, path: &str) -> Result<FontId, GameError> {
        if self.missing.contains(path) {
            return Err(GameError::asset(AssetKind::Font, path, "file not found"));
        }
        let id = FontId(self.fonts.len() as u32);
        self.fonts.push(path.to_string());
        log::debug!("Font {} -> {:?}", path, id);
        Ok(id)
    }

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn draw_sprite(&mut self, texture: TextureId, position: Vec2, rotation: f32, scale: f32) {
        self.frame.push(DrawCall::Sprite {
            texture,
            position,
            rotation,
            scale,
        });
    }

    fn draw_text(&mut self, font: FontId, text: &str, position: Vec2) {
        self.frame.push(DrawCall::Text {
            font,
            text: text.to_string(),
            position,
        });
    }

    fn present(&mut self) {
        self.frames += 1;
        log::trace!("Frame {}: {} draw calls", self.frames, self.frame.len());
        self.presented = std::mem::take(&mut self.frame);
    }
}

/// What the audio sink was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Play(String),
    MusicStart(String),
    MusicStop,
}

/// Audio sink that only records
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    sounds: Vec<String>,
    missing: HashSet<String>,
    calls: Vec<AudioCall>,
    music: Option<SoundId>,
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(mut self, path: &str) -> Self {
        self.missing.insert(path.to_string());
        self
    }

    pub fn calls(&self) -> &[AudioCall] {
        &self.calls
    }

    pub fn music_playing(&self) -> bool {
        self.music.is_some()
    }

    fn path(&self, sound: SoundId) -> String {
        self.sounds
            .get(sound.0 as usize)
            .cloned()
            .unwrap_or_else(|| format!("<unknown sound {}>", sound.0))
    }
}

impl AudioSink for HeadlessAudio {
    fn load_sound(&mut self, path: &str) -> Result<SoundId, GameError> {
        if self.missing.contains(path) {
            return Err(GameError::asset(AssetKind::Sound, path, "file not found"));
        }
        let id = SoundId(self.sounds.len() as u32);
        self.sounds.push(path.to_string());
        log::debug!("Sound {} -> {:?}", path, id);
        Ok(id)
    }

    fn play_sound(&mut self, sound: SoundId) {
        let path = self.path(sound);
        log::debug!("Play {}", path);
        self.calls.push(AudioCall::Play(path));
    }

    fn play_music(&mut self, sound: SoundId) {
        let path = self.path(sound);
        log::debug!("Music start {}", path);
        self.music = Some(sound);
        self.calls.push(AudioCall::MusicStart(path));
    }

    fn stop_music(&mut self) {
        if self.music.take().is_some() {
            log::debug!("Music stop");
        }
        self.calls.push(AudioCall::MusicStop);
    }
}

/// Input fed from a script; clones share the same queue
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: Rc<RefCell<VecDeque<Vec<InputEvent>>>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the events returned by one future poll
    pub fn push(&self, events: Vec<InputEvent>) {
        self.queue.borrow_mut().push_back(events);
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.queue.borrow_mut().pop_front().unwrap_or_default()
    }
}

/// Clock that only moves when told to; sleeping advances it.
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn sleep(&self, secs: f64) {
        self.advance(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_records_presented_frame() {
        let mut renderer = HeadlessRenderer::new().with_size("car.png", Vec2::new(80.0, 40.0));
        let (car, size) = renderer.load_texture("car.png").unwrap();
        let (other, default) = renderer.load_texture("other.png").unwrap();
        assert_eq!(size, Vec2::new(80.0, 40.0));
        assert_eq!(default, DEFAULT_TEXTURE_SIZE);
        assert_ne!(car, other);
        let font = renderer.load_font("font.ttf").unwrap();

        renderer.clear();
        renderer.draw_sprite(car, Vec2::new(1.0, 2.0), 0.5, 1.0);
        renderer.draw_text(font, "hello", Vec2::ZERO);
        assert!(renderer.last_frame().is_empty());
        renderer.present();
        assert_eq!(renderer.last_frame().len(), 2);
        assert_eq!(renderer.last_texts(), vec!["hello"]);
        assert_eq!(renderer.texture_path(car), Some("car.png"));
    }

    #[test]
    fn test_missing_assets_fail() {
        let mut renderer = HeadlessRenderer::new().with_missing("gone.png");
        let err = renderer.load_texture("gone.png").unwrap_err();
        assert!(matches!(
            err,
            GameError::AssetLoad {
                kind: AssetKind::Texture,
                ..
            }
        ));
        let mut audio = HeadlessAudio::new().with_missing("gone.wav");
        assert!(audio.load_sound("gone.wav").is_err());
    }

    #[test]
    fn test_audio_tracks_music() {
        let mut audio = HeadlessAudio::new();
        let music = audio.load_sound("music.ogg").unwrap();
        audio.play_music(music);
        assert!(audio.music_playing());
        audio.stop_music();
        assert!(!audio.music_playing());
        assert_eq!(
            audio.calls(),
            &[AudioCall::MusicStart("music.ogg".into()), AudioCall::MusicStop]
        );
    }

    #[test]
    fn test_scripted_input_shares_queue() {
        let script = ScriptedInput::new();
        let mut input = script.clone();
        script.push(vec![InputEvent::Quit]);
        assert_eq!(input.poll_events(), vec![InputEvent::Quit]);
        assert!(input.poll_events().is_empty());
    }
}
