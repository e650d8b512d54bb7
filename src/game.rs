//! Game loop orchestrator
//!
//! One frame: poll input, tick the simulation by the wall-clock time since the
//! previous frame, forward audible events, draw, then pad to the tick rate.

use glam::Vec2;

use crate::audio::SoundBank;
use crate::config::GameConfig;
use crate::consts::AXIS_MAX;
use crate::error::GameError;
use crate::platform::{AudioSink, Clock, FontId, InputEvent, InputSource, Key, Rate, Renderer};
use crate::sim::{CarSprites, GameEvent, GameState, RacePhase, Sprite, Sprites, TickInput, tick};

const ORDINALS: [&str; 3] = ["1st", "2nd", "3rd"];
const HUD_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const HUD_LINE: f32 = 20.0;

/// Input gathered for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub tick: TickInput,
    pub quit: bool,
}

/// A running session wired to its collaborators
pub struct Game<R: Renderer, A: AudioSink, I: InputSource, C: Clock> {
    state: GameState,
    renderer: R,
    audio: A,
    input: I,
    clock: C,
    sounds: SoundBank,
    font: FontId,
    last_time: f64,
    quit: bool,
}

fn load_sprite(renderer: &mut impl Renderer, path: &str) -> Result<Sprite, GameError> {
    let (texture, size) = renderer.load_texture(path)?;
    Ok(Sprite { texture, size })
}

/// Resolve every texture named in the config
pub fn load_sprites(renderer: &mut impl Renderer, config: &GameConfig) -> Result<Sprites, GameError> {
    let cars = config
        .cars
        .iter()
        .map(|car| {
            Ok(CarSprites {
                body: load_sprite(renderer, &car.body_texture)?,
                front_wheel: load_sprite(renderer, &car.front_wheel_texture)?,
                back_wheel: load_sprite(renderer, &car.back_wheel_texture)?,
            })
        })
        .collect::<Result<Vec<_>, GameError>>()?;
    let fish = config
        .fish_textures
        .iter()
        .map(|path| load_sprite(renderer, path))
        .collect::<Result<Vec<_>, GameError>>()?;
    Ok(Sprites {
        cars,
        candy: load_sprite(renderer, &config.candy_texture)?,
        bubble: load_sprite(renderer, &config.bubble_texture)?,
        fish,
    })
}

/// Podium lines for the end screen, best first
pub fn podium_lines(scores: &[u32], ranks: &[Option<usize>]) -> Vec<String> {
    let mut placed: Vec<(usize, usize)> = ranks
        .iter()
        .enumerate()
        .filter_map(|(car, rank)| rank.map(|r| (r, car)))
        .collect();
    placed.sort_unstable();
    placed
        .into_iter()
        .map(|(rank, car)| {
            let score = scores.get(car).copied().unwrap_or(0);
            format!("{}: Player {} ({})", ORDINALS[rank.min(2)], car + 1, score)
        })
        .collect()
}

impl<R: Renderer, A: AudioSink, I: InputSource, C: Clock> Game<R, A, I, C> {
    /// Load every asset and build the session.
    ///
    /// Any asset failure aborts here; no game state is created.
    pub fn load(
        config: GameConfig,
        seed: u64,
        mut renderer: R,
        mut audio: A,
        input: I,
        clock: C,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let sprites = load_sprites(&mut renderer, &config)?;
        let font = renderer.load_font(&config.font)?;
        let sounds = SoundBank::load(&mut audio, &config.sounds)?;
        let mut state = GameState::new(config, &sprites, seed)?;

        let initial = state.take_events();
        for event in &initial {
            sounds.dispatch(&mut audio, event);
        }

        let last_time = clock.now();
        log::info!("Game loaded (seed {})", seed);
        Ok(Self {
            state,
            renderer,
            audio,
            input,
            clock,
            sounds,
            font,
            last_time,
            quit: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    /// Map raw events to controls. Unknown keys, axes and devices are ignored.
    pub fn translate(&self, events: &[InputEvent]) -> FrameInput {
        let config = &self.state.config;
        let (advance, turn) = (config.key_advance_step, config.key_turn_step);
        let mut frame = FrameInput::default();

        for event in events {
            match *event {
                InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => frame.quit = true,
                InputEvent::KeyDown(Key::R) | InputEvent::KeyDown(Key::Return) => {
                    frame.tick.restart = true
                }
                InputEvent::KeyDown(Key::Up) => frame.tick.control_mut(0).advance += advance,
                InputEvent::KeyDown(Key::Down) => frame.tick.control_mut(0).advance -= advance,
                InputEvent::KeyDown(Key::Left) => frame.tick.control_mut(0).turn += turn,
                InputEvent::KeyDown(Key::Right) => frame.tick.control_mut(0).turn -= turn,
                InputEvent::KeyDown(Key::W) => frame.tick.control_mut(1).advance += advance,
                InputEvent::KeyDown(Key::S) => frame.tick.control_mut(1).advance -= advance,
                InputEvent::KeyDown(Key::A) => frame.tick.control_mut(1).turn += turn,
                InputEvent::KeyDown(Key::D) => frame.tick.control_mut(1).turn -= turn,
                InputEvent::KeyDown(Key::Other(code)) => {
                    log::trace!("Ignoring key {}", code);
                }
                InputEvent::AxisMotion {
                    device,
                    axis,
                    value,
                } => self.apply_axis(&mut frame.tick, device as usize, axis, value),
            }
        }
        frame
    }

    fn apply_axis(&self, input: &mut TickInput, car: usize, axis: u8, value: i16) {
        let Some(current) = self.state.cars.get(car).map(|c| c.body.acceleration) else {
            log::trace!("Ignoring axis motion from unknown device {}", car);
            return;
        };
        let scaled = (value as f32 / AXIS_MAX).clamp(-1.0, 1.0) * self.state.config.joystick_accel;
        let control = input.control_mut(car);
        let mut accel = control.accel.unwrap_or(current);
        match axis {
            0 => accel.x = scaled,
            1 => accel.y = scaled,
            _ => {
                log::trace!("Ignoring axis {} on device {}", axis, car);
                return;
            }
        }
        control.accel = Some(accel);
    }

    /// Run one frame. Returns false once quit was requested.
    pub fn step(&mut self) -> bool {
        let events = self.input.poll_events();
        let frame = self.translate(&events);
        if frame.quit {
            log::info!("Quit requested");
            self.quit = true;
            return false;
        }

        let now = self.clock.now();
        let dt = (now - self.last_time).max(0.0) as f32;
        self.last_time = now;

        let events = tick(&mut self.state, &frame.tick, dt);
        self.dispatch(&events);
        self.render();
        true
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            self.sounds.dispatch(&mut self.audio, event);
        }
    }

    /// Loop at the configured tick rate until quit
    pub fn run(&mut self) {
        let mut rate = Rate::new(self.state.config.tick_rate_hz as f64, &self.clock);
        while self.step() {
            rate.sleep(&self.clock);
        }
        log::info!("Stopped after {} ticks", self.state.time_ticks);
    }

    /// HUD lines for the current phase
    pub fn hud_lines(&self) -> Vec<String> {
        let race = &self.state.race;
        let mut lines: Vec<String> = race
            .scores
            .iter()
            .enumerate()
            .map(|(car, score)| format!("Player {}: {}", car + 1, score))
            .collect();
        let secs = race.time_left().map(|t| t.ceil().max(0.0) as u32);
        match (race.phase, secs) {
            (RacePhase::Countdown, Some(s)) => lines.push(format!("Get ready: {}", s)),
            (RacePhase::Race, Some(s)) => lines.push(format!("Time left: {}", s)),
            (RacePhase::RaceOver, _) => {
                lines.extend(podium_lines(&race.scores, &race.ranks));
                lines.push("Press R to restart".to_string());
            }
            _ => {}
        }
        lines
    }

    fn render(&mut self) {
        let hud = self.hud_lines();
        let state = &self.state;
        let r = &mut self.renderer;
        r.clear();

        for fish in &state.fish {
            r.draw_sprite(fish.sprite.texture, fish.body.position, fish.body.orientation, 1.0);
        }

        if !state.candy.is_off_stage() {
            let candy = &state.candy;
            r.draw_sprite(candy.sprite.texture, candy.body.position, candy.body.orientation, 1.0);
        }

        for car in &state.cars {
            let angle = car.body.orientation;
            r.draw_sprite(car.sprite.texture, car.body.position, angle, 1.0);
            r.draw_sprite(
                car.front_wheel.sprite.texture,
                car.front_wheel_position(),
                angle + car.front_wheel.angle,
                1.0,
            );
            r.draw_sprite(
                car.back_wheel.sprite.texture,
                car.back_wheel_position(),
                angle + car.back_wheel.angle,
                1.0,
            );
        }

        let bubble_extent = state.bubble_sprite.size.max_element();
        for bubble in &state.bubbles.bubbles {
            let scale = if bubble_extent > 0.0 {
                bubble.body.radius * 2.0 / bubble_extent
            } else {
                1.0
            };
            r.draw_sprite(state.bubble_sprite.texture, bubble.body.position, 0.0, scale);
        }

        for (i, line) in hud.iter().enumerate() {
            r.draw_text(self.font, line, HUD_ORIGIN + Vec2::new(0.0, HUD_LINE * i as f32));
        }
        r.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{HeadlessAudio, HeadlessRenderer, ManualClock, ScriptedInput};

    type TestGame = Game<HeadlessRenderer, HeadlessAudio, ScriptedInput, ManualClock>;

    fn new_game() -> (TestGame, ScriptedInput, ManualClock) {
        let input = ScriptedInput::new();
        let clock = ManualClock::new();
        let game = Game::load(
            GameConfig::default(),
            5,
            HeadlessRenderer::new(),
            HeadlessAudio::new(),
            input.clone(),
            clock.clone(),
        )
        .unwrap();
        (game, input, clock)
    }

    #[test]
    fn test_podium_lines_order_by_rank() {
        let lines = podium_lines(&[3, 5, 5, 1], &[Some(1), Some(0), Some(0), Some(2)]);
        assert_eq!(
            lines,
            vec![
                "1st: Player 2 (5)",
                "1st: Player 3 (5)",
                "2nd: Player 1 (3)",
                "3rd: Player 4 (1)",
            ]
        );
        assert!(podium_lines(&[0], &[None]).is_empty());
    }

    #[test]
    fn test_keys_map_to_cars() {
        let (game, _, _) = new_game();
        let frame = game.translate(&[
            InputEvent::KeyDown(Key::Up),
            InputEvent::KeyDown(Key::Up),
            InputEvent::KeyDown(Key::Left),
            InputEvent::KeyDown(Key::D),
            InputEvent::KeyDown(Key::S),
            InputEvent::KeyDown(Key::Other(42)),
        ]);
        assert!(!frame.quit && !frame.tick.restart);
        assert_eq!(frame.tick.cars[0].advance, 20.0);
        assert!((frame.tick.cars[0].turn - 0.1).abs() < 1e-6);
        assert_eq!(frame.tick.cars[1].advance, -10.0);
        assert!((frame.tick.cars[1].turn + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_restart_and_quit_keys() {
        let (game, _, _) = new_game();
        assert!(game.translate(&[InputEvent::KeyDown(Key::Return)]).tick.restart);
        assert!(game.translate(&[InputEvent::KeyDown(Key::R)]).tick.restart);
        assert!(game.translate(&[InputEvent::KeyDown(Key::Escape)]).quit);
        assert!(game.translate(&[InputEvent::Quit]).quit);
    }

    #[test]
    fn test_axis_motion_scales_and_keeps_other_axis() {
        let (game, _, _) = new_game();
        let frame = game.translate(&[
            InputEvent::AxisMotion {
                device: 1,
                axis: 0,
                value: i16::MAX,
            },
            InputEvent::AxisMotion {
                device: 1,
                axis: 1,
                value: -16384,
            },
            InputEvent::AxisMotion {
                device: 7,
                axis: 0,
                value: 100,
            },
            InputEvent::AxisMotion {
                device: 0,
                axis: 4,
                value: 100,
            },
        ]);
        let accel = frame.tick.cars[1].accel.unwrap();
        assert!((accel.x - 200.0).abs() < 1e-3);
        assert!((accel.y + 100.0).abs() < 0.1);
        assert_eq!(frame.tick.cars[0].accel, None);
        assert_eq!(frame.tick.cars.len(), 2);
    }

    #[test]
    fn test_step_uses_clock_delta() {
        let (mut game, _, clock) = new_game();
        clock.advance(0.5);
        assert!(game.step());
        assert!((game.state().time - 0.5).abs() < 1e-6);
        assert!(game.step());
        assert!((game.state().time - 0.5).abs() < 1e-6);
        assert_eq!(game.state().time_ticks, 2);
    }

    #[test]
    fn test_render_draws_cars_and_hud() {
        let (mut game, _, clock) = new_game();
        clock.advance(0.05);
        game.step();
        let frame = game.renderer().last_frame();
        let sprites = frame
            .iter()
            .filter(|c| matches!(c, crate::platform::headless::DrawCall::Sprite { .. }))
            .count();
        // Two cars with two wheels each, plus fish
        assert!(sprites >= 6 + game.state().fish.len());
        let texts = game.renderer().last_texts();
        assert_eq!(texts[0], "Player 1: 0");
        assert!(texts.iter().any(|t| t.starts_with("Get ready")));
    }

    #[test]
    fn test_quit_stops_run() {
        let (mut game, input, clock) = new_game();
        input.push(vec![]);
        input.push(vec![]);
        input.push(vec![InputEvent::Quit]);
        game.run();
        assert!(game.is_quit());
        assert_eq!(game.state().time_ticks, 2);
        // Two padded periods at 20 Hz
        assert!((clock.now() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_texture_aborts_load() {
        let config = GameConfig::default();
        let renderer = HeadlessRenderer::new().with_missing(&config.candy_texture);
        let result = Game::load(
            config,
            1,
            renderer,
            HeadlessAudio::new(),
            ScriptedInput::new(),
            ManualClock::new(),
        );
        assert!(matches!(result, Err(GameError::AssetLoad { .. })));
    }
}
