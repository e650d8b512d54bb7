//! Session state and core simulation types
//!
//! The session exclusively owns every entity and the race state. Entities
//! refer to textures by [`TextureId`] only; the textures themselves stay with
//! the rendering layer.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::PlayArea;
use super::car::Car;
use super::race::{RacePhase, RaceState, RaceTiming};
use super::spawn::{BubblePool, Candy, Fish};
use crate::config::GameConfig;
use crate::error::GameError;

/// Handle to a texture loaded by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// A texture handle together with its extent in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub texture: TextureId,
    pub size: Vec2,
}

/// Sprites making up one car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarSprites {
    pub body: Sprite,
    pub front_wheel: Sprite,
    pub back_wheel: Sprite,
}

/// Every sprite the session needs, resolved at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprites {
    pub cars: Vec<CarSprites>,
    pub candy: Sprite,
    pub bubble: Sprite,
    pub fish: Vec<Sprite>,
}

/// Something that happened during a tick, for audio/UI or the session itself
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Race state machine changed phase
    PhaseChanged(RacePhase),
    /// Whole seconds left before the start (at most the pre-start threshold)
    CountdownTick(u32),
    RaceStarted,
    /// Remaining race time just dropped through the last-lap threshold
    LastLap,
    /// Whole seconds left in the race (at most the final countdown threshold)
    FinalCountdownTick(u32),
    /// A car picked up the candy
    CandyCollected { car: usize },
    /// Candy was parked off-stage
    CandyOffStage,
    MusicStart,
    MusicStop,
    RaceFinished {
        scores: Vec<u32>,
        ranks: Vec<Option<usize>>,
    },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: GameConfig,
    pub area: PlayArea,
    pub cars: Vec<Car>,
    pub candy: Candy,
    pub fish: Vec<Fish>,
    pub bubbles: BubblePool,
    pub bubble_sprite: Sprite,
    pub race: RaceState,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds since the session started
    pub time: f32,
    pub(crate) rng: Pcg32,
    /// Events not yet handed out by `tick`
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Build a session from a validated config and the loaded sprites
    pub fn new(config: GameConfig, sprites: &Sprites, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        if sprites.cars.len() < config.cars.len() {
            return Err(GameError::Config(format!(
                "{} cars configured but only {} car sprite sets loaded",
                config.cars.len(),
                sprites.cars.len()
            )));
        }
        if config.fish_count > 0 && sprites.fish.is_empty() {
            return Err(GameError::Config("fish configured without fish sprites".into()));
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let area = PlayArea::new(config.width, config.height);

        let cars = config
            .cars
            .iter()
            .zip(&sprites.cars)
            .enumerate()
            .map(|(id, (setup, s))| Car::new(id, s.body, s.front_wheel, s.back_wheel, setup))
            .collect::<Vec<_>>();

        let fish = (0..config.fish_count)
            .map(|_| {
                use rand::Rng;
                let variant = rng.random_range(0..sprites.fish.len());
                let mut fish = Fish::new(sprites.fish[variant], variant);
                fish.respawn(&mut rng, &area, &config);
                fish
            })
            .collect();

        let mut events = Vec::new();
        let race = RaceState::new(cars.len(), RaceTiming::from_config(&config), &mut events);
        let candy = Candy::new(sprites.candy, config.candy_drift);

        log::info!(
            "Session created: seed {}, {} cars, {} fish, area {}x{}",
            seed,
            cars.len(),
            config.fish_count,
            area.width,
            area.height
        );

        Ok(Self {
            seed,
            config,
            area,
            cars,
            candy,
            fish,
            bubbles: BubblePool::new(),
            bubble_sprite: sprites.bubble,
            race,
            time_ticks: 0,
            time: 0.0,
            rng,
            events,
        })
    }

    /// Return to `Waiting`, running its entry actions
    pub fn restart(&mut self) {
        log::info!("Restart requested");
        let start = self.events.len();
        self.race.restart(&mut self.events);
        self.apply_events_from(start);
    }

    /// Advance the race machine and apply what it asks of the world
    pub(crate) fn advance_race(&mut self, dt: f32) {
        let start = self.events.len();
        self.race.update(dt, &mut self.events);
        self.apply_events_from(start);
    }

    fn apply_events_from(&mut self, start: usize) {
        for event in &self.events[start..] {
            if *event == GameEvent::CandyOffStage {
                self.candy.move_off_stage();
            }
        }
    }

    /// Hand out pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn car_positions(&self) -> Vec<Vec2> {
        self.cars.iter().map(|c| c.body.position).collect()
    }

    pub fn phase(&self) -> RacePhase {
        self.race.phase
    }
}

#[cfg(test)]
pub(crate) fn test_sprites(num_cars: usize) -> Sprites {
    let sprite = |id: u32, w: f32, h: f32| Sprite {
        texture: TextureId(id),
        size: Vec2::new(w, h),
    };
    Sprites {
        cars: (0..num_cars)
            .map(|_| CarSprites {
                body: sprite(0, 80.0, 40.0),
                front_wheel: sprite(1, 16.0, 16.0),
                back_wheel: sprite(2, 16.0, 16.0),
            })
            .collect(),
        candy: sprite(3, 24.0, 24.0),
        bubble: sprite(4, 8.0, 8.0),
        fish: vec![sprite(5, 40.0, 20.0), sprite(6, 30.0, 15.0)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_waiting_with_candy_parked() {
        let state = GameState::new(GameConfig::default(), &test_sprites(2), 42).unwrap();
        assert_eq!(state.phase(), RacePhase::Waiting);
        assert_eq!(state.cars.len(), 2);
        assert_eq!(state.fish.len(), GameConfig::default().fish_count);
        assert!(state.candy.is_off_stage());
        assert!(state.events.contains(&GameEvent::MusicStop));
        assert_eq!(state.car_positions()[1], Vec2::new(200.0, 400.0));
    }

    #[test]
    fn test_fish_start_on_screen() {
        let state = GameState::new(GameConfig::default(), &test_sprites(2), 7).unwrap();
        for fish in &state.fish {
            assert!(fish.body.is_visible(&state.area));
            assert!(fish.variant < 2);
        }
    }

    #[test]
    fn test_missing_car_sprites_is_an_error() {
        let err = GameState::new(GameConfig::default(), &test_sprites(1), 1).unwrap_err();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn test_restart_parks_candy() {
        let mut state = GameState::new(GameConfig::default(), &test_sprites(2), 3).unwrap();
        state.candy.body.position = Vec2::new(300.0, 300.0);
        state.take_events();
        state.restart();
        assert!(state.candy.is_off_stage());
        let events = state.take_events();
        assert!(events.contains(&GameEvent::PhaseChanged(RacePhase::Waiting)));
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = GameState::new(GameConfig::default(), &test_sprites(2), 99).unwrap();
        let b = GameState::new(GameConfig::default(), &test_sprites(2), 99).unwrap();
        for (fa, fb) in a.fish.iter().zip(&b.fish) {
            assert_eq!(fa.body.position, fb.body.position);
            assert_eq!(fa.body.velocity, fb.body.velocity);
        }
    }
}
