//! Fixed timestep simulation tick
//!
//! Advances the world deterministically. Every entity moves first, reading only
//! its own state; collisions and the race machine then act on the finalized
//! positions of this tick.

use glam::Vec2;

use super::car::{CarControl, ExhaustPuff};
use super::collision::collides;
use super::race::RacePhase;
use super::state::{GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Per-car controls, indexed like `GameState::cars`
    pub cars: Vec<CarControl>,
    /// Restart request (any phase)
    pub restart: bool,
}

impl TickInput {
    /// Controls for `car`, growing the list as needed
    pub fn control_mut(&mut self, car: usize) -> &mut CarControl {
        if self.cars.len() <= car {
            self.cars.resize(car + 1, CarControl::default());
        }
        &mut self.cars[car]
    }
}

/// Advance the game state by `dt` seconds and return what happened
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let dt = dt.max(0.0);

    if input.restart {
        state.restart();
    }

    state.time_ticks += 1;
    state.time += dt;

    // Controls are live in every phase
    for (car, control) in state.cars.iter_mut().zip(&input.cars) {
        car.apply_control(control);
    }

    let mut puffs: Vec<ExhaustPuff> = Vec::new();
    for car in &mut state.cars {
        if let Some(puff) = car.update(dt, &state.area, &state.config, &mut state.rng) {
            puffs.push(puff);
        }
    }

    for fish in &mut state.fish {
        fish.update(dt, &mut state.rng, &state.area, &state.config);
    }

    state.candy.update(dt);

    state.bubbles.update(dt, &state.area, state.config.bubble_amplitude);
    for puff in puffs {
        state
            .bubbles
            .spawn(&mut state.rng, puff.position, puff.radius, &state.config);
    }
    let ambient_radius = state.bubble_sprite.size.max_element() / 2.0;
    state
        .bubbles
        .seed_ambient(dt, &mut state.rng, &state.area, ambient_radius, &state.config);

    if state.race.phase == RacePhase::Race {
        let cars = state.car_positions();
        if state.candy.needs_respawn() {
            state
                .candy
                .respawn(&mut state.rng, &state.area, &cars, &state.config);
        }
        collect_candy(state, &cars);
    }

    state.advance_race(dt);
    state.take_events()
}

/// One pickup per tick at most; the candy moves right away
fn collect_candy(state: &mut GameState, cars: &[Vec2]) {
    let winner = state
        .cars
        .iter()
        .position(|car| collides(&car.body, &state.candy.body));
    let Some(car) = winner else {
        return;
    };
    if state.race.record_pickup(car) {
        log::debug!("Car {} collected candy", car);
        state.events.push(GameEvent::CandyCollected { car });
        state
            .candy
            .respawn(&mut state.rng, &state.area, cars, &state.config);
    }
}
