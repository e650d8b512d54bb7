//! Spawning and respawning of the candy and the ambient life
//!
//! - Candy: rejection-sampled placement away from the cars and its old spot
//! - Fish: re-enter from a random edge once they swim out of view
//! - Bubbles: an open-ended pool, compacted every tick

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{KinematicBody, PlayArea};
use super::state::Sprite;
use crate::config::GameConfig;
use crate::consts::OFF_STAGE;

/// Draw a candy position inside the central part of the play area.
///
/// A draw is accepted when it is farther than `width * separation_fraction`
/// from both `previous` and every car. After `max_attempts` rejected draws the
/// last one is used anyway.
pub fn candy_respawn_position(
    rng: &mut impl Rng,
    area: &PlayArea,
    previous: Vec2,
    cars: &[Vec2],
    config: &GameConfig,
) -> Vec2 {
    let margin = config.candy_margin_fraction;
    let min_dist = area.width * config.candy_separation_fraction;
    let (x_lo, x_hi) = (area.width * margin, area.width * (1.0 - margin));
    let (y_lo, y_hi) = (area.height * margin, area.height * (1.0 - margin));

    let mut candidate = previous;
    for _ in 0..config.max_respawn_attempts.max(1) {
        candidate = Vec2::new(rng.random_range(x_lo..=x_hi), rng.random_range(y_lo..=y_hi));
        let clear_of_previous = candidate.distance(previous) > min_dist;
        let clear_of_cars = cars.iter().all(|car| candidate.distance(*car) > min_dist);
        if clear_of_previous && clear_of_cars {
            return candidate;
        }
    }
    log::debug!(
        "Candy respawn gave up after {} attempts, using {:?}",
        config.max_respawn_attempts,
        candidate
    );
    candidate
}

/// The collectible candy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candy {
    pub sprite: Sprite,
    pub body: KinematicBody,
}

impl Candy {
    /// Create the candy off-stage; it enters play on the first race respawn
    pub fn new(sprite: Sprite, drift: Vec2) -> Self {
        let mut body = KinematicBody::new(sprite.size);
        body.velocity = drift;
        let mut candy = Self { sprite, body };
        candy.move_off_stage();
        candy
    }

    /// Park the candy far outside the play area so it cannot be collected
    pub fn move_off_stage(&mut self) {
        self.body.position = Vec2::splat(OFF_STAGE);
    }

    pub fn is_off_stage(&self) -> bool {
        self.body.position.x <= OFF_STAGE / 2.0
    }

    /// Off the left edge (or parked), so due for a new spot
    pub fn needs_respawn(&self) -> bool {
        self.body.position.x <= 0.0
    }

    /// Only drifts while in play
    pub fn update(&mut self, dt: f32) {
        if self.is_off_stage() {
            self.body.tick_clocks(dt);
        } else {
            self.body.update(dt);
        }
    }

    pub fn respawn(&mut self, rng: &mut impl Rng, area: &PlayArea, cars: &[Vec2], config: &GameConfig) {
        let position = candy_respawn_position(rng, area, self.body.position, cars, config);
        log::debug!("Candy respawned at ({:.0}, {:.0})", position.x, position.y);
        self.body.position = position;
    }
}

/// Decorative fish swimming straight across the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fish {
    pub sprite: Sprite,
    /// Which fish texture this one uses
    pub variant: usize,
    pub body: KinematicBody,
}

/// Screen edge a fish enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    /// Heading pointing straight into the play area (y grows downward)
    pub fn inward_heading(self) -> f32 {
        match self {
            Edge::Left => 0.0,
            Edge::Top => FRAC_PI_2,
            Edge::Right => PI,
            Edge::Bottom => -FRAC_PI_2,
        }
    }

    fn random_point(self, rng: &mut impl Rng, area: &PlayArea) -> Vec2 {
        match self {
            Edge::Left => Vec2::new(0.0, rng.random_range(0.0..=area.height)),
            Edge::Right => Vec2::new(area.width, rng.random_range(0.0..=area.height)),
            Edge::Top => Vec2::new(rng.random_range(0.0..=area.width), 0.0),
            Edge::Bottom => Vec2::new(rng.random_range(0.0..=area.width), area.height),
        }
    }
}

impl Fish {
    pub fn new(sprite: Sprite, variant: usize) -> Self {
        Self {
            sprite,
            variant,
            body: KinematicBody::new(sprite.size),
        }
    }

    /// Place on a random edge, heading somewhere into the half-plane of the area
    pub fn respawn(&mut self, rng: &mut impl Rng, area: &PlayArea, config: &GameConfig) {
        let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
        let heading = edge.inward_heading() + rng.random_range(-FRAC_PI_2..FRAC_PI_2);
        let speed = rng.random_range(config.fish_min_speed..=config.fish_max_speed);

        self.body.position = edge.random_point(rng, area);
        self.body.orientation = heading;
        self.body.set_tan_nor_speed(Vec2::new(speed, 0.0));
        self.body.acceleration = Vec2::ZERO;
    }

    /// Swim, and come back from an edge once out of view. Returns true on respawn.
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng, area: &PlayArea, config: &GameConfig) -> bool {
        self.body.update(dt);
        if self.body.is_visible(area) {
            return false;
        }
        self.respawn(rng, area, config);
        true
    }
}

/// A rising, wobbling bubble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub body: KinematicBody,
}

impl Bubble {
    pub fn new(position: Vec2, radius: f32, rise_speed: f32) -> Self {
        let diameter = radius * 2.0;
        let mut body = KinematicBody::new(Vec2::splat(diameter)).at(position);
        body.radius = radius;
        body.velocity = Vec2::new(0.0, -rise_speed);
        Self { body }
    }

    pub fn update(&mut self, dt: f32, amplitude: f32) {
        let age = self.body.life_time + dt;
        self.body.velocity.x = amplitude * (3.0 * age + self.body.radius).sin();
        self.body.update(dt);
    }
}

/// Every live bubble. Bubbles leave the pool once fully off-screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BubblePool {
    pub bubbles: Vec<Bubble>,
}

impl BubblePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Add a bubble with a slightly randomized rise speed
    pub fn spawn(&mut self, rng: &mut impl Rng, position: Vec2, radius: f32, config: &GameConfig) {
        let rise = config.bubble_rise_speed + rng.random_range(0.0..=config.bubble_rise_jitter);
        self.bubbles.push(Bubble::new(position, radius, rise));
    }

    /// Seed a bubble from just below the bottom edge with probability `rate * dt`
    pub fn seed_ambient(
        &mut self,
        dt: f32,
        rng: &mut impl Rng,
        area: &PlayArea,
        radius: f32,
        config: &GameConfig,
    ) -> bool {
        let chance = (config.ambient_bubble_rate * dt).clamp(0.0, 1.0);
        if !rng.random_bool(chance as f64) {
            return false;
        }
        let x = rng.random_range(0.0..=area.width);
        self.spawn(rng, Vec2::new(x, area.height + radius), radius, config);
        true
    }

    /// Move every bubble, then drop those that left the play area.
    ///
    /// One O(n) compaction pass; returns how many were removed.
    pub fn update(&mut self, dt: f32, area: &PlayArea, amplitude: f32) -> usize {
        for bubble in &mut self.bubbles {
            bubble.update(dt, amplitude);
        }
        let before = self.bubbles.len();
        self.bubbles.retain(|b| b.body.is_visible(area));
        before - self.bubbles.len()
    }
}
