//! Player car: a kinematic body with two wheels and an exhaust
//!
//! Wheels have no physical state of their own. Their world position is the
//! car position plus their fixed offset rotated by the car orientation, and
//! they spin proportionally to the car speed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{KinematicBody, PlayArea};
use super::state::Sprite;
use crate::config::{CarSetup, GameConfig};
use crate::heading;

/// A wheel attached to the car body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelPart {
    pub sprite: Sprite,
    /// Body-local offset from the car center, fixed at load time
    pub offset: Vec2,
    /// Accumulated spin angle (radians)
    pub angle: f32,
    /// Current spin rate (radians per second)
    pub spin_rate: f32,
}

impl WheelPart {
    pub fn new(sprite: Sprite, offset: Vec2) -> Self {
        Self {
            sprite,
            offset,
            angle: 0.0,
            spin_rate: 0.0,
        }
    }

    fn spin(&mut self, rate: f32, dt: f32) {
        self.spin_rate = rate;
        self.angle += rate * dt;
    }
}

/// Control inputs applied to one car for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarControl {
    /// New acceleration (analog stick), kept until replaced
    pub accel: Option<Vec2>,
    /// Discrete move along the heading
    pub advance: f32,
    /// Discrete heading change (radians)
    pub turn: f32,
}

impl CarControl {
    pub fn is_idle(&self) -> bool {
        self.accel.is_none() && self.advance == 0.0 && self.turn == 0.0
    }
}

/// A bubble the exhaust asks the session to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExhaustPuff {
    pub position: Vec2,
    pub radius: f32,
}

/// A player-controlled car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: usize,
    pub sprite: Sprite,
    pub body: KinematicBody,
    pub front_wheel: WheelPart,
    pub back_wheel: WheelPart,
    /// Body-local offset of the exhaust pipe
    pub exhaust_offset: Vec2,
}

impl Car {
    /// Assemble a car from its sprites and the part layout
    pub fn new(id: usize, sprite: Sprite, front: Sprite, back: Sprite, setup: &CarSetup) -> Self {
        Self {
            id,
            sprite,
            body: KinematicBody::new(sprite.size).at(setup.start),
            front_wheel: WheelPart::new(front, setup.front_wheel_offset),
            back_wheel: WheelPart::new(back, setup.back_wheel_offset),
            exhaust_offset: setup.exhaust_offset,
        }
    }

    /// Apply this tick's input
    pub fn apply_control(&mut self, control: &CarControl) {
        if let Some(accel) = control.accel {
            self.body.acceleration = accel;
        }
        if control.turn != 0.0 {
            self.body.turn(control.turn);
        }
        if control.advance != 0.0 {
            self.body.advance(control.advance);
        }
    }

    pub fn front_wheel_position(&self) -> Vec2 {
        self.body.local_to_world(self.front_wheel.offset)
    }

    pub fn back_wheel_position(&self) -> Vec2 {
        self.body.local_to_world(self.back_wheel.offset)
    }

    pub fn exhaust_position(&self) -> Vec2 {
        self.body.local_to_world(self.exhaust_offset)
    }

    /// Soft walls: when the body pokes past an edge, push it back inward and
    /// cap its speed. Returns true if any wall was touched.
    pub fn bounce_off_walls(&mut self, area: &PlayArea, speed_cap: f32, push: f32) -> bool {
        let body = &mut self.body;
        let r = body.radius;
        let mut touched = false;

        if body.position.x - r < 0.0 {
            body.acceleration.x = body.acceleration.x.max(push);
            touched = true;
        }
        if body.position.x + r > area.width {
            body.acceleration.x = body.acceleration.x.min(-push);
            touched = true;
        }
        if body.position.y - r < 0.0 {
            body.acceleration.y = body.acceleration.y.max(push);
            touched = true;
        }
        if body.position.y + r > area.height {
            body.acceleration.y = body.acceleration.y.min(-push);
            touched = true;
        }

        if touched && body.speed() > speed_cap {
            body.renorm_speed(speed_cap);
        }
        touched
    }

    /// Advance the car one tick.
    ///
    /// Returns a puff when the exhaust decides to emit a bubble; higher
    /// acceleration makes puffs both likelier and bigger.
    pub fn update(
        &mut self,
        dt: f32,
        area: &PlayArea,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> Option<ExhaustPuff> {
        self.body.update(dt);
        self.bounce_off_walls(area, config.wall_speed_cap, config.wall_bounce_accel);

        // Keep the last heading when nearly stopped
        if self.body.speed() > config.orientation_speed_threshold {
            self.body.orientation = heading(self.body.velocity);
        }

        let spin_rate = self.body.speed() / config.wheel_spin_divisor;
        self.front_wheel.spin(spin_rate, dt);
        self.back_wheel.spin(spin_rate, dt);

        let accel = self.body.acceleration.length();
        let roll = rng.random_range(0.0..=config.exhaust_random_range);
        (roll + accel > config.exhaust_threshold).then(|| ExhaustPuff {
            position: self.exhaust_position(),
            radius: config.exhaust_bubble_base_radius + accel * config.exhaust_bubble_accel_factor,
        })
    }
}
