//! Kinematic body shared by every entity
//!
//! Position, velocity and acceleration are integrated with semi-implicit
//! Euler: `v += dt * a; p += dt * v`. Entities own their body and are the only
//! ones mutating it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{renorm, rotate};

/// Rectangular play area with its origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Does a circle overlap the area? Equivalent to the point test on the
    /// area expanded by `radius` on every side.
    pub fn sees(&self, center: Vec2, radius: f32) -> bool {
        center.x >= -radius
            && center.x <= self.width + radius
            && center.y >= -radius
            && center.y <= self.height + radius
    }
}

/// Physical state of an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicBody {
    /// World-space center
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Radians
    pub orientation: f32,
    /// Visual extent (width, height) in world units
    pub size: Vec2,
    /// Half the diagonal of `size`
    pub radius: f32,
    /// Seconds since the body was created
    pub life_time: f32,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl KinematicBody {
    /// Create a body at rest at the origin with the given visual extent
    pub fn new(size: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            orientation: 0.0,
            size,
            radius: size.length() / 2.0,
            life_time: 0.0,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Half extents of the local bounding box
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Age the body without integrating (entity parked)
    pub fn tick_clocks(&mut self, dt: f32) {
        self.life_time += dt.max(0.0);
    }

    /// Integrate over `dt` seconds, the time since the previous step
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.velocity += dt * self.acceleration;
        self.position += dt * self.velocity;
        self.life_time += dt;
    }

    /// Move along the current orientation
    pub fn advance(&mut self, distance: f32) {
        self.position += rotate(Vec2::new(distance, 0.0), self.orientation);
    }

    pub fn turn(&mut self, dangle: f32) {
        self.orientation += dangle;
    }

    /// Set velocity from body-frame (tangential, normal) components
    pub fn set_tan_nor_speed(&mut self, local: Vec2) {
        self.velocity = rotate(local, self.orientation);
    }

    pub fn renorm_speed(&mut self, norm: f32) {
        self.velocity = renorm(self.velocity, norm);
    }

    /// Body-local offset (relative to the center) to world position
    #[inline]
    pub fn local_to_world(&self, offset: Vec2) -> Vec2 {
        self.position + rotate(offset, self.orientation)
    }

    /// Whether the bounding circle still overlaps the play area
    pub fn is_visible(&self, area: &PlayArea) -> bool {
        area.sees(self.position, self.radius)
    }
}
