//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time is passed in, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (by car index)
//! - No rendering or platform dependencies

pub mod body;
pub mod car;
pub mod collision;
pub mod race;
pub mod spawn;
pub mod state;
pub mod tick;

pub use body::{KinematicBody, PlayArea};
pub use car::{Car, CarControl, ExhaustPuff, WheelPart};
pub use collision::{OrientedQuad, collides};
pub use race::{PODIUM_SIZE, RacePhase, RaceState, RaceTiming, podium};
pub use spawn::{Bubble, BubblePool, Candy, Fish, candy_respawn_position};
pub use state::{CarSprites, GameEvent, GameState, Sprite, Sprites, TextureId};
pub use tick::{TickInput, tick};
