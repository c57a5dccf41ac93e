//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies
//!
//! Sounds and notifications are queued on the state and drained by the engine.

pub mod autopilot;
mod breakout;
pub mod collision;
pub mod effects;
pub mod events;
mod invaders;
mod level;
pub mod particles;
mod powerup;
mod session;
pub mod state;
pub mod tick;

pub use autopilot::AutopilotCommand;
pub use collision::{Aabb, Axis, CollisionResult, projectile_target_collision};
pub use effects::{ActiveEffects, EffectKind};
pub use events::{EventBus, EventKind, GameEvent, ListenerId};
pub use state::{
    Formation, GamePhase, GameState, Paddle, Particle, PowerUp, PowerUpKind, Projectile,
    ProjectileKind, Target, Trail,
};
pub use tick::{TickInput, tick};
