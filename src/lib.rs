//! Neon Breaker - simulation core for a neon brick-breaker arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, power-ups, levels)
//! - `engine`: Session driver (commands, notifications, sound dispatch)
//! - `platform`: Input mapping and frame timing
//! - `tuning`: Data-driven rule-set balance (Breakout and Invaders presets)
//! - `render`: Per-frame snapshot consumed by an external renderer
//! - `audio`: Sound effect manifest and player interface

pub mod audio;
pub mod engine;
pub mod error;
pub mod palette;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use engine::Engine;
pub use error::{SettingsError, TuningError};
pub use settings::Settings;
pub use tuning::{RuleSet, Tuning};

use glam::Vec3;

/// Play-field geometry shared by every rule-set
pub mod consts {
    /// Largest elapsed time a single tick may integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Horizontal half extent of the play field
    pub const PLAY_HALF_WIDTH: f32 = 12.0;
    /// Projectiles and power-ups below this height are reaped
    pub const LOWER_BOUND: f32 = -10.0;
    /// Distance between the top target row and the ceiling
    pub const CEILING_CLEARANCE: f32 = 1.0;

    /// Paddle / ship rest height
    pub const PADDLE_Y: f32 = -6.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.4;
    /// Height above the paddle where a parked ball waits for launch
    pub const BALL_PARK_OFFSET: f32 = 1.5;
    /// Bullet half extents (Invaders)
    pub const BULLET_HALF_WIDTH: f32 = 0.1;
    pub const BULLET_HALF_HEIGHT: f32 = 0.3;

    /// Trail ring capacity per projectile
    pub const TRAIL_LENGTH: usize = 15;

    /// Session defaults
    pub const START_LIVES: u32 = 3;

    /// Particles per burst and global cap
    pub const PARTICLE_BURST: usize = 30;
    pub const MAX_PARTICLES: usize = 1200;
    /// Particle life lost per second
    pub const PARTICLE_DECAY: f32 = 1.5;

    /// Screen shake impulses
    pub const SHAKE_PADDLE: f32 = 0.15;
    pub const SHAKE_TARGET: f32 = 0.08;
    pub const SHAKE_LIFE_LOST: f32 = 0.4;
    /// Per-tick shake multiplier and cutoff
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const SHAKE_CUTOFF: f32 = 0.01;

    /// Power-up half extent for pickup tests
    pub const POWER_UP_RADIUS: f32 = 0.4;
    /// Power-up spin (radians/sec, cosmetic)
    pub const POWER_UP_SPIN: f32 = 2.0;

    /// Length of one half of the auto theme day/night cycle (seconds)
    pub const AUTO_THEME_PERIOD: f64 = 60.0;
}

/// Rotate a vector around the z axis
#[inline]
pub fn rotate_z(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Fold a coordinate into `[-half, half]` as if it bounced off both walls
#[inline]
pub fn fold_into_range(x: f32, half: f32) -> f32 {
    if half <= 0.0 {
        return 0.0;
    }
    let span = 2.0 * half;
    let mut m = (x + half).rem_euclid(2.0 * span);
    if m > span {
        m = 2.0 * span - m;
    }
    m - half
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_z_quarter_turn() {
        let v = rotate_z(Vec3::new(1.0, 0.0, 2.0), std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
        assert_eq!(v.z, 2.0);
    }

    #[test]
    fn test_fold_into_range() {
        assert!((fold_into_range(5.0, 12.0) - 5.0).abs() < 1e-5);
        // 2 past the right wall bounces back to 10
        assert!((fold_into_range(14.0, 12.0) - 10.0).abs() < 1e-5);
        assert!((fold_into_range(-14.0, 12.0) + 10.0).abs() < 1e-5);
        // A full round trip lands where it started
        assert!((fold_into_range(3.0 + 48.0, 12.0) - 3.0).abs() < 1e-4);
    }
}
