//! Collision detection and response
//!
//! Every test in the game is an axis-aligned box overlap in the x/y play
//! plane. Response is deliberately simple: single-axis reflection for
//! targets, wall clamping, and a fixed-speed "english" bounce off the paddle.

use glam::{Vec2, Vec3};

/// Axis-aligned bounding box (center + half extents)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

/// Collision axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    /// Strict overlap test: `|dx| < halfW_sum && |dy| < halfH_sum`
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlap(other).is_some()
    }

    /// Penetration depth on each axis, if the boxes overlap
    pub fn overlap(&self, other: &Aabb) -> Option<Vec2> {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        if d.x < reach.x && d.y < reach.y {
            Some(reach - d)
        } else {
            None
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        d.x < self.half.x && d.y < self.half.y
    }
}

/// Result of a target hit test
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Axis to reflect (the one with the smaller penetration)
    pub axis: Axis,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            axis: Axis::Y,
        }
    }
}

/// Hit test a projectile box against a target box
pub fn projectile_target_collision(projectile: &Aabb, target: &Aabb) -> CollisionResult {
    match projectile.overlap(target) {
        Some(penetration) => CollisionResult {
            hit: true,
            axis: bounce_axis(penetration),
        },
        None => CollisionResult::miss(),
    }
}

/// Axis of smaller penetration; ties bounce vertically
#[inline]
pub fn bounce_axis(penetration: Vec2) -> Axis {
    if penetration.x < penetration.y {
        Axis::X
    } else {
        Axis::Y
    }
}

/// Flip one velocity component
#[inline]
pub fn reflect_axis(vel: Vec3, axis: Axis) -> Vec3 {
    match axis {
        Axis::X => Vec3::new(-vel.x, vel.y, vel.z),
        Axis::Y => Vec3::new(vel.x, -vel.y, vel.z),
    }
}

/// Which boundary a projectile crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Left,
    Right,
    Ceiling,
}

/// Side-wall check; returns the crossed wall
pub fn side_wall_contact(pos: Vec3, half_width: f32) -> Option<Boundary> {
    if pos.x > half_width {
        Some(Boundary::Right)
    } else if pos.x < -half_width {
        Some(Boundary::Left)
    } else {
        None
    }
}

pub fn ceiling_contact(pos: Vec3, ceiling_y: f32) -> Option<Boundary> {
    (pos.y > ceiling_y).then_some(Boundary::Ceiling)
}

/// Reflect off a boundary and clamp the position back onto it
pub fn resolve_boundary(pos: &mut Vec3, vel: &mut Vec3, boundary: Boundary, limit: f32) {
    match boundary {
        Boundary::Left | Boundary::Right => {
            vel.x = -vel.x;
            pos.x = pos.x.signum() * limit;
        }
        Boundary::Ceiling => {
            vel.y = -vel.y;
            pos.y = limit;
        }
    }
}

/// Paddle bounce with english
///
/// Flips the vertical component, adds `spin * offset` horizontally, then
/// rescales to exactly `speed` regardless of the incoming speed.
pub fn paddle_bounce(vel: Vec3, offset: f32, spin: f32, speed: f32) -> Vec3 {
    let mut out = Vec3::new(vel.x + offset * spin, -vel.y, vel.z);
    if out.length_squared() < 1e-12 {
        out = Vec3::Y;
    }
    out.normalize() * speed
}
