//! Burst particles
//!
//! Purely visual. They share the state RNG so a replay looks the same, but
//! nothing in gameplay reads them.

use glam::Vec3;
use rand::Rng;

use super::state::{GameState, Particle};
use crate::consts::*;
use crate::palette::Rgb;

impl GameState {
    /// Spawn an expanding burst at `pos`
    pub fn spawn_burst(&mut self, pos: Vec3, color: Rgb) {
        let gain = self.palette().particle_gain;
        let color = color.scale(gain);

        for _ in 0..PARTICLE_BURST {
            if self.particles.len() >= MAX_PARTICLES {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let vel = Vec3::new(
                self.rng.random::<f32>() - 0.5,
                self.rng.random::<f32>() - 0.5,
                self.rng.random::<f32>() - 0.5,
            ) * 30.0;
            let size = self.rng.random::<f32>() * 1.5 + 0.5;
            self.particles.push(Particle {
                pos,
                vel,
                color,
                life: 1.0,
                size,
            });
        }
    }
}

/// Move particles and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for particle in particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.life -= dt * PARTICLE_DECAY;
    }
    particles.retain(|p| p.life > 0.0);
}
