//! Power-up lifecycle
//!
//! Spawned → Falling → {Collected | Expired}. Spawning and the kind draw
//! both come from the state RNG; effects are applied exactly once, on the
//! tick the pickup touches the paddle.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::collision::Aabb;
use super::effects::{Activation, EffectKind};
use super::events::GameEvent;
use super::state::{GameState, PowerUp, PowerUpKind, Projectile, ProjectileKind};
use crate::audio::{PlaybackParams, SoundCue, SoundEffect};
use crate::consts::*;
use crate::palette::Rgb;
use crate::rotate_z;
use crate::tuning::{RuleSet, WidenPolicy};

impl GameState {
    /// Roll for a drop where a target was destroyed
    pub(crate) fn maybe_spawn_power_up(&mut self, pos: Vec2) {
        if self.tuning.widen_policy == WidenPolicy::BlockSpawn
            && self.effects.is_active(EffectKind::Widen)
        {
            return;
        }
        if self.rng.random::<f32>() >= self.tuning.power_up_chance {
            return;
        }

        let kind = self.tuning.power_up_weights.pick(self.rng.random::<f32>());
        let id = self.next_entity_id();
        self.power_ups.push(PowerUp {
            id,
            kind,
            pos: pos.extend(0.0),
            vel: Vec3::new(0.0, -self.tuning.power_up_fall_speed, 0.0),
            rotation: 0.0,
        });
        self.sounds.push(SoundCue {
            effect: SoundEffect::PowerUpSpawn,
            params: PlaybackParams::volume(0.8),
        });
        log::debug!("Power-up {:?} spawned (id {})", kind, id);
    }

    /// Paddle region that collects pickups
    fn pickup_zone(&self) -> Aabb {
        let width = self.paddle.width(self.tuning.paddle.width);
        Aabb::new(
            Vec2::new(self.paddle.x, self.paddle.y),
            Vec2::new(
                width / 2.0 + self.tuning.paddle.pickup_reach,
                self.tuning.paddle.hit_band,
            ),
        )
    }

    /// Move falling pickups, apply the collected ones and drop the missed ones
    pub(crate) fn update_power_ups(&mut self, dt: f32) {
        let zone = self.pickup_zone();
        let mut collected = Vec::new();

        self.power_ups.retain_mut(|p| {
            p.pos += p.vel * dt;
            p.rotation += dt * POWER_UP_SPIN;
            if zone.contains_point(p.pos.truncate()) {
                collected.push(p.kind);
                return false;
            }
            p.pos.y >= LOWER_BOUND
        });

        for kind in collected {
            self.apply_power_up(kind);
        }
    }

    /// Apply one pickup's effect
    pub fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Widen => self.apply_widen(),
            PowerUpKind::ExtraLife => {
                self.lives += 1;
                self.emit(GameEvent::Lives(self.lives));
            }
            PowerUpKind::MultiBall => {
                let previous = self.multi_ball_pickups;
                self.multi_ball_pickups += 1;
                let count = self
                    .tuning
                    .multi_ball_policy
                    .extra_balls(previous, self.ball_count());
                match self.tuning.rules {
                    RuleSet::Breakout => self.spawn_extra_balls(count),
                    RuleSet::Invaders => self.fire_volley(count),
                }
            }
            PowerUpKind::Chaos => self.scramble_targets(),
        }

        self.sounds.push(SoundCue {
            effect: SoundEffect::PowerUpCollect,
            params: PlaybackParams::volume(0.85),
        });
        log::debug!("Power-up {:?} collected", kind);
    }

    fn apply_widen(&mut self) {
        let running = self.effects.is_active(EffectKind::Widen);
        if running && self.tuning.widen_policy == WidenPolicy::Ignore {
            return;
        }
        let activation =
            self.effects
                .activate(EffectKind::Widen, self.time, self.tuning.paddle.widen_secs);
        // Set, never multiply: a second pickup must not widen further
        self.paddle.scale.x = self.tuning.paddle.widen_factor;
        if activation == Activation::Extended {
            log::debug!("Widen extended");
        }
    }

    /// Clone the first ball `count` times with a small random turn
    pub(crate) fn spawn_extra_balls(&mut self, count: usize) {
        let Some(origin) = self.balls().next().cloned() else {
            return;
        };
        let jitter = self.tuning.ball.clone_jitter;
        for _ in 0..count {
            let id = self.next_entity_id();
            let angle = (self.rng.random::<f32>() - 0.5) * jitter;
            let mut ball = Projectile::ball(id, origin.pos);
            ball.vel = rotate_z(origin.vel, angle);
            self.projectiles.push(ball);
        }
        log::debug!("MultiBall: {} balls in play", self.ball_count());
    }

    /// Fan of player shots from the ship
    fn fire_volley(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let speed = self.tuning.invaders.player_bullet_speed;
        let spread = self.tuning.ball.clone_jitter;
        let origin = Vec3::new(self.paddle.x, self.paddle.y + self.tuning.paddle.height, 0.0);
        for i in 0..count {
            let t = if count == 1 {
                0.0
            } else {
                i as f32 / (count - 1) as f32 - 0.5
            };
            let id = self.next_entity_id();
            let vel = rotate_z(Vec3::Y * speed, t * spread);
            self.projectiles
                .push(Projectile::shot(id, ProjectileKind::PlayerShot, origin, vel));
        }
    }

    /// Chaos: new random colors and a visual wobble for every live target
    fn scramble_targets(&mut self) {
        let glow = self.palette().target_glow;
        for target in self.targets.iter_mut().filter(|t| t.active) {
            let hue = self.rng.random::<f32>();
            target.color = Rgb::from_hsl(hue, 1.0, 0.5);
            target.emissive = glow * (1.0 + self.rng.random::<f32>());
            target.jitter = Vec2::new(
                self.rng.random::<f32>() - 0.5,
                self.rng.random::<f32>() - 0.5,
            ) * 0.3;
        }
        self.add_shake(SHAKE_TARGET);
        self.sounds.push(SoundCue {
            effect: SoundEffect::Chaos,
            params: PlaybackParams::volume(0.7),
        });
    }
}
