//! Ship, bullets and the marching formation
//!
//! The formation moves in lock-step: everyone slides sideways until the
//! outermost invader crosses a wall, then the whole block drops one step
//! and reverses. The game is lost once any invader reaches the ship's row.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::collision::{Aabb, projectile_target_collision};
use super::state::{GamePhase, GameState, Projectile, ProjectileKind};
use crate::audio::{PlaybackParams, SoundCue, SoundEffect};
use crate::consts::*;

impl GameState {
    /// Advance ship weapons, bullets and the formation by one tick
    pub(crate) fn step_invaders(&mut self, dt: f32, fire: bool) {
        let cooldown = &mut self.formation.player_cooldown;
        *cooldown = (*cooldown - dt).max(0.0);
        if fire {
            self.fire_player_shot();
        }

        for shot in self.projectiles.iter_mut() {
            shot.pos += shot.vel * dt;
        }

        let invaded = self.march_formation(dt);

        self.formation.fire_timer -= dt;
        if self.formation.fire_timer <= 0.0 {
            self.fire_enemy_shot();
            self.formation.fire_timer = self.next_enemy_fire_delay();
        }

        let ship_hit = self.resolve_shots();

        if invaded {
            log::info!("Formation reached the ship");
            self.sounds.push(SoundCue {
                effect: SoundEffect::Explosion,
                params: PlaybackParams::volume(1.0),
            });
            self.end_lives(self.lives);
        } else if ship_hit {
            self.sounds.push(SoundCue {
                effect: SoundEffect::Explosion,
                params: PlaybackParams::volume(0.9),
            });
            self.lose_life();
        }

        if self.phase != GamePhase::GameOver && self.targets.is_empty() {
            self.clear_level();
        }
    }

    fn player_shot_count(&self) -> usize {
        self.projectiles
            .iter()
            .filter(|p| p.kind == ProjectileKind::PlayerShot)
            .count()
    }

    /// Fire from the ship if the cooldown and bullet cap allow it
    pub(crate) fn fire_player_shot(&mut self) -> bool {
        if self.formation.player_cooldown > 0.0
            || self.player_shot_count() >= self.tuning.invaders.max_player_bullets
        {
            return false;
        }
        let id = self.next_entity_id();
        let origin = Vec3::new(self.paddle.x, self.paddle.y + self.tuning.paddle.height, 0.0);
        let vel = Vec3::new(0.0, self.tuning.invaders.player_bullet_speed, 0.0);
        self.projectiles
            .push(Projectile::shot(id, ProjectileKind::PlayerShot, origin, vel));
        self.formation.player_cooldown = self.tuning.invaders.fire_cooldown;
        self.sounds.push(SoundCue {
            effect: SoundEffect::Paddle,
            params: PlaybackParams::volume(0.6),
        });
        true
    }

    /// Slide the formation; returns true once it has reached the ship
    pub(crate) fn march_formation(&mut self, dt: f32) -> bool {
        if self.targets.is_empty() {
            return false;
        }
        let step = self.formation.direction
            * self.tuning.invaders.march_speed
            * self.speed_multiplier
            * dt;
        for target in self.targets.iter_mut() {
            target.pos.x += step;
        }

        let (left, right) = self.targets.iter().fold((f32::MAX, f32::MIN), |(l, r), t| {
            (l.min(t.pos.x - t.width / 2.0), r.max(t.pos.x + t.width / 2.0))
        });
        let overshoot = if self.formation.direction > 0.0 {
            (right - PLAY_HALF_WIDTH).max(0.0)
        } else {
            (left + PLAY_HALF_WIDTH).min(0.0)
        };
        if overshoot != 0.0 {
            let drop = self.tuning.invaders.drop_step;
            for target in self.targets.iter_mut() {
                target.pos.x -= overshoot;
                target.pos.y -= drop;
            }
            self.formation.direction = -self.formation.direction;
            log::debug!("Formation dropped to {:.2}", self.lowest_invader_edge());
        }

        self.lowest_invader_edge() <= self.paddle.y
    }

    fn lowest_invader_edge(&self) -> f32 {
        self.targets
            .iter()
            .map(|t| t.pos.y - t.height / 2.0)
            .fold(f32::MAX, f32::min)
    }

    /// Drop a shot from the lowest invader of a random column
    fn fire_enemy_shot(&mut self) {
        let mut columns: Vec<u32> = self.targets.iter().map(|t| t.col).collect();
        columns.sort_unstable();
        columns.dedup();
        if columns.is_empty() {
            return;
        }
        let col = columns[self.rng.random_range(0..columns.len())];
        let Some(shooter) = self
            .targets
            .iter()
            .filter(|t| t.col == col)
            .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        else {
            return;
        };
        let origin = Vec3::new(shooter.pos.x, shooter.pos.y - shooter.height / 2.0, 0.0);
        let vel = Vec3::new(0.0, -self.tuning.invaders.enemy_bullet_speed, 0.0);
        let id = self.next_entity_id();
        self.projectiles
            .push(Projectile::shot(id, ProjectileKind::EnemyShot, origin, vel));
    }

    /// Seconds until the next enemy shot, faster on later levels
    pub(crate) fn next_enemy_fire_delay(&mut self) -> f32 {
        let base = self.tuning.invaders.enemy_fire_interval / self.speed_multiplier;
        base * self.rng.random_range(0.5..1.5)
    }

    /// Ship hull at base width; Widen only stretches the drawn ship
    fn ship_hitbox(&self) -> Aabb {
        Aabb::new(
            Vec2::new(self.paddle.x, self.paddle.y),
            Vec2::new(self.tuning.paddle.width / 2.0, self.tuning.paddle.height / 2.0),
        )
    }

    /// Resolve bullet hits and reap stray bullets; returns true if the ship was hit
    fn resolve_shots(&mut self) -> bool {
        let ship = self.ship_hitbox();
        let mut shots = std::mem::take(&mut self.projectiles);
        let mut ship_hit = false;

        shots.retain(|shot| match shot.kind {
            ProjectileKind::PlayerShot => {
                let shot_box = shot.aabb();
                let hit = self
                    .targets
                    .iter()
                    .rposition(|t| projectile_target_collision(&shot_box, &t.aabb()).hit);
                match hit {
                    Some(idx) => {
                        self.destroy_target(idx);
                        false
                    }
                    None => shot.pos.y <= self.ceiling_y,
                }
            }
            ProjectileKind::EnemyShot => {
                if ship.overlaps(&shot.aabb()) {
                    ship_hit = true;
                    return false;
                }
                shot.pos.y >= LOWER_BOUND
            }
            ProjectileKind::Ball => true,
        });

        self.projectiles = shots;
        ship_hit
    }
}
