//! Ball physics for the brick-breaker rule-set

use glam::Vec2;
use rand::Rng;

use super::collision::{
    Aabb, ceiling_contact, paddle_bounce, projectile_target_collision, reflect_axis,
    resolve_boundary, side_wall_contact,
};
use super::effects::EffectKind;
use super::events::GameEvent;
use super::state::{GamePhase, GameState, Projectile};
use crate::audio::{PlaybackParams, SoundCue, SoundEffect};
use crate::consts::*;

impl GameState {
    /// Paddle hit region for balls
    fn paddle_hit_zone(&self) -> Aabb {
        let width = self.paddle.width(self.tuning.paddle.width);
        Aabb::new(
            Vec2::new(self.paddle.x, self.paddle.y),
            Vec2::new(
                width / 2.0 + self.tuning.ball.paddle_reach,
                self.tuning.paddle.hit_band,
            ),
        )
    }

    /// Advance every launched ball by one tick
    pub(crate) fn step_balls(&mut self, dt: f32) {
        let mut balls = std::mem::take(&mut self.projectiles);
        let motion = dt * self.tuning.ball.motion_scale;

        for ball in balls.iter_mut().filter(|b| b.is_launched()) {
            ball.pos += ball.vel * motion;
            ball.trail.record(ball.pos);
            self.collide_ball(ball);
        }

        // Death
        balls.retain(|b| b.pos.y >= LOWER_BOUND);
        self.projectiles = balls;

        if self.ball_count() == 0 {
            self.lose_life();
        }
        // Win
        if self.phase != GamePhase::GameOver && self.targets.is_empty() {
            self.clear_level();
        }
    }

    fn collide_ball(&mut self, ball: &mut Projectile) {
        let wall_color = self.palette().wall;

        // Walls
        if let Some(side) = side_wall_contact(ball.pos, PLAY_HALF_WIDTH) {
            resolve_boundary(&mut ball.pos, &mut ball.vel, side, PLAY_HALF_WIDTH);
            self.spawn_burst(ball.pos, wall_color);
        }
        if let Some(top) = ceiling_contact(ball.pos, self.ceiling_y) {
            resolve_boundary(&mut ball.pos, &mut ball.vel, top, self.ceiling_y);
            self.spawn_burst(ball.pos, wall_color);
        }

        // Paddle
        if ball.vel.y < 0.0 && self.paddle_hit_zone().contains_point(ball.pos.truncate()) {
            let offset = ball.pos.x - self.paddle.x;
            ball.vel = paddle_bounce(
                ball.vel,
                offset,
                self.tuning.ball.spin,
                self.tuning.ball.bounce_speed,
            );
            let color = self.paddle.color;
            self.spawn_burst(ball.pos, color);

            let rate = 1.0 + (ball.vel.x.abs() * 0.5).min(0.6);
            self.sounds.push(SoundCue {
                effect: SoundEffect::Paddle,
                params: PlaybackParams::volume(0.75).with_rate(rate),
            });

            self.effects
                .activate(EffectKind::Squash, self.time, self.tuning.paddle.squash_secs);
            self.paddle.scale.y = self.tuning.paddle.squash_scale;
            self.add_shake(SHAKE_PADDLE);
        }

        // Bricks, one per tick
        let ball_box = ball.aabb();
        let hit = self
            .targets
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, target)| {
                let result = projectile_target_collision(&ball_box, &target.aabb());
                result.hit.then_some((idx, result.axis))
            });
        if let Some((idx, axis)) = hit {
            ball.vel = reflect_axis(ball.vel, axis);
            self.destroy_target(idx);
        }
    }

    /// Remove a target and award its points
    pub(crate) fn destroy_target(&mut self, idx: usize) {
        let target = self.targets.remove(idx);

        self.spawn_burst(target.pos.extend(0.0), target.color);
        let rate = 0.95 + self.rng.random::<f32>() * 0.2;
        self.sounds.push(SoundCue {
            effect: SoundEffect::Brick,
            params: PlaybackParams::volume(0.95).with_rate(rate),
        });
        self.add_shake(SHAKE_TARGET);

        self.maybe_spawn_power_up(target.pos);

        self.score += self.tuning.reward_for_row(target.row as usize);
        self.emit(GameEvent::Score(self.score));
    }
}
