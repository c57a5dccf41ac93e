//! Session commands and phase transitions
//!
//! Start, reset and theme changes arrive from the host; life loss and level
//! clears are raised by the tick. Every phase change emits `State`.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::effects::EffectKind;
use super::events::GameEvent;
use super::state::{Formation, GamePhase, GameState, Projectile};
use crate::audio::{PlaybackParams, SoundCue, SoundEffect};
use crate::consts::*;
use crate::palette::Theme;
use crate::tuning::RuleSet;

impl GameState {
    /// Change phase, notifying only on an actual change
    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        log::debug!("Phase {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        self.emit(GameEvent::State(phase));
    }

    /// Begin or resume play
    ///
    /// A no-op while already playing. After game over it starts a fresh
    /// session.
    pub fn start(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                log::debug!("start ignored: already playing");
                return;
            }
            GamePhase::GameOver => {
                log::info!("Start after game over: new session");
                self.reset();
            }
            _ => {}
        }

        match self.tuning.rules {
            RuleSet::Breakout => self.launch_balls(),
            RuleSet::Invaders => {
                self.formation.fire_timer = self.next_enemy_fire_delay();
            }
        }

        self.set_phase(GamePhase::Playing);
        self.emit(GameEvent::Score(self.score));
        self.emit(GameEvent::Lives(self.lives));
    }

    /// Hard return to Idle with a fresh level 1
    pub fn reset(&mut self) {
        let cancelled = self.effects.clear();
        if !cancelled.is_empty() {
            log::debug!("Reset cancelled {} pending effects", cancelled.len());
        }
        self.power_ups.clear();
        self.particles.clear();
        self.paddle.recenter();
        self.formation = Formation::default();
        self.multi_ball_pickups = 0;
        self.screen_shake = 0.0;

        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.apply_level_variation();
        self.generate_targets();
        self.reset_projectiles();

        self.set_phase(GamePhase::Idle);
        self.emit(GameEvent::Score(self.score));
        self.emit(GameEvent::Lives(self.lives));
        log::info!("Session reset (seed {})", self.seed);
    }

    /// Switch theme and rebuild the grid with the new palette
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.apply_level_variation();
        self.generate_targets();
        log::info!("Theme set to {}", theme.as_str());
    }

    /// Launch the parked ball with a random upward angle
    pub(crate) fn launch_balls(&mut self) {
        let speed = self.tuning.ball.launch_speed * self.speed_multiplier;
        if self.ball_count() == 0 {
            self.reset_projectiles();
        }
        let jitter = self.rng.random::<f32>() - 0.5;
        if let Some(ball) = self.projectiles.iter_mut().find(|p| !p.is_launched()) {
            ball.vel = Vec3::new(jitter, 1.0, 0.0).normalize() * speed;
        }
    }

    /// Drop all projectiles; Breakout gets one ball parked on the paddle
    pub(crate) fn reset_projectiles(&mut self) {
        self.projectiles.clear();
        if self.tuning.rules == RuleSet::Breakout {
            let id = self.next_entity_id();
            let pos = Vec3::new(self.paddle.x, self.paddle.y + BALL_PARK_OFFSET, 0.0);
            self.projectiles.push(Projectile::ball(id, pos));
        }
    }

    /// Keep unlaunched balls riding on the paddle
    pub(crate) fn park_balls(&mut self) {
        let rest = Vec2::new(self.paddle.x, self.paddle.y + BALL_PARK_OFFSET);
        for ball in self.projectiles.iter_mut().filter(|p| !p.is_launched()) {
            ball.pos.x = rest.x;
            ball.pos.y = rest.y;
            ball.trail.clear();
        }
    }

    /// Undo the visual side of an expired or cancelled effect
    pub(crate) fn revert_effect(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::Widen => self.paddle.scale.x = 1.0,
            EffectKind::Squash => self.paddle.scale.y = 1.0,
        }
    }

    /// Cancel every timed effect
    pub(crate) fn cancel_effects(&mut self) {
        for kind in self.effects.clear() {
            self.revert_effect(kind);
        }
    }

    /// Lose one life
    pub(crate) fn lose_life(&mut self) {
        self.end_lives(1);
    }

    /// Lose `count` lives, then pause or end the game
    pub(crate) fn end_lives(&mut self, count: u32) {
        self.lives = self.lives.saturating_sub(count);
        self.emit(GameEvent::Lives(self.lives));
        self.sounds.push(SoundCue {
            effect: SoundEffect::LifeLost,
            params: PlaybackParams::volume(0.95),
        });
        self.add_shake(SHAKE_LIFE_LOST);

        let death_pos = Vec3::new(self.paddle.x, self.paddle.y, 0.0);
        let color = self.paddle.color;
        self.spawn_burst(death_pos, color);

        self.power_ups.clear();
        self.cancel_effects();
        self.multi_ball_pickups = 0;

        if self.lives == 0 {
            self.projectiles.clear();
            self.set_phase(GamePhase::GameOver);
            self.emit(GameEvent::GameOver);
            log::info!("Game over: score {} at level {}", self.score, self.level);
        } else {
            self.reset_projectiles();
            self.set_phase(GamePhase::Paused);
            self.emit(GameEvent::Pause);
            log::info!("Life lost, {} remaining", self.lives);
        }
    }

    /// Advance to the next level and wait for start
    pub(crate) fn clear_level(&mut self) {
        let cleared = self.level;
        // A life lost on the same tick has already paused the game
        let stopped = self.phase != GamePhase::Playing;

        self.power_ups.clear();
        self.particles.clear();
        self.cancel_effects();
        self.paddle.recenter();
        self.formation = Formation::default();

        self.level += 1;
        self.apply_level_variation();
        self.generate_targets();
        self.reset_projectiles();

        self.sounds.push(SoundCue {
            effect: SoundEffect::UiSwitch,
            params: PlaybackParams::volume(0.9),
        });
        self.set_phase(GamePhase::LevelCleared);
        self.emit(GameEvent::LevelCleared(cleared));
        if !stopped {
            self.emit(GameEvent::Pause);
        }
        log::info!(
            "Level {} cleared, score {}, speed x{:.2}",
            cleared,
            self.score,
            self.speed_multiplier
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_start_launches_and_notifies() {
        let mut state = GameState::new(11, Tuning::breakout());
        state.start();
        assert_eq!(state.phase, GamePhase::Playing);
        let ball = &state.projectiles[0];
        assert!(ball.vel.y > 0.0);
        assert!((ball.vel.length() - 0.35).abs() < 1e-5);

        let events = state.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::State(GamePhase::Playing),
                GameEvent::Score(0),
                GameEvent::Lives(3),
            ]
        );
    }

    #[test]
    fn test_start_while_playing_is_noop() {
        let mut state = GameState::new(11, Tuning::breakout());
        state.start();
        let vel = state.projectiles[0].vel;
        state.drain_events();

        state.start();
        assert!(state.drain_events().is_empty());
        assert_eq!(state.projectiles[0].vel, vel);
    }

    #[test]
    fn test_start_after_game_over_resets() {
        let mut state = GameState::new(11, Tuning::breakout());
        state.start();
        state.score = 900;
        state.lives = 1;
        state.lose_life();
        assert_eq!(state.phase, GamePhase::GameOver);

        state.start();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.ball_count(), 1);
    }

    #[test]
    fn test_lose_life_pauses_with_fresh_ball() {
        let mut state = GameState::new(11, Tuning::breakout());
        state.start();
        state.effects.activate(EffectKind::Widen, state.time, 8.0);
        state.paddle.scale.x = 1.5;
        state.drain_events();

        state.projectiles.clear();
        state.lose_life();

        assert_eq!(state.lives, 2);
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.ball_count(), 1);
        assert!(!state.projectiles[0].is_launched());
        assert!(state.effects.is_empty());
        assert_eq!(state.paddle.scale.x, 1.0);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Lives(2),
                GameEvent::State(GamePhase::Paused),
                GameEvent::Pause,
            ]
        );
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = GameState::new(11, Tuning::breakout());
        state.start();
        state.score = 1200;
        state.lives = 1;
        state.level = 4;
        state.targets.truncate(3);

        state.reset();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.targets.len(), 48);
        assert_eq!(state.speed_multiplier, 1.0);
    }

    #[test]
    fn test_set_theme_regenerates_full_grid() {
        let mut state = GameState::new(11, Tuning::breakout());
        state.targets.truncate(10);
        state.set_theme(Theme::Day);
        assert_eq!(state.targets.len(), 48);
        assert!(state.targets.iter().all(|t| (t.emissive - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_clear_level_advances() {
        let mut state = GameState::new(11, Tuning::breakout());
        state.start();
        state.drain_events();
        state.targets.clear();
        state.clear_level();

        assert_eq!(state.level, 2);
        assert_eq!(state.phase, GamePhase::LevelCleared);
        assert_eq!(state.targets.len(), 48);
        assert!((state.speed_multiplier - 1.05).abs() < 1e-5);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::LevelCleared(1)));
        assert_eq!(events.last(), Some(&GameEvent::Pause));

        // Next launch is faster
        state.start();
        assert!((state.projectiles[0].vel.length() - 0.35 * 1.05).abs() < 1e-5);
    }
}
