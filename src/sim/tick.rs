//! Per-frame simulation step
//!
//! One call advances the session by `dt` seconds. The caller is responsible
//! for clamping `dt`; the tick integrates whatever it is given.

use super::autopilot;
use super::particles::update_particles;
use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::tuning::RuleSet;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Absolute paddle target (pointer/touch), in play-field units
    pub target_x: Option<f32>,
    /// Keyboard steering in [-1, 1]
    pub steer: f32,
    /// Fire held (Invaders)
    pub fire: bool,
    /// Demo mode - the autopilot plays the game
    pub autopilot: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Physics halts once the game is over
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.time += dt as f64;

    let mut input = input.clone();
    if input.autopilot {
        if state.phase.awaits_start() {
            state.start();
        }
        let command = autopilot::steer(state);
        input.target_x = Some(command.target_x);
        input.steer = 0.0;
        input.fire = command.fire;
    }
    let input = &input;

    update_paddle(state, input, dt);

    for kind in state.effects.expire(state.time) {
        state.revert_effect(kind);
    }

    match state.phase {
        GamePhase::Playing => match state.tuning.rules {
            RuleSet::Breakout => state.step_balls(dt),
            RuleSet::Invaders => state.step_invaders(dt, input.fire),
        },
        // Waiting for start: ball rides on the paddle
        _ => state.park_balls(),
    }

    state.update_power_ups(dt);
    update_particles(&mut state.particles, dt);

    // Decay screen shake
    state.screen_shake *= SHAKE_DECAY;
    if state.screen_shake < SHAKE_CUTOFF {
        state.screen_shake = 0.0;
    }
}

fn update_paddle(state: &mut GameState, input: &TickInput, dt: f32) {
    let tuning = &state.tuning.paddle;
    let limit = PLAY_HALF_WIDTH - tuning.margin;
    let paddle = &mut state.paddle;

    if let Some(x) = input.target_x {
        paddle.target_x = x;
    } else if input.steer != 0.0 {
        paddle.target_x += input.steer.clamp(-1.0, 1.0) * tuning.keyboard_rate * dt;
    }
    paddle.target_x = paddle.target_x.clamp(-limit, limit);
    paddle.move_toward_target(dt, tuning.smoothing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectKind;
    use crate::sim::events::GameEvent;
    use crate::sim::state::PowerUpKind;
    use crate::tuning::Tuning;
    use glam::Vec3;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 120.0;

    fn playing(tuning: Tuning) -> GameState {
        let mut state = GameState::new(2024, tuning);
        state.start();
        state.drain_events();
        state
    }

    #[test]
    fn test_clearing_the_wall_scores_4800() {
        let mut state = playing(Tuning::breakout());
        let input = TickInput::default();

        while !state.targets.is_empty() && state.level == 1 {
            let target = state.targets[0].pos;
            let ball = &mut state.projectiles[0];
            ball.pos = target.extend(0.0);
            ball.vel = Vec3::new(0.0, 0.35, 0.0);
            tick(&mut state, &input, DT);
        }

        let events = state.drain_events();
        let scores: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Score(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(scores.len(), 48);
        assert!(scores.windows(2).all(|w| w[1] == w[0] + 100));
        assert_eq!(state.score, 4800);
        assert!(events.contains(&GameEvent::LevelCleared(1)));
        assert_eq!(events.last(), Some(&GameEvent::Pause));

        assert_eq!(state.phase, GamePhase::LevelCleared);
        assert_eq!(state.level, 2);
        assert_eq!(state.targets.len(), 48);
        assert!(state.power_ups.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.ball_count(), 1);
        assert!(!state.projectiles[0].is_launched());
    }

    #[test]
    fn test_last_ball_lost_on_last_life() {
        let mut state = playing(Tuning::breakout());
        state.lives = 1;
        let ball = &mut state.projectiles[0];
        ball.pos = Vec3::new(3.0, LOWER_BOUND + 0.01, 0.0);
        ball.vel = Vec3::new(0.0, -0.35, 0.0);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.projectiles.is_empty());
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Lives(0),
                GameEvent::State(GamePhase::GameOver),
                GameEvent::GameOver,
            ]
        );
    }

    #[test]
    fn test_game_over_halts_physics() {
        let mut state = playing(Tuning::breakout());
        state.lives = 1;
        state.projectiles[0].pos.y = LOWER_BOUND - 1.0;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        let time = state.time;
        let particles = state.particles.len();
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.time, time);
        assert_eq!(state.particles.len(), particles);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_widen_expires_after_duration() {
        let mut state = playing(Tuning::breakout());
        state.projectiles[0].vel = Vec3::new(0.0, 1e-6, 0.0);
        state.apply_power_up(PowerUpKind::Widen);

        let ticks = (7.9 / DT) as usize;
        for _ in 0..ticks {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.paddle.scale.x, 1.5);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.paddle.scale.x, 1.0);
    }

    #[test]
    fn test_reset_cancels_pending_effects() {
        let mut state = playing(Tuning::breakout());
        state.apply_power_up(PowerUpKind::Widen);
        state.paddle.scale.y = 0.5;
        state
            .effects
            .activate(EffectKind::Squash, state.time, 0.1);

        state.reset();
        assert!(state.effects.is_empty());
        assert_eq!(state.paddle.scale.x, 1.0);
        assert_eq!(state.paddle.scale.y, 1.0);

        // A Widen picked up after the reset is not cut short by the old deadline
        for _ in 0..(5.0 / DT) as usize {
            tick(&mut state, &TickInput::default(), DT);
        }
        state.start();
        state.projectiles[0].vel = Vec3::new(0.0, 1e-6, 0.0);
        state.apply_power_up(PowerUpKind::Widen);
        for _ in 0..(4.0 / DT) as usize {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.paddle.scale.x, 1.5);
    }

    #[test]
    fn test_parked_ball_follows_paddle() {
        let mut state = GameState::new(9, Tuning::breakout());
        let input = TickInput {
            target_x: Some(6.0),
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut state, &input, DT);
        }
        let ball = &state.projectiles[0];
        assert!((ball.pos.x - state.paddle.x).abs() < 1e-5);
        assert!((ball.pos.y - (PADDLE_Y + BALL_PARK_OFFSET)).abs() < 1e-5);
        assert!(!ball.is_launched());
    }

    #[test]
    fn test_keyboard_steer_clamps_to_margin() {
        let mut state = GameState::new(9, Tuning::breakout());
        let input = TickInput {
            steer: 1.0,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state, &input, DT);
        }
        assert_eq!(state.paddle.target_x, 10.0);
        assert!(state.paddle.x <= 10.0);
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut state = GameState::new(9, Tuning::breakout());
        state.screen_shake = 0.4;
        tick(&mut state, &TickInput::default(), DT);
        assert!((state.screen_shake - 0.36).abs() < 1e-6);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.screen_shake, 0.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut a = GameState::new(99999, Tuning::breakout());
        let mut b = GameState::new(99999, Tuning::breakout());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.targets.len(), b.targets.len());
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        assert_eq!(a.paddle.x, b.paddle.x);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_score_monotone_and_lives_consistent(seed in any::<u64>(), invaders in any::<bool>()) {
            let tuning = if invaders { Tuning::invaders() } else { Tuning::breakout() };
            let mut state = GameState::new(seed, tuning);
            let input = TickInput { autopilot: true, ..Default::default() };
            let mut last_score = 0;
            for _ in 0..1500 {
                tick(&mut state, &input, 1.0 / 60.0);
                prop_assert!(state.score >= last_score);
                last_score = state.score;
                if state.phase == GamePhase::Playing && !invaders {
                    prop_assert!(state.ball_count() > 0);
                }
                if state.lives == 0 {
                    prop_assert_eq!(state.phase, GamePhase::GameOver);
                }
            }
            state.reset();
            prop_assert_eq!(state.score, 0);
        }
    }
}
