//! Demo-mode autopilot
//!
//! Plays the game on its own for attract screens and the headless demo.
//! It only reads the state; the tick applies the command like player input.

use super::state::{GameState, ProjectileKind};
use crate::consts::*;
use crate::fold_into_range;
use crate::tuning::RuleSet;

/// What the autopilot wants this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutopilotCommand {
    pub target_x: f32,
    pub fire: bool,
}

/// Decide where to move and whether to shoot
pub fn steer(state: &GameState) -> AutopilotCommand {
    match state.tuning.rules {
        RuleSet::Breakout => steer_paddle(state),
        RuleSet::Invaders => steer_ship(state),
    }
}

fn steer_paddle(state: &GameState) -> AutopilotCommand {
    let paddle_y = state.paddle.y;

    // Most dangerous ball: falling and closest to the paddle
    let threat = state
        .balls()
        .filter(|b| b.vel.y < 0.0)
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let target_x = match threat {
        Some(ball) => {
            // Predict where the ball crosses the paddle row, folding in wall bounces
            let time_to_paddle = ((ball.pos.y - paddle_y) / -ball.vel.y).max(0.0);
            let landing = fold_into_range(ball.pos.x + ball.vel.x * time_to_paddle, PLAY_HALF_WIDTH);

            // Oscillating offset so rallies don't settle into a loop
            let t = state.time as f32;
            let offset = (t * 0.7).sin() * 0.6 + (t * 1.3).sin() * 0.3;
            landing + offset
        }
        None => {
            // All balls rising: go get the lowest falling pickup, else shadow the first ball
            let pickup = state
                .power_ups
                .iter()
                .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
            match (pickup, state.balls().next()) {
                (Some(p), _) => p.pos.x,
                (None, Some(ball)) => ball.pos.x,
                (None, None) => 0.0,
            }
        }
    };

    AutopilotCommand {
        target_x,
        fire: false,
    }
}

fn steer_ship(state: &GameState) -> AutopilotCommand {
    let ship_x = state.paddle.x;

    // Sidestep the closest incoming shot
    let incoming = state
        .projectiles
        .iter()
        .filter(|p| p.kind == ProjectileKind::EnemyShot)
        .filter(|p| (p.pos.x - ship_x).abs() < 1.5 && p.pos.y - state.paddle.y < 4.0)
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
    if let Some(shot) = incoming {
        let dodge = if shot.pos.x > ship_x { -3.0 } else { 3.0 };
        return AutopilotCommand {
            target_x: ship_x + dodge,
            fire: false,
        };
    }

    if let Some(pickup) = state
        .power_ups
        .iter()
        .filter(|p| p.pos.y < state.paddle.y + 5.0)
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
    {
        return AutopilotCommand {
            target_x: pickup.pos.x,
            fire: false,
        };
    }

    // Line up under the nearest invader and shoot
    let aim = state
        .targets
        .iter()
        .min_by(|a, b| (a.pos.x - ship_x).abs().total_cmp(&(b.pos.x - ship_x).abs()));
    match aim {
        Some(target) => AutopilotCommand {
            target_x: target.pos.x,
            fire: (target.pos.x - ship_x).abs() < target.width / 2.0,
        },
        None => AutopilotCommand {
            target_x: 0.0,
            fire: false,
        },
    }
}
