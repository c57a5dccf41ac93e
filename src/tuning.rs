//! Data-driven game balance
//!
//! One simulation core runs both rule-sets; everything that differs between
//! them (rewards, power-up odds, actor constants, level scaling) lives here.

use serde::{Deserialize, Serialize};

use crate::consts::PLAY_HALF_WIDTH;
use crate::error::TuningError;
use crate::sim::PowerUpKind;

/// Which rule-set drives projectiles and targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleSet {
    /// Ball(s) bounce off a paddle into a brick wall
    Breakout,
    /// Ship shoots at a marching invader formation
    Invaders,
}

/// What collecting Widen does while Widen is already active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WidenPolicy {
    /// Restart the timer at the full duration; width stays at the single widened value
    #[default]
    Extend,
    /// Consume the pickup without touching the running timer
    Ignore,
    /// No power-ups spawn at all while Widen is active
    BlockSpawn,
}

/// How many balls a MultiBall pickup adds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiBallPolicy {
    /// Always add `count` balls
    Flat { count: u32 },
    /// Add `first` balls on the first pickup of a life, `then` on later ones
    FirstThen { first: u32, then: u32 },
    /// Clone every ball currently in play
    Double,
}

impl Default for MultiBallPolicy {
    fn default() -> Self {
        MultiBallPolicy::Flat { count: 3 }
    }
}

impl MultiBallPolicy {
    /// Number of balls to add given how many pickups came before and the current ball count
    pub fn extra_balls(&self, previous_pickups: u32, balls_in_play: usize) -> usize {
        match *self {
            MultiBallPolicy::Flat { count } => count as usize,
            MultiBallPolicy::FirstThen { first, then } => {
                if previous_pickups == 0 {
                    first as usize
                } else {
                    then as usize
                }
            }
            MultiBallPolicy::Double => balls_in_play,
        }
    }
}

/// Relative odds of each power-up kind, drawn in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpWeights {
    pub widen: f32,
    pub multi_ball: f32,
    pub extra_life: f32,
    pub chaos: f32,
}

impl PowerUpWeights {
    fn entries(&self) -> [(PowerUpKind, f32); 4] {
        [
            (PowerUpKind::Widen, self.widen),
            (PowerUpKind::MultiBall, self.multi_ball),
            (PowerUpKind::ExtraLife, self.extra_life),
            (PowerUpKind::Chaos, self.chaos),
        ]
    }

    pub fn total(&self) -> f32 {
        self.entries().iter().map(|(_, w)| w).sum()
    }

    /// Cumulative thresholds normalized to `[0, 1]`, one per kind
    pub fn thresholds(&self) -> [f32; 4] {
        let total = self.total();
        let mut acc = 0.0;
        let mut out = [0.0; 4];
        for (slot, (_, w)) in out.iter_mut().zip(self.entries()) {
            acc += w;
            *slot = if total > 0.0 { acc / total } else { 0.0 };
        }
        out
    }

    /// Select a kind from a uniform sample in `[0, 1)`
    pub fn pick(&self, sample: f32) -> PowerUpKind {
        let scaled = sample.clamp(0.0, 1.0) * self.total();
        let mut acc = 0.0;
        let mut last = PowerUpKind::Widen;
        for (kind, w) in self.entries() {
            if w <= 0.0 {
                continue;
            }
            acc += w;
            last = kind;
            if scaled < acc {
                return kind;
            }
        }
        last
    }

    fn validate(&self) -> Result<(), TuningError> {
        let all_valid = self
            .entries()
            .iter()
            .all(|(_, w)| w.is_finite() && *w >= 0.0);
        if !all_valid || self.total() <= 0.0 {
            return Err(TuningError::InvalidWeights);
        }
        Ok(())
    }
}

/// Player paddle / ship constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaddleTuning {
    /// Full width at scale 1
    pub width: f32,
    pub height: f32,
    /// Keyboard target speed (units/sec)
    pub keyboard_rate: f32,
    /// Exponential smoothing rate toward the target
    pub smoothing: f32,
    /// Target x stays this far inside the side walls
    pub margin: f32,
    pub widen_factor: f32,
    pub widen_secs: f32,
    /// Vertical scale while squashed after a hit
    pub squash_scale: f32,
    pub squash_secs: f32,
    /// Extra horizontal reach for pickup collection
    pub pickup_reach: f32,
    /// Vertical half extent of the hit band around the paddle
    pub hit_band: f32,
}

/// Ball motion constants (Breakout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallTuning {
    /// Position advances by `vel * dt * motion_scale`
    pub motion_scale: f32,
    /// Launch speed before the level multiplier
    pub launch_speed: f32,
    /// Fixed speed after every paddle bounce
    pub bounce_speed: f32,
    /// Horizontal kick per unit of offset from the paddle center
    pub spin: f32,
    /// Extra horizontal reach of the paddle hit test
    pub paddle_reach: f32,
    /// Angular jitter range for MultiBall clones (radians, full width)
    pub clone_jitter: f32,
}

/// Target grid layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridTuning {
    pub rows: u32,
    pub cols: u32,
    pub max_rows: u32,
    pub max_cols: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub gap: f32,
    /// Center height of the lowest row
    pub base_y: f32,
}

/// Difficulty and visual variation per level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelScaling {
    /// Speed multiplier gained per level
    pub speed_step: f32,
    /// Cap on the accumulated speed bonus
    pub max_speed_bonus: f32,
    /// Hue shift per level for the target gradient
    pub hue_step: f32,
    pub extra_rows_per_level: u32,
    pub extra_cols_per_level: u32,
}

impl LevelScaling {
    pub fn speed_multiplier(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        1.0 + (steps * self.speed_step).min(self.max_speed_bonus)
    }
}

/// Formation and weapon constants (Invaders)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvaderTuning {
    /// Horizontal march speed (units/sec) before the level multiplier
    pub march_speed: f32,
    /// Drop applied to the whole formation at each side bound
    pub drop_step: f32,
    pub player_bullet_speed: f32,
    pub enemy_bullet_speed: f32,
    /// Seconds between player shots
    pub fire_cooldown: f32,
    pub max_player_bullets: usize,
    /// Mean seconds between enemy shots
    pub enemy_fire_interval: f32,
}

/// Complete rule-set configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub rules: RuleSet,
    /// Points per destroyed target, indexed from the top row; the last entry repeats
    pub rewards_by_row: Vec<u64>,
    /// Chance a destroyed target drops a power-up
    pub power_up_chance: f32,
    /// Fall speed of power-ups (units/sec)
    pub power_up_fall_speed: f32,
    pub power_up_weights: PowerUpWeights,
    #[serde(default)]
    pub widen_policy: WidenPolicy,
    #[serde(default)]
    pub multi_ball_policy: MultiBallPolicy,
    pub paddle: PaddleTuning,
    pub ball: BallTuning,
    pub grid: GridTuning,
    pub scaling: LevelScaling,
    pub invaders: InvaderTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::breakout()
    }
}

impl Tuning {
    /// Classic brick-breaker: 6x8 wall, 100 points a brick
    pub fn breakout() -> Self {
        Self {
            rules: RuleSet::Breakout,
            rewards_by_row: vec![100],
            power_up_chance: 0.18,
            power_up_fall_speed: 4.0,
            power_up_weights: PowerUpWeights {
                widen: 0.65,
                multi_ball: 0.25,
                extra_life: 0.10,
                chaos: 0.0,
            },
            widen_policy: WidenPolicy::Extend,
            multi_ball_policy: MultiBallPolicy::Flat { count: 3 },
            paddle: PaddleTuning {
                width: 4.0,
                height: 0.5,
                keyboard_rate: 60.0,
                smoothing: 20.0,
                margin: 2.0,
                widen_factor: 1.5,
                widen_secs: 8.0,
                squash_scale: 0.5,
                squash_secs: 0.1,
                pickup_reach: 0.8,
                hit_band: 1.0,
            },
            ball: BallTuning {
                motion_scale: 30.0,
                launch_speed: 0.35,
                bounce_speed: 0.65,
                spin: 0.3,
                paddle_reach: 0.5,
                clone_jitter: 0.8,
            },
            grid: GridTuning {
                rows: 6,
                cols: 8,
                max_rows: 6,
                max_cols: 8,
                cell_width: 2.2,
                cell_height: 0.8,
                gap: 0.2,
                base_y: 4.0,
            },
            scaling: LevelScaling {
                speed_step: 0.05,
                max_speed_bonus: 0.5,
                hue_step: 0.15,
                extra_rows_per_level: 0,
                extra_cols_per_level: 0,
            },
            invaders: InvaderTuning::default(),
        }
    }

    /// Invaders sweep: growing formation, banded rewards, chaos pickups
    pub fn invaders() -> Self {
        Self {
            rules: RuleSet::Invaders,
            rewards_by_row: vec![30, 20, 20, 10, 10],
            power_up_chance: 0.2,
            power_up_weights: PowerUpWeights {
                widen: 0.5,
                multi_ball: 0.2,
                extra_life: 0.1,
                chaos: 0.2,
            },
            grid: GridTuning {
                rows: 5,
                cols: 8,
                max_rows: 5,
                max_cols: 11,
                cell_width: 1.4,
                cell_height: 0.8,
                gap: 0.5,
                base_y: 2.0,
            },
            scaling: LevelScaling {
                extra_cols_per_level: 1,
                ..Self::breakout().scaling
            },
            ..Self::breakout()
        }
    }

    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reward for destroying a target in `row_from_top`
    pub fn reward_for_row(&self, row_from_top: usize) -> u64 {
        self.rewards_by_row
            .get(row_from_top)
            .or_else(|| self.rewards_by_row.last())
            .copied()
            .unwrap_or(0)
    }

    /// Grid dimensions `(rows, cols)` for a level
    pub fn grid_dims(&self, level: u32) -> (u32, u32) {
        let steps = level.saturating_sub(1);
        let rows = (self.grid.rows + steps * self.scaling.extra_rows_per_level)
            .min(self.grid.max_rows.max(self.grid.rows));
        let cols = (self.grid.cols + steps * self.scaling.extra_cols_per_level)
            .min(self.grid.max_cols.max(self.grid.cols));
        (rows, cols)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.rewards_by_row.is_empty() {
            return Err(TuningError::EmptyRewards);
        }
        self.power_up_weights.validate()?;
        if !(0.0..=1.0).contains(&self.power_up_chance) {
            return Err(TuningError::OutOfRange {
                field: "power_up_chance",
                value: self.power_up_chance,
            });
        }
        // The paddle clamp needs a non-empty range
        if !(0.0..PLAY_HALF_WIDTH).contains(&self.paddle.margin) {
            return Err(TuningError::OutOfRange {
                field: "paddle.margin",
                value: self.paddle.margin,
            });
        }
        let positives = [
            ("paddle.width", self.paddle.width),
            ("paddle.height", self.paddle.height),
            ("paddle.widen_factor", self.paddle.widen_factor),
            ("ball.motion_scale", self.ball.motion_scale),
            ("ball.launch_speed", self.ball.launch_speed),
            ("ball.bounce_speed", self.ball.bounce_speed),
            ("grid.cell_width", self.grid.cell_width),
            ("grid.cell_height", self.grid.cell_height),
            ("power_up_fall_speed", self.power_up_fall_speed),
            ("invaders.player_bullet_speed", self.invaders.player_bullet_speed),
            ("invaders.enemy_fire_interval", self.invaders.enemy_fire_interval),
        ];
        for (field, value) in positives {
            if !(value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(TuningError::NonPositive {
                field: "grid.rows/cols",
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for InvaderTuning {
    fn default() -> Self {
        Self {
            march_speed: 1.5,
            drop_step: 0.6,
            player_bullet_speed: 14.0,
            enemy_bullet_speed: 7.0,
            fire_cooldown: 0.3,
            max_player_bullets: 3,
            enemy_fire_interval: 1.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_breakout_weight_thresholds() {
        let t = Tuning::breakout().power_up_weights.thresholds();
        assert!((t[0] - 0.65).abs() < 1e-5);
        assert!((t[1] - 0.90).abs() < 1e-5);
        assert!((t[2] - 1.0).abs() < 1e-5);
        // Chaos has zero weight, so it shares the final threshold
        assert!((t[3] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_at_threshold_boundaries() {
        let w = Tuning::breakout().power_up_weights;
        let eps = 1e-4;
        assert_eq!(w.pick(0.0), PowerUpKind::Widen);
        assert_eq!(w.pick(0.65 - eps), PowerUpKind::Widen);
        assert_eq!(w.pick(0.65 + eps), PowerUpKind::MultiBall);
        assert_eq!(w.pick(0.90 - eps), PowerUpKind::MultiBall);
        assert_eq!(w.pick(0.90 + eps), PowerUpKind::ExtraLife);
        assert_eq!(w.pick(1.0 - eps), PowerUpKind::ExtraLife);
    }

    #[test]
    fn test_pick_never_returns_zero_weight_kind() {
        let w = Tuning::breakout().power_up_weights;
        assert_ne!(w.pick(1.0), PowerUpKind::Chaos);
    }

    #[test]
    fn test_invaders_rewards_by_row() {
        let t = Tuning::invaders();
        assert_eq!(t.reward_for_row(0), 30);
        assert_eq!(t.reward_for_row(4), 10);
        // Rows past the table reuse the last reward
        assert_eq!(t.reward_for_row(9), 10);
    }

    #[test]
    fn test_grid_dims_scale_and_cap() {
        let b = Tuning::breakout();
        assert_eq!(b.grid_dims(1), (6, 8));
        assert_eq!(b.grid_dims(7), (6, 8));

        let i = Tuning::invaders();
        assert_eq!(i.grid_dims(1), (5, 8));
        assert_eq!(i.grid_dims(3), (5, 10));
        assert_eq!(i.grid_dims(20), (5, 11));
    }

    #[test]
    fn test_speed_multiplier_caps() {
        let s = Tuning::breakout().scaling;
        assert_eq!(s.speed_multiplier(1), 1.0);
        assert!((s.speed_multiplier(3) - 1.1).abs() < 1e-5);
        assert!((s.speed_multiplier(50) - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_multi_ball_policies() {
        assert_eq!(MultiBallPolicy::Flat { count: 3 }.extra_balls(5, 1), 3);
        let ft = MultiBallPolicy::FirstThen { first: 2, then: 3 };
        assert_eq!(ft.extra_balls(0, 1), 2);
        assert_eq!(ft.extra_balls(1, 3), 3);
        assert_eq!(MultiBallPolicy::Double.extra_balls(0, 4), 4);
    }

    #[test]
    fn test_json_round_trip_and_validation() {
        let json = Tuning::invaders().to_json().unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.rules, RuleSet::Invaders);

        let mut bad = Tuning::breakout();
        bad.power_up_weights.widen = -1.0;
        let json = serde_json::to_string(&bad).unwrap();
        assert!(matches!(
            Tuning::from_json(&json),
            Err(TuningError::InvalidWeights)
        ));

        assert!(matches!(
            Tuning::from_json("{not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_empty_rewards() {
        let mut t = Tuning::breakout();
        t.rewards_by_row.clear();
        assert!(matches!(t.validate(), Err(TuningError::EmptyRewards)));
    }

    #[test]
    fn test_rejects_margin_wider_than_field() {
        let mut t = Tuning::breakout();
        t.paddle.margin = PLAY_HALF_WIDTH + 1.0;
        let json = t.to_json().unwrap();
        assert!(matches!(
            Tuning::from_json(&json),
            Err(TuningError::OutOfRange { field: "paddle.margin", .. })
        ));

        t.paddle.margin = f32::NAN;
        assert!(matches!(t.validate(), Err(TuningError::OutOfRange { .. })));

        t.paddle.margin = 2.0;
        assert!(t.validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_pick_respects_thresholds(sample in 0.0f32..1.0) {
            let w = Tuning::invaders().power_up_weights;
            let t = w.thresholds();
            let expected = if sample < t[0] - 1e-5 {
                Some(PowerUpKind::Widen)
            } else if sample > t[0] + 1e-5 && sample < t[1] - 1e-5 {
                Some(PowerUpKind::MultiBall)
            } else if sample > t[1] + 1e-5 && sample < t[2] - 1e-5 {
                Some(PowerUpKind::ExtraLife)
            } else if sample > t[2] + 1e-5 {
                Some(PowerUpKind::Chaos)
            } else {
                None
            };
            if let Some(kind) = expected {
                prop_assert_eq!(w.pick(sample), kind);
            }
        }
    }
}
