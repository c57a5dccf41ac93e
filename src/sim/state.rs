//! Game state and core simulation types
//!
//! Everything a session needs lives in [`GameState`]; there are no globals.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::effects::ActiveEffects;
use super::events::GameEvent;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::palette::{Palette, Rgb, Theme};
use crate::tuning::Tuning;

/// Top-level session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first start of a session
    Idle,
    /// Active gameplay
    Playing,
    /// A life was lost; waiting for start to relaunch
    Paused,
    /// Every target destroyed; next level generated, waiting for start
    LevelCleared,
    /// No lives left
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::LevelCleared => "level-cleared",
            GamePhase::GameOver => "gameover",
        }
    }

    /// Phases that a start command can leave
    pub fn awaits_start(&self) -> bool {
        matches!(
            self,
            GamePhase::Idle | GamePhase::Paused | GamePhase::LevelCleared
        )
    }
}

/// The player's paddle (Breakout) or ship (Invaders)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    /// Position the paddle eases toward, set by input
    pub target_x: f32,
    /// Visual scale; x carries Widen, y carries the hit squash
    pub scale: Vec2,
    pub color: Rgb,
}

impl Paddle {
    pub fn new(color: Rgb) -> Self {
        Self {
            x: 0.0,
            y: PADDLE_Y,
            target_x: 0.0,
            scale: Vec2::ONE,
            color,
        }
    }

    /// Current full width including Widen
    pub fn width(&self, base_width: f32) -> f32 {
        base_width * self.scale.x
    }

    /// Ease toward the target (exponential smoothing)
    pub fn move_toward_target(&mut self, dt: f32, smoothing: f32) {
        let blend = (smoothing * dt).min(1.0);
        self.x += (self.target_x - self.x) * blend;
    }

    /// Re-center and drop transient scale
    pub fn recenter(&mut self) {
        self.x = 0.0;
        self.target_x = 0.0;
        self.scale = Vec2::ONE;
    }
}

/// Who a projectile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Bouncing ball (Breakout)
    Ball,
    /// Shot fired upward by the ship
    PlayerShot,
    /// Shot fired downward by an invader
    EnemyShot,
}

/// Fixed-capacity history of past positions (rendering only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trail {
    points: VecDeque<Vec3>,
}

impl Trail {
    pub fn record(&mut self, pos: Vec3) {
        if self.points.len() == TRAIL_LENGTH {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest to newest
    pub fn points(&self) -> impl ExactSizeIterator<Item = &Vec3> {
        self.points.iter()
    }
}

/// A ball or a bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Collision half extents in the play plane
    pub half: Vec2,
    #[serde(skip)]
    pub trail: Trail,
}

impl Projectile {
    pub fn ball(id: u32, pos: Vec3) -> Self {
        Self {
            id,
            kind: ProjectileKind::Ball,
            pos,
            vel: Vec3::ZERO,
            half: Vec2::splat(BALL_RADIUS),
            trail: Trail::default(),
        }
    }

    pub fn shot(id: u32, kind: ProjectileKind, pos: Vec3, vel: Vec3) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            half: Vec2::new(BULLET_HALF_WIDTH, BULLET_HALF_HEIGHT),
            trail: Trail::default(),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos.truncate(), self.half)
    }

    pub fn is_launched(&self) -> bool {
        self.vel != Vec3::ZERO
    }
}

/// A brick or an invader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Grid cell center
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Row index counted from the top of the grid
    pub row: u32,
    pub col: u32,
    pub color: Rgb,
    pub emissive: f32,
    pub active: bool,
    /// Cosmetic offset added by Chaos; never used for collision
    #[serde(default)]
    pub jitter: Vec2,
}

impl Target {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(self.width / 2.0, self.height / 2.0))
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Temporarily widen the paddle
    Widen,
    /// One extra life
    ExtraLife,
    /// Spawn extra balls
    MultiBall,
    /// Scramble the look of the remaining targets
    Chaos,
}

impl PowerUpKind {
    pub fn color(&self) -> Rgb {
        match self {
            PowerUpKind::Widen => Rgb::hex(0x00aaff),
            PowerUpKind::MultiBall => Rgb::hex(0xffff00),
            PowerUpKind::ExtraLife => Rgb::hex(0x00ff66),
            PowerUpKind::Chaos => Rgb::hex(0xff00ff),
        }
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Spin around y (cosmetic)
    pub rotation: f32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub color: Rgb,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Lock-step invader sweep state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    /// +1 marching right, -1 marching left
    pub direction: f32,
    /// Seconds until the next enemy shot
    pub fire_timer: f32,
    /// Seconds until the ship may fire again
    pub player_cooldown: f32,
}

impl Default for Formation {
    fn default() -> Self {
        Self {
            direction: 1.0,
            fire_timer: 1.0,
            player_cooldown: 0.0,
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    /// Selected theme; may be Auto
    pub theme: Theme,
    /// Concrete theme the current grid was built with
    #[serde(default)]
    pub grid_theme: Theme,
    /// Level speed multiplier applied to launches and formation march
    pub speed_multiplier: f32,
    /// Simulation clock (seconds)
    pub time: f64,
    pub paddle: Paddle,
    pub projectiles: Vec<Projectile>,
    pub targets: Vec<Target>,
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    pub effects: ActiveEffects,
    pub formation: Formation,
    /// MultiBall pickups since the last life was lost
    pub multi_ball_pickups: u32,
    /// Camera shake intensity, decays every tick
    pub screen_shake: f32,
    /// Ceiling height for the current grid
    pub ceiling_y: f32,
    /// Notifications raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Sound cues raised since the last drain
    #[serde(skip)]
    pub sounds: Vec<SoundCue>,
    next_id: u32,
}

impl GameState {
    /// Create a new session in the Idle phase
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let theme = Theme::Night;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Idle,
            score: 0,
            lives: START_LIVES,
            level: 1,
            theme,
            grid_theme: theme,
            speed_multiplier: 1.0,
            time: 0.0,
            paddle: Paddle::new(theme.palette(0.0).paddle),
            projectiles: Vec::new(),
            targets: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            effects: ActiveEffects::default(),
            formation: Formation::default(),
            multi_ball_pickups: 0,
            screen_shake: 0.0,
            ceiling_y: 0.0,
            events: Vec::new(),
            sounds: Vec::new(),
            next_id: 1,
        };
        state.apply_level_variation();
        state.generate_targets();
        state.reset_projectiles();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Palette of the current grid
    ///
    /// Auto only flips between day and night when a grid is generated, so
    /// paddle, targets and scene stay consistent for a whole level.
    pub fn palette(&self) -> &'static Palette {
        self.grid_theme.palette(self.time)
    }

    pub fn balls(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles
            .iter()
            .filter(|p| p.kind == ProjectileKind::Ball)
    }

    pub fn ball_count(&self) -> usize {
        self.balls().count()
    }

    /// Number of live targets
    pub fn remaining_targets(&self) -> usize {
        self.targets.iter().filter(|t| t.active).count()
    }

    /// Queue a notification for the engine to deliver
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take queued notifications in the order they were raised
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    pub(crate) fn add_shake(&mut self, amount: f32) {
        self.screen_shake = self.screen_shake.max(amount);
    }
}
