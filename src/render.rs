//! Per-frame render snapshot
//!
//! The simulation never talks to a graphics API. Each frame the engine
//! builds a [`RenderFrame`] and hands it to whatever implements
//! [`Renderer`]; nothing is read back.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::consts::*;
use crate::palette::{Palette, Rgb};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Particle, ProjectileKind};

/// Scene-wide colors for the resolved theme
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneColors {
    pub background: Rgb,
    pub wall: Rgb,
    pub grid_primary: Rgb,
    pub grid_secondary: Rgb,
    pub ambient: Rgb,
    pub accent: Rgb,
}

impl From<&Palette> for SceneColors {
    fn from(p: &Palette) -> Self {
        Self {
            background: p.background,
            wall: p.wall,
            grid_primary: p.grid_primary,
            grid_secondary: p.grid_secondary,
            ambient: p.ambient,
            accent: p.accent,
        }
    }
}

/// Transform and look of one drawable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorView {
    pub id: u32,
    pub pos: Vec3,
    /// Full size in the play plane
    pub size: Vec2,
    /// Rotation around y (radians)
    pub rotation: f32,
    pub color: Rgb,
    pub emissive: f32,
}

/// One trail vertex, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailPoint {
    pub pos: Vec3,
    pub alpha: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub actor: ActorView,
    pub kind: ProjectileKind,
    pub trail: Vec<TrailPoint>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame<'a> {
    pub phase: GamePhase,
    /// Camera offset from sway and shake
    pub camera_offset: Vec2,
    pub colors: SceneColors,
    pub bloom: bool,
    pub bloom_strength: f32,
    pub paddle: ActorView,
    pub projectiles: Vec<ProjectileView>,
    pub targets: Vec<ActorView>,
    pub power_ups: Vec<ActorView>,
    pub particles: &'a [Particle],
}

/// Anything that can draw a frame
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame<'_>);

    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Renderer that draws nothing (headless runs)
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &RenderFrame<'_>) {}
}

/// Camera shake offset; deterministic in simulation time
pub fn shake_offset(shake: f32, time: f64) -> Vec2 {
    if shake <= 0.0 {
        return Vec2::ZERO;
    }
    let t = time as f32;
    Vec2::new((t * 91.7).sin(), (t * 77.3).cos()) * 0.5 * shake
}

/// Trail vertices fading and tapering from the ball back to the oldest point
fn trail_points<'a>(points: impl ExactSizeIterator<Item = &'a Vec3>, radius: f32) -> Vec<TrailPoint> {
    let len = points.len() as f32;
    points
        .enumerate()
        .map(|(i, &pos)| {
            // 0 at the oldest point, 1 at the newest
            let t = (i as f32 + 1.0) / len;
            TrailPoint {
                pos,
                alpha: t * 0.8,
                width: radius * (0.3 + 0.7 * t),
            }
        })
        .collect()
}

/// Build the snapshot for the current state
pub fn build_frame<'a>(state: &'a GameState, settings: &Settings) -> RenderFrame<'a> {
    let palette = state.palette();

    let sway = state
        .balls()
        .next()
        .map_or(0.0, |b| b.pos.x * 0.05);
    let shake = if settings.effective_screen_shake() {
        shake_offset(state.screen_shake, state.time)
    } else {
        Vec2::ZERO
    };

    let paddle = ActorView {
        id: 0,
        pos: Vec3::new(state.paddle.x, state.paddle.y, 0.0),
        size: Vec2::new(state.tuning.paddle.width, state.tuning.paddle.height) * state.paddle.scale,
        rotation: 0.0,
        color: state.paddle.color,
        emissive: palette.target_glow,
    };

    let projectiles = state
        .projectiles
        .iter()
        .map(|p| {
            let color = match p.kind {
                ProjectileKind::Ball => palette.ball,
                ProjectileKind::PlayerShot => state.paddle.color,
                ProjectileKind::EnemyShot => palette.accent,
            };
            let trail = if settings.trails && p.kind == ProjectileKind::Ball {
                trail_points(p.trail.points(), p.half.x)
            } else {
                Vec::new()
            };
            ProjectileView {
                actor: ActorView {
                    id: p.id,
                    pos: p.pos,
                    size: p.half * 2.0,
                    rotation: 0.0,
                    color,
                    emissive: 1.0,
                },
                kind: p.kind,
                trail,
            }
        })
        .collect();

    let targets = state
        .targets
        .iter()
        .filter(|t| t.active)
        .map(|t| ActorView {
            id: t.id,
            pos: (t.pos + t.jitter).extend(0.0),
            size: Vec2::new(t.width, t.height),
            rotation: 0.0,
            color: t.color,
            emissive: t.emissive,
        })
        .collect();

    let power_ups = state
        .power_ups
        .iter()
        .map(|p| ActorView {
            id: p.id,
            pos: p.pos,
            size: Vec2::splat(POWER_UP_RADIUS * 2.0),
            rotation: p.rotation,
            color: p.kind.color(),
            emissive: 2.0,
        })
        .collect();

    let particles: &[Particle] = if settings.particles {
        &state.particles
    } else {
        &[]
    };

    RenderFrame {
        phase: state.phase,
        camera_offset: Vec2::new(sway, 0.0) + shake,
        colors: SceneColors::from(palette),
        bloom: settings.bloom,
        bloom_strength: if settings.bloom {
            palette.bloom_strength
        } else {
            0.0
        },
        paddle,
        projectiles,
        targets,
        power_ups,
        particles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Theme;
    use crate::sim::{TickInput, tick};
    use crate::tuning::Tuning;

    #[test]
    fn test_frame_mirrors_state() {
        let state = GameState::new(3, Tuning::breakout());
        let frame = build_frame(&state, &Settings::default());
        assert_eq!(frame.targets.len(), 48);
        assert_eq!(frame.projectiles.len(), 1);
        assert_eq!(frame.phase, GamePhase::Idle);
        assert_eq!(frame.paddle.size, Vec2::new(4.0, 0.5));
        assert_eq!(frame.colors.background, Rgb::hex(0x050505));
    }

    #[test]
    fn test_widened_paddle_size() {
        let mut state = GameState::new(3, Tuning::breakout());
        state.paddle.scale.x = 1.5;
        let frame = build_frame(&state, &Settings::default());
        assert_eq!(frame.paddle.size.x, 6.0);
    }

    #[test]
    fn test_settings_gate_effects() {
        let mut state = GameState::new(3, Tuning::breakout());
        state.spawn_burst(Vec3::ZERO, Rgb::hex(0xffffff));
        state.screen_shake = 0.4;
        state.time = 0.37;

        let on = build_frame(&state, &Settings::default());
        assert_eq!(on.particles.len(), PARTICLE_BURST);

        let off = Settings {
            particles: false,
            screen_shake: false,
            bloom: false,
            ..Default::default()
        };
        let frame = build_frame(&state, &off);
        assert!(frame.particles.is_empty());
        assert_eq!(frame.bloom_strength, 0.0);
        // Only the sway of the parked ball remains
        assert_eq!(frame.camera_offset, Vec2::new(state.paddle.x * 0.05, 0.0));
    }

    #[test]
    fn test_trail_fades_toward_oldest() {
        let mut state = GameState::new(3, Tuning::breakout());
        state.start();
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), 1.0 / 60.0);
        }
        let frame = build_frame(&state, &Settings::default());
        let trail = &frame.projectiles[0].trail;
        assert_eq!(trail.len(), TRAIL_LENGTH);
        assert!(trail[0].alpha < trail[TRAIL_LENGTH - 1].alpha);
        assert!(trail[0].width < trail[TRAIL_LENGTH - 1].width);
    }

    #[test]
    fn test_day_theme_colors() {
        let mut state = GameState::new(3, Tuning::breakout());
        state.set_theme(Theme::Day);
        let frame = build_frame(&state, &Settings::default());
        assert_eq!(frame.colors.background, Rgb::hex(0xf0f5fa));
        assert!(frame.targets.iter().all(|t| (t.emissive - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_shake_offset_is_bounded() {
        for i in 0..100 {
            let o = shake_offset(0.4, i as f64 * 0.013);
            assert!(o.x.abs() <= 0.2 + 1e-6 && o.y.abs() <= 0.2 + 1e-6);
        }
        assert_eq!(shake_offset(0.0, 1.0), Vec2::ZERO);
    }
}
