//! Themes, palettes and color helpers
//!
//! Colors are plain linear-ish RGB triples; the renderer decides how to
//! map them to materials.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::AUTO_THEME_PERIOD;
use crate::error::SettingsError;

/// RGB color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub const fn hex(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as f32 / 255.0,
            g: ((v >> 8) & 0xff) as f32 / 255.0,
            b: (v & 0xff) as f32 / 255.0,
        }
    }

    /// HSL to RGB, all inputs in `[0, 1]` (hue wraps)
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        if s <= 0.0 {
            return Self::new(l, l, l);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::new(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    }

    pub fn scale(self, f: f32) -> Self {
        Self::new(self.r * f, self.g * f, self.b * f)
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Night,
    Day,
    /// Alternates between night and day over session time
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Night => "night",
            Theme::Day => "day",
            Theme::Auto => "auto",
        }
    }

    /// Concrete theme at a point in session time
    pub fn resolve(self, session_time: f64) -> Theme {
        match self {
            Theme::Auto => {
                let half_cycles = (session_time.max(0.0) / AUTO_THEME_PERIOD) as u64;
                if half_cycles % 2 == 0 {
                    Theme::Night
                } else {
                    Theme::Day
                }
            }
            other => other,
        }
    }

    pub fn palette(self, session_time: f64) -> &'static Palette {
        match self.resolve(session_time) {
            Theme::Day => &DAY,
            _ => &NIGHT,
        }
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "night" => Ok(Theme::Night),
            "day" => Ok(Theme::Day),
            "auto" => Ok(Theme::Auto),
            _ => Err(SettingsError::UnknownTheme(s.to_string())),
        }
    }
}

/// Scene colors for one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub paddle: Rgb,
    pub ball: Rgb,
    pub wall: Rgb,
    pub background: Rgb,
    pub grid_primary: Rgb,
    pub grid_secondary: Rgb,
    pub accent: Rgb,
    pub ambient: Rgb,
    /// Emissive intensity applied to targets
    pub target_glow: f32,
    /// Multiplier applied to particle colors
    pub particle_gain: f32,
    /// Bloom pass strength suggested for this theme
    pub bloom_strength: f32,
}

pub const NIGHT: Palette = Palette {
    paddle: Rgb::hex(0x00f3ff),
    ball: Rgb::hex(0xff0099),
    wall: Rgb::hex(0x050505),
    background: Rgb::hex(0x050505),
    grid_primary: Rgb::hex(0xff0099),
    grid_secondary: Rgb::hex(0x220033),
    accent: Rgb::hex(0x00f3ff),
    ambient: Rgb::hex(0x111111),
    target_glow: 1.5,
    particle_gain: 1.0,
    bloom_strength: 0.5,
};

pub const DAY: Palette = Palette {
    paddle: Rgb::hex(0xff3300),
    ball: Rgb::hex(0x111111),
    wall: Rgb::hex(0x34495e),
    background: Rgb::hex(0xf0f5fa),
    grid_primary: Rgb::hex(0xb0c4de),
    grid_secondary: Rgb::hex(0xe6e6fa),
    accent: Rgb::hex(0xff3300),
    ambient: Rgb::hex(0xffffff),
    target_glow: 0.5,
    particle_gain: 1.2,
    bloom_strength: 0.35,
};

/// Paddle tint cycled through on level-up (first slot is the theme's own color)
pub const LEVEL_PADDLE_COLORS: [Rgb; 2] = [Rgb::hex(0xff00ff), Rgb::hex(0xffff00)];

/// Paddle color for a level
pub fn paddle_color(palette: &Palette, level: u32) -> Rgb {
    match level.saturating_sub(1) % 3 {
        0 => palette.paddle,
        n => LEVEL_PADDLE_COLORS[n as usize - 1],
    }
}

/// Gradient color of a grid cell, shifted by level
pub fn target_color(row: u32, col: u32, rows: u32, cols: u32, level: u32, hue_step: f32) -> Rgb {
    let level_offset = (level.saturating_sub(1) as f32 * hue_step).rem_euclid(1.0);
    let hue = (col as f32 / cols.max(1) as f32) * 0.3
        + (row as f32 / rows.max(1) as f32) * 0.2
        + level_offset;
    Rgb::from_hsl(hue, 1.0, 0.5)
}
