//! Level generation and per-level variation

use glam::Vec2;

use super::state::{GameState, Target};
use crate::consts::CEILING_CLEARANCE;
use crate::palette::{paddle_color, target_color};

impl GameState {
    /// Apply the difficulty and color variation for the current level
    pub fn apply_level_variation(&mut self) {
        self.speed_multiplier = self.tuning.scaling.speed_multiplier(self.level);
        self.grid_theme = self.theme.resolve(self.time);
        let palette = self.palette();
        self.paddle.color = paddle_color(palette, self.level);
    }

    /// Regenerate the full target grid for the current level and theme
    ///
    /// Always rebuilds every cell; destroyed targets come back.
    pub fn generate_targets(&mut self) {
        let (rows, cols) = self.tuning.grid_dims(self.level);
        let grid = self.tuning.grid.clone();
        let hue_step = self.tuning.scaling.hue_step;
        self.grid_theme = self.theme.resolve(self.time);
        let glow = self.palette().target_glow;

        let pitch = Vec2::new(grid.cell_width + grid.gap, grid.cell_height + grid.gap);
        let start_x = -(cols as f32 * pitch.x) / 2.0 + pitch.x / 2.0;

        self.targets.clear();
        self.targets.reserve((rows * cols) as usize);
        for r in 0..rows {
            for c in 0..cols {
                let id = self.next_entity_id();
                self.targets.push(Target {
                    id,
                    pos: Vec2::new(start_x + c as f32 * pitch.x, grid.base_y + r as f32 * pitch.y),
                    width: grid.cell_width,
                    height: grid.cell_height,
                    row: rows - 1 - r,
                    col: c,
                    color: target_color(r, c, rows, cols, self.level, hue_step),
                    emissive: glow,
                    active: true,
                    jitter: Vec2::ZERO,
                });
            }
        }

        // Keep the top row reachable before the ceiling bounce
        let highest_row_center = grid.base_y + rows.saturating_sub(1) as f32 * pitch.y;
        self.ceiling_y = highest_row_center + grid.cell_height / 2.0 + CEILING_CLEARANCE;

        log::info!(
            "Level {} grid: {}x{} targets, ceiling {:.2}",
            self.level,
            rows,
            cols,
            self.ceiling_y
        );
    }
}
