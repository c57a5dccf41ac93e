//! Frame timing

use crate::consts::MAX_FRAME_DT;

/// Turns animation-frame timestamps into clamped deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    max_step: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_step: f32) -> Self {
        Self {
            last: None,
            max_step,
        }
    }

    /// Seconds since the previous frame, clamped to `[0, max_step]`
    ///
    /// The first frame after construction or [`FrameClock::reset`] is 0.
    pub fn advance(&mut self, now_secs: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now_secs - last) as f32,
            None => 0.0,
        };
        self.last = Some(now_secs);
        dt.clamp(0.0, self.max_step)
    }

    /// Forget the previous timestamp (tab hidden, loop restarted)
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(12.5), 0.0);
        assert!((clock.advance(12.516) - 0.016).abs() < 1e-5);
    }

    #[test]
    fn test_long_gaps_are_clamped() {
        let mut clock = FrameClock::default();
        clock.advance(0.0);
        // Tab came back after ten seconds
        assert_eq!(clock.advance(10.0), MAX_FRAME_DT);
        // Clock going backwards never yields a negative step
        assert_eq!(clock.advance(9.0), 0.0);
    }

    #[test]
    fn test_reset_restarts_timing() {
        let mut clock = FrameClock::default();
        clock.advance(1.0);
        clock.reset();
        assert_eq!(clock.advance(50.0), 0.0);
    }
}
