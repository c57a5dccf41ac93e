//! Timed effects
//!
//! Each running effect is an entry `(kind, expires_at)` checked once per
//! tick against simulation time. There is at most one entry per kind, so
//! cancelling everything is a plain clear.

use serde::{Deserialize, Serialize};

/// Effect with a deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Paddle widened by a power-up
    Widen,
    /// Paddle squashed after a ball hit
    Squash,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub expires_at: f64,
}

/// Whether [`ActiveEffects::activate`] started or extended an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Started,
    Extended,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    entries: Vec<ActiveEffect>,
}

impl ActiveEffects {
    /// Start an effect, or replace the deadline of the running one
    pub fn activate(&mut self, kind: EffectKind, now: f64, duration: f32) -> Activation {
        let expires_at = now + duration as f64;
        match self.entries.iter_mut().find(|e| e.kind == kind) {
            Some(entry) => {
                entry.expires_at = expires_at;
                Activation::Extended
            }
            None => {
                self.entries.push(ActiveEffect { kind, expires_at });
                Activation::Started
            }
        }
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// Seconds left on an effect
    pub fn remaining(&self, kind: EffectKind, now: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| (e.expires_at - now).max(0.0))
    }

    /// Remove and return every effect whose deadline has passed
    pub fn expire(&mut self, now: f64) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.entries.retain(|e| {
            if e.expires_at <= now {
                expired.push(e.kind);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Cancel everything, returning what was running
    pub fn clear(&mut self) -> Vec<EffectKind> {
        self.entries.drain(..).map(|e| e.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reactivation_replaces_deadline() {
        let mut fx = ActiveEffects::default();
        assert_eq!(fx.activate(EffectKind::Widen, 0.0, 8.0), Activation::Started);
        assert_eq!(fx.activate(EffectKind::Widen, 5.0, 8.0), Activation::Extended);
        assert_eq!(fx.len(), 1);
        assert!((fx.remaining(EffectKind::Widen, 5.0).unwrap() - 8.0).abs() < 1e-9);

        // First deadline passes without expiring
        assert!(fx.expire(8.5).is_empty());
        assert_eq!(fx.expire(13.0), vec![EffectKind::Widen]);
        assert!(fx.is_empty());
    }

    #[test]
    fn test_expire_only_due_effects() {
        let mut fx = ActiveEffects::default();
        fx.activate(EffectKind::Squash, 0.0, 0.1);
        fx.activate(EffectKind::Widen, 0.0, 8.0);
        assert_eq!(fx.expire(0.2), vec![EffectKind::Squash]);
        assert!(fx.is_active(EffectKind::Widen));
        assert!(!fx.is_active(EffectKind::Squash));
    }

    #[test]
    fn test_clear_cancels_all() {
        let mut fx = ActiveEffects::default();
        fx.activate(EffectKind::Squash, 0.0, 0.1);
        fx.activate(EffectKind::Widen, 0.0, 8.0);
        let cancelled = fx.clear();
        assert_eq!(cancelled.len(), 2);
        assert!(fx.expire(100.0).is_empty());
    }
}
