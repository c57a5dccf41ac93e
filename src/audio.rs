//! Sound effects
//!
//! The simulation only queues [`SoundCue`]s. Something implementing
//! [`SoundPlayer`] turns them into audio; on the web that is the sample
//! player in `audio::web`, natively it can be [`NullPlayer`].

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// UI button click
    UiClick,
    /// Level up / toggle
    UiSwitch,
    /// Ball hits paddle, ship fires
    Paddle,
    /// Target destroyed
    Brick,
    /// Power-up dropped
    PowerUpSpawn,
    /// Power-up collected
    PowerUpCollect,
    /// Life lost
    LifeLost,
    /// Ship destroyed / invasion
    Explosion,
    /// Chaos power-up
    Chaos,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 9] = [
        SoundEffect::UiClick,
        SoundEffect::UiSwitch,
        SoundEffect::Paddle,
        SoundEffect::Brick,
        SoundEffect::PowerUpSpawn,
        SoundEffect::PowerUpCollect,
        SoundEffect::LifeLost,
        SoundEffect::Explosion,
        SoundEffect::Chaos,
    ];

    /// Manifest name
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::UiClick => "uiClick",
            SoundEffect::UiSwitch => "uiSwitch",
            SoundEffect::Paddle => "paddle",
            SoundEffect::Brick => "brick",
            SoundEffect::PowerUpSpawn => "powerup_spawn",
            SoundEffect::PowerUpCollect => "powerup_collect",
            SoundEffect::LifeLost => "life_lost",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Chaos => "chaos",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Asset URL for the sample
    pub fn url(&self) -> &'static str {
        match self {
            SoundEffect::UiClick => "/assets/kenney_ui-audio/Audio/click1.ogg",
            SoundEffect::UiSwitch => "/assets/kenney_ui-audio/Audio/switch13.ogg",
            SoundEffect::Paddle => "/assets/kenney_sci-fi-sounds/Audio/laserSmall_001.ogg",
            SoundEffect::Brick => "/assets/kenney_sci-fi-sounds/Audio/impactMetal_002.ogg",
            SoundEffect::PowerUpSpawn => "/assets/kenney_sci-fi-sounds/Audio/forceField_002.ogg",
            SoundEffect::PowerUpCollect => "/assets/kenney_ui-audio/Audio/switch1.ogg",
            SoundEffect::LifeLost => {
                "/assets/kenney_sci-fi-sounds/Audio/lowFrequency_explosion_000.ogg"
            }
            SoundEffect::Explosion => "/assets/kenney_sci-fi-sounds/Audio/explosionCrunch_002.ogg",
            SoundEffect::Chaos => "/assets/kenney_sci-fi-sounds/Audio/computerNoise_000.ogg",
        }
    }
}

/// Per-play parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackParams {
    pub volume: f32,
    pub playback_rate: f32,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            playback_rate: 1.0,
        }
    }
}

impl PlaybackParams {
    pub fn volume(volume: f32) -> Self {
        Self {
            volume,
            ..Default::default()
        }
    }

    pub fn with_rate(mut self, playback_rate: f32) -> Self {
        self.playback_rate = playback_rate;
        self
    }
}

/// A sound requested by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub effect: SoundEffect,
    pub params: PlaybackParams,
}

/// Fire-and-forget sound sink
pub trait SoundPlayer {
    fn play(&mut self, effect: SoundEffect, params: PlaybackParams);
}

/// Player that drops every sound
#[derive(Debug, Default)]
pub struct NullPlayer;

impl SoundPlayer for NullPlayer {
    fn play(&mut self, _effect: SoundEffect, _params: PlaybackParams) {}
}

/// Applies volume settings before handing cues to a player
pub struct AudioManager {
    player: Box<dyn SoundPlayer>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullPlayer))
    }
}

impl AudioManager {
    pub fn new(player: Box<dyn SoundPlayer>) -> Self {
        Self {
            player,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn set_player(&mut self, player: Box<dyn SoundPlayer>) {
        self.player = player;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a queued cue
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume() * cue.params.volume;
        if vol <= 0.0 {
            return;
        }
        self.player.play(
            cue.effect,
            PlaybackParams {
                volume: vol,
                playback_rate: cue.params.playback_rate,
            },
        );
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<(SoundEffect, PlaybackParams)>>>);

    impl SoundPlayer for Recorder {
        fn play(&mut self, effect: SoundEffect, params: PlaybackParams) {
            self.0.borrow_mut().push((effect, params));
        }
    }

    #[test]
    fn test_manifest_names_round_trip() {
        for effect in SoundEffect::ALL {
            assert_eq!(SoundEffect::from_name(effect.name()), Some(effect));
            assert!(effect.url().ends_with(".ogg"));
        }
        assert_eq!(SoundEffect::from_name("kazoo"), None);
    }

    #[test]
    fn test_volume_scaling_and_mute() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Box::new(Recorder(log.clone())));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);

        audio.play(SoundCue {
            effect: SoundEffect::Brick,
            params: PlaybackParams::volume(0.8).with_rate(1.1),
        });
        {
            let log = log.borrow();
            assert_eq!(log.len(), 1);
            assert!((log[0].1.volume - 0.2).abs() < 1e-6);
            assert!((log[0].1.playback_rate - 1.1).abs() < 1e-6);
        }

        audio.set_muted(true);
        audio.play(SoundCue {
            effect: SoundEffect::Brick,
            params: PlaybackParams::default(),
        });
        assert_eq!(log.borrow().len(), 1);
    }
}
