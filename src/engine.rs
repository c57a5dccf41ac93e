//! Session driver
//!
//! Owns the game state and everything around it: listeners, audio, input
//! mapping, frame timing and the renderer. Hosts call commands on it and
//! feed it animation-frame timestamps.

use crate::audio::{AudioManager, SoundPlayer};
use crate::consts::MAX_FRAME_DT;
use crate::error::SettingsError;
use crate::palette::Theme;
use crate::platform::{FrameClock, InputMapper};
use crate::render::{NullRenderer, Renderer, build_frame};
use crate::settings::Settings;
use crate::sim::{EventBus, EventKind, GameEvent, GamePhase, GameState, ListenerId, tick};
use crate::tuning::Tuning;

/// Size of the surface the game is drawn on, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

pub struct Engine {
    state: GameState,
    settings: Settings,
    bus: EventBus,
    audio: AudioManager,
    input: InputMapper,
    clock: FrameClock,
    renderer: Box<dyn Renderer>,
    viewport: RenderTarget,
    autopilot: bool,
    initialized: bool,
}

impl Engine {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let margin = tuning.paddle.margin;
        let mut state = GameState::new(seed, tuning);
        let theme = settings.effective_theme();
        if theme != state.theme {
            state.set_theme(theme);
        }

        let mut audio = AudioManager::default();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);

        log::info!(
            "Engine created: {:?} rules, seed {}",
            state.tuning.rules,
            seed
        );

        Self {
            state,
            settings,
            bus: EventBus::new(),
            audio,
            input: InputMapper::new(margin),
            clock: FrameClock::default(),
            renderer: Box::new(NullRenderer),
            viewport: RenderTarget::default(),
            autopilot: false,
            initialized: false,
        }
    }

    /// Attach the render target and renderer
    pub fn init(&mut self, target: RenderTarget, renderer: Box<dyn Renderer>) {
        if self.initialized {
            log::warn!("init called twice; replacing renderer");
        }
        self.renderer = renderer;
        self.initialized = true;
        self.resize(target.width, target.height);
        self.render();
        log::info!("Engine initialized at {}x{}", target.width, target.height);
    }

    // === Notifications ===

    pub fn on(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> ListenerId {
        self.bus.on(kind, listener)
    }

    /// Subscribe by event name ("score", "lives", ...)
    pub fn on_name(
        &mut self,
        name: &str,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> Option<ListenerId> {
        match EventKind::from_name(name) {
            Some(kind) => Some(self.bus.on(kind, listener)),
            None => {
                log::warn!("Unknown event name '{}'", name);
                None
            }
        }
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.bus.off(id)
    }

    // === Commands ===

    pub fn start(&mut self) {
        self.state.start();
        self.flush();
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.clock.reset();
        self.flush();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = RenderTarget { width, height };
        self.input.resize(width as f32);
        self.renderer.resize(width, height);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        self.state.set_theme(self.settings.effective_theme());
        self.settings.save();
    }

    pub fn set_theme_name(&mut self, name: &str) -> Result<(), SettingsError> {
        let theme: Theme = name.parse()?;
        self.set_theme(theme);
        Ok(())
    }

    pub fn toggle_bloom(&mut self, enabled: bool) {
        self.settings.bloom = enabled;
        self.settings.save();
    }

    /// Switch between the auto day/night cycle and the night theme
    ///
    /// Rebuilds the grid like any other theme change.
    pub fn toggle_auto_theme(&mut self, enabled: bool) {
        self.set_theme(if enabled { Theme::Auto } else { Theme::Night });
    }

    pub fn set_volume(&mut self, master: f32, sfx: f32) {
        self.audio.set_master_volume(master);
        self.audio.set_sfx_volume(sfx);
        self.settings.master_volume = master.clamp(0.0, 1.0);
        self.settings.sfx_volume = sfx.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
        self.settings.muted = muted;
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
        log::info!("Autopilot: {}", enabled);
    }

    pub fn set_sound_player(&mut self, player: Box<dyn SoundPlayer>) {
        self.audio.set_player(player);
    }

    // === Input ===

    pub fn key_down(&mut self, code: &str) -> bool {
        self.input.key_down(code)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.input.key_up(code)
    }

    pub fn pointer_move(&mut self, screen_x: f32) {
        self.input.pointer_move(screen_x);
    }

    pub fn pointer_down(&mut self, screen_x: f32) {
        self.input.pointer_down(screen_x);
    }

    pub fn pointer_up(&mut self) {
        self.input.pointer_up();
    }

    /// Window lost focus: drop held keys and restart frame timing
    pub fn blur(&mut self) {
        self.input.release_all();
        self.clock.reset();
    }

    // === Frame loop ===

    /// Run one animation frame at `now_secs`; returns the step taken
    pub fn frame(&mut self, now_secs: f64) -> f32 {
        let dt = self.clock.advance(now_secs);
        self.step(dt);
        self.render();
        dt
    }

    /// Advance the simulation by `dt` seconds (clamped) and deliver what it raised
    pub fn step(&mut self, dt: f32) {
        let mut input = self.input.tick_input();
        input.autopilot = self.autopilot;
        tick(&mut self.state, &input, dt.clamp(0.0, MAX_FRAME_DT));
        self.flush();
    }

    pub fn render(&mut self) {
        if !self.initialized {
            return;
        }
        let frame = build_frame(&self.state, &self.settings);
        self.renderer.render(&frame);
    }

    /// Deliver queued notifications and sounds
    fn flush(&mut self) {
        for event in self.state.drain_events() {
            self.bus.emit(&event);
        }
        for cue in self.state.drain_sounds() {
            self.audio.play(cue);
        }
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewport(&self) -> RenderTarget {
        self.viewport
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn lives(&self) -> u32 {
        self.state.lives
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("phase", &self.state.phase)
            .field("score", &self.state.score)
            .field("lives", &self.state.lives)
            .field("level", &self.state.level)
            .field("bus", &self.bus)
            .field("audio", &self.audio)
            .field("viewport", &self.viewport)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{PlaybackParams, SoundEffect};
    use crate::palette::NIGHT;
    use crate::render::RenderFrame;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> Engine {
        Engine::new(42, Tuning::breakout(), Settings::default())
    }

    fn record(engine: &mut Engine, kind: EventKind) -> Rc<RefCell<Vec<GameEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        engine.on(kind, move |e| sink.borrow_mut().push(*e));
        log
    }

    struct FrameCounter(Rc<RefCell<usize>>);

    impl Renderer for FrameCounter {
        fn render(&mut self, frame: &RenderFrame<'_>) {
            assert!(!frame.targets.is_empty());
            *self.0.borrow_mut() += 1;
        }
    }

    struct Recorder(Rc<RefCell<Vec<SoundEffect>>>);

    impl SoundPlayer for Recorder {
        fn play(&mut self, effect: SoundEffect, _params: PlaybackParams) {
            self.0.borrow_mut().push(effect);
        }
    }

    #[test]
    fn test_start_notifies_score_and_lives() {
        let mut engine = engine();
        let scores = record(&mut engine, EventKind::Score);
        let lives = record(&mut engine, EventKind::Lives);
        let states = record(&mut engine, EventKind::State);

        engine.start();
        assert_eq!(*scores.borrow(), vec![GameEvent::Score(0)]);
        assert_eq!(*lives.borrow(), vec![GameEvent::Lives(3)]);
        assert_eq!(*states.borrow(), vec![GameEvent::State(GamePhase::Playing)]);

        // Second start is a no-op
        engine.start();
        assert_eq!(scores.borrow().len(), 1);
    }

    #[test]
    fn test_off_stops_delivery() {
        let mut engine = engine();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        let id = engine.on_name("score", move |_| *h.borrow_mut() += 1).unwrap();
        engine.reset();
        assert!(engine.off(id));
        engine.reset();
        assert_eq!(*hits.borrow(), 1);
        assert!(engine.on_name("bogus", |_| {}).is_none());
    }

    #[test]
    fn test_unknown_theme_name() {
        let mut engine = engine();
        assert!(matches!(
            engine.set_theme_name("sepia"),
            Err(SettingsError::UnknownTheme(_))
        ));
        engine.set_theme_name("day").unwrap();
        assert_eq!(engine.state().theme, Theme::Day);
        assert_eq!(engine.settings().theme, Theme::Day);
    }

    #[test]
    fn test_auto_theme_toggle() {
        let mut engine = engine();
        engine.toggle_auto_theme(true);
        assert_eq!(engine.state().theme, Theme::Auto);
        engine.toggle_auto_theme(false);
        assert_eq!(engine.state().theme, Theme::Night);
        engine.toggle_bloom(false);
        assert!(!engine.settings().bloom);
    }

    #[test]
    fn test_auto_theme_toggle_rebuilds_grid() {
        let mut engine = engine();
        engine.set_theme(Theme::Day);
        engine.toggle_auto_theme(false);
        let glow = NIGHT.target_glow;
        assert_eq!(engine.state().theme, Theme::Night);
        assert!(
            engine
                .state()
                .targets
                .iter()
                .all(|t| (t.emissive - glow).abs() < 1e-6)
        );
        assert_eq!(engine.state().paddle.color, NIGHT.paddle);
    }

    #[test]
    fn test_frame_clamps_long_gaps() {
        let mut engine = engine();
        engine.start();
        assert_eq!(engine.frame(100.0), 0.0);
        assert_eq!(engine.frame(110.0), MAX_FRAME_DT);
        assert!((engine.state().time - MAX_FRAME_DT as f64).abs() < 1e-9);
    }

    #[test]
    fn test_renderer_receives_frames_after_init() {
        let mut engine = engine();
        let frames = Rc::new(RefCell::new(0));
        engine.frame(0.0);
        assert_eq!(*frames.borrow(), 0);

        engine.init(
            RenderTarget {
                width: 800,
                height: 600,
            },
            Box::new(FrameCounter(frames.clone())),
        );
        engine.frame(0.016);
        assert_eq!(*frames.borrow(), 2);
        assert_eq!(engine.viewport().width, 800);
    }

    #[test]
    fn test_sounds_reach_player() {
        let mut engine = engine();
        let played = Rc::new(RefCell::new(Vec::new()));
        engine.set_sound_player(Box::new(Recorder(played.clone())));
        engine.set_autopilot(true);

        let mut t = 0.0;
        for _ in 0..(60 * 20) {
            t += 1.0 / 60.0;
            engine.frame(t);
        }
        assert!(played.borrow().contains(&SoundEffect::Paddle));
        assert!(played.borrow().contains(&SoundEffect::Brick));

        engine.set_muted(true);
        let before = played.borrow().len();
        for _ in 0..(60 * 5) {
            t += 1.0 / 60.0;
            engine.frame(t);
        }
        assert_eq!(played.borrow().len(), before);
    }

    #[test]
    fn test_game_over_then_start_plays_again() {
        let mut engine = engine();
        let overs = record(&mut engine, EventKind::GameOver);
        engine.start();
        for _ in 0..3 {
            engine.state.projectiles.clear();
            engine.step(1.0 / 60.0);
            engine.start();
        }
        assert_eq!(overs.borrow().len(), 1);
        // The last start began a fresh session
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.lives(), 3);
        assert_eq!(engine.score(), 0);
    }
}
