//! Browser bindings
//!
//! `WebGame` is the object a page talks to. It owns the engine behind a
//! `RefCell`, wires DOM input to it, drives it from requestAnimationFrame and
//! forwards notifications to JavaScript callbacks.
//!
//! Callbacks are queued while the engine is borrowed and delivered once the
//! borrow is released, so a callback may call straight back into the game.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent, VisibilityState};

use crate::audio::web::WebAudioPlayer;
use crate::engine::{Engine, RenderTarget};
use crate::render::{NullRenderer, RenderFrame, Renderer, build_frame};
use crate::settings::Settings;
use crate::sim::{GameEvent, ListenerId};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // A second module instance on the page already installed a logger
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }
    log::info!("Neon Breaker module loaded");
}

/// Renderer that hands each frame to a JavaScript function as JSON
struct JsRenderer {
    draw: js_sys::Function,
}

impl Renderer for JsRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        match serde_json::to_string(frame) {
            Ok(json) => {
                if let Err(e) = self.draw.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("Render callback failed: {:?}", e);
                }
            }
            Err(e) => log::error!("Could not serialize frame: {}", e),
        }
    }
}

/// Value passed to a JavaScript listener for each notification
fn event_payload(event: &GameEvent) -> JsValue {
    match *event {
        GameEvent::Score(score) => JsValue::from_f64(score as f64),
        GameEvent::Lives(lives) => JsValue::from_f64(lives as f64),
        GameEvent::GameOver => JsValue::TRUE,
        GameEvent::Pause => JsValue::UNDEFINED,
        GameEvent::State(phase) => JsValue::from_str(phase.as_str()),
        GameEvent::LevelCleared(level) => JsValue::from_f64(level as f64),
    }
}

type Outbox = Rc<RefCell<Vec<(js_sys::Function, GameEvent)>>>;

struct Inner {
    engine: RefCell<Engine>,
    outbox: Outbox,
    /// Handles given to JavaScript index into this table
    listeners: RefCell<Vec<Option<ListenerId>>>,
    audio: WebAudioPlayer,
    running: Cell<bool>,
}

impl Inner {
    /// Run a command on the engine, then deliver what it raised
    fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
        let result = match self.engine.try_borrow_mut() {
            Ok(mut engine) => Some(f(&mut engine)),
            Err(_) => {
                log::warn!("Engine busy; command dropped");
                None
            }
        };
        self.dispatch();
        result
    }

    fn dispatch(&self) {
        let batch = std::mem::take(&mut *self.outbox.borrow_mut());
        for (callback, event) in batch {
            if let Err(e) = callback.call1(&JsValue::NULL, &event_payload(&event)) {
                log::warn!("Listener for {} failed: {:?}", event.kind().as_str(), e);
            }
        }
    }
}

#[wasm_bindgen]
pub struct WebGame {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game for `rules` ("breakout" or "invaders"), optionally
    /// overriding the preset with a tuning JSON document
    #[wasm_bindgen(constructor)]
    pub fn new(rules: Option<String>, tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let tuning = match (tuning_json, rules.as_deref()) {
            (Some(json), _) => {
                Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            (None, Some("invaders")) => Tuning::invaders(),
            (None, Some("breakout") | None) => Tuning::breakout(),
            (None, Some(other)) => {
                return Err(JsValue::from_str(&format!("unknown rules '{}'", other)));
            }
        };

        let seed = js_sys::Date::now() as u64;
        let mut engine = Engine::new(seed, tuning, Settings::load());

        let audio = WebAudioPlayer::new();
        audio.load_all();
        engine.set_sound_player(Box::new(audio.clone()));

        Ok(WebGame {
            inner: Rc::new(Inner {
                engine: RefCell::new(engine),
                outbox: Rc::new(RefCell::new(Vec::new())),
                listeners: RefCell::new(Vec::new()),
                audio,
                running: Cell::new(false),
            }),
        })
    }

    /// Attach to the canvas, hook up input and start the frame loop
    ///
    /// `draw` receives every frame as a JSON string. It runs while the
    /// engine is borrowed, so it must not call back into the game.
    pub fn init(&self, canvas_id: &str, draw: Option<js_sys::Function>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element '{}'", canvas_id)))?
            .dyn_into()
            .map_err(|_| JsValue::from_str(&format!("'{}' is not a canvas", canvas_id)))?;

        let target = RenderTarget {
            width: canvas.client_width().max(1) as u32,
            height: canvas.client_height().max(1) as u32,
        };
        let renderer: Box<dyn Renderer> = match draw {
            Some(draw) => Box::new(JsRenderer { draw }),
            None => Box::new(NullRenderer),
        };
        self.inner.with_engine(|e| e.init(target, renderer));

        setup_input_handlers(&canvas, self.inner.clone())?;
        setup_window_handlers(&canvas, self.inner.clone())?;

        if !self.inner.running.replace(true) {
            request_animation_frame(self.inner.clone());
        }
        Ok(())
    }

    /// Stop the frame loop (the game can be resumed with `init`)
    pub fn stop(&self) {
        self.inner.running.set(false);
    }

    pub fn start(&self) {
        self.inner.audio.resume();
        self.inner.with_engine(Engine::start);
    }

    pub fn reset(&self) {
        self.inner.with_engine(Engine::reset);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.inner.with_engine(|e| e.resize(width, height));
    }

    /// "night", "day" or "auto"
    pub fn set_theme(&self, name: &str) -> Result<(), JsValue> {
        self.inner
            .with_engine(|e| e.set_theme_name(name))
            .unwrap_or(Ok(()))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn toggle_bloom(&self, enabled: bool) {
        self.inner.with_engine(|e| e.toggle_bloom(enabled));
    }

    pub fn toggle_auto_theme(&self, enabled: bool) {
        self.inner.with_engine(|e| e.toggle_auto_theme(enabled));
    }

    pub fn set_autopilot(&self, enabled: bool) {
        self.inner.with_engine(|e| e.set_autopilot(enabled));
    }

    pub fn set_volume(&self, master: f32, sfx: f32) {
        self.inner.with_engine(|e| {
            e.set_volume(master, sfx);
            e.settings().save();
        });
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.with_engine(|e| {
            e.set_muted(muted);
            e.settings().save();
        });
    }

    /// Subscribe `callback` to a notification; returns a handle for `off`
    pub fn on(&self, name: &str, callback: js_sys::Function) -> Result<u32, JsValue> {
        let outbox = self.inner.outbox.clone();
        let id = self
            .inner
            .with_engine(|e| {
                e.on_name(name, move |event| {
                    outbox.borrow_mut().push((callback.clone(), *event))
                })
            })
            .flatten()
            .ok_or_else(|| JsValue::from_str(&format!("unknown event '{}'", name)))?;

        let mut listeners = self.inner.listeners.borrow_mut();
        listeners.push(Some(id));
        Ok((listeners.len() - 1) as u32)
    }

    pub fn off(&self, handle: u32) -> bool {
        let id = self
            .inner
            .listeners
            .borrow_mut()
            .get_mut(handle as usize)
            .and_then(Option::take);
        match id {
            Some(id) => self.inner.with_engine(|e| e.off(id)).unwrap_or(false),
            None => false,
        }
    }

    /// Current frame snapshot as JSON (for renderers that pull)
    pub fn frame_json(&self) -> Result<String, JsValue> {
        let engine = self
            .inner
            .engine
            .try_borrow()
            .map_err(|_| JsValue::from_str("engine busy"))?;
        serde_json::to_string(&build_frame(engine.state(), engine.settings()))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn score(&self) -> f64 {
        self.inner.with_engine(|e| e.score() as f64).unwrap_or(0.0)
    }

    pub fn lives(&self) -> u32 {
        self.inner.with_engine(|e| e.lives()).unwrap_or(0)
    }

    pub fn level(&self) -> u32 {
        self.inner.with_engine(|e| e.level()).unwrap_or(0)
    }

    pub fn phase(&self) -> String {
        self.inner
            .with_engine(|e| e.phase().as_str().to_string())
            .unwrap_or_default()
    }
}

fn setup_input_handlers(canvas: &HtmlCanvasElement, inner: Rc<Inner>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    // Keyboard
    {
        let inner = inner.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            inner.audio.resume();
            if inner.with_engine(|e| e.key_down(&event.code())) == Some(true) {
                event.prevent_default();
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let inner = inner.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if inner.with_engine(|e| e.key_up(&event.code())) == Some(true) {
                event.prevent_default();
            }
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Pointer (mouse and touch)
    {
        let inner = inner.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            inner.with_engine(|e| e.pointer_move(event.offset_x() as f32));
        });
        canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let inner = inner.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            event.prevent_default();
            inner.audio.resume();
            inner.with_engine(|e| e.pointer_down(event.offset_x() as f32));
        });
        canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
            inner.with_engine(Engine::pointer_up);
        });
        canvas.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn setup_window_handlers(canvas: &HtmlCanvasElement, inner: Rc<Inner>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Track canvas size
    {
        let inner = inner.clone();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let width = canvas.client_width().max(1) as u32;
            let height = canvas.client_height().max(1) as u32;
            inner.with_engine(|e| e.resize(width, height));
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Window blur (click outside): release held keys
    {
        let inner = inner.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            inner.with_engine(Engine::blur);
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Visibility change (tab switch, minimize)
    {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == VisibilityState::Hidden {
                inner.with_engine(Engine::blur);
                log::info!("Tab hidden; input released");
            }
        });
        document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn request_animation_frame(inner: Rc<Inner>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(inner, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(inner: Rc<Inner>, time: f64) {
    if !inner.running.get() {
        log::info!("Frame loop stopped");
        return;
    }
    inner.with_engine(|e| e.frame(time / 1000.0));
    request_animation_frame(inner);
}
