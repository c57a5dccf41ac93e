//! Web Audio sample player
//!
//! Samples are fetched and decoded in the background. A sound that has not
//! loaded (or failed to) is silently skipped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioBuffer, AudioContext, AudioContextState, Response};

use super::{PlaybackParams, SoundEffect, SoundPlayer};

type BufferMap = Rc<RefCell<HashMap<SoundEffect, AudioBuffer>>>;

/// Clones share the context and the sample cache
#[derive(Clone)]
pub struct WebAudioPlayer {
    ctx: Option<AudioContext>,
    buffers: BufferMap,
}

impl Default for WebAudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudioPlayer {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            buffers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    /// Start loading every sample in the manifest
    pub fn load_all(&self) {
        let Some(ctx) = &self.ctx else { return };
        for effect in SoundEffect::ALL {
            let ctx = ctx.clone();
            let buffers = self.buffers.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match load(&ctx, effect).await {
                    Ok(buffer) => {
                        buffers.borrow_mut().insert(effect, buffer);
                        log::debug!("Loaded sound {}", effect.name());
                    }
                    Err(err) => {
                        log::warn!("Audio load failed {} {}: {:?}", effect.name(), effect.url(), err)
                    }
                }
            });
        }
    }
}

async fn load(ctx: &AudioContext, effect: SoundEffect) -> Result<AudioBuffer, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(effect.url()))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let data: js_sys::ArrayBuffer = JsFuture::from(response.array_buffer()?).await?.dyn_into()?;
    let buffer = JsFuture::from(ctx.decode_audio_data(&data)?).await?;
    buffer.dyn_into()
}

impl SoundPlayer for WebAudioPlayer {
    fn play(&mut self, effect: SoundEffect, params: PlaybackParams) {
        let Some(ctx) = &self.ctx else { return };
        let buffers = self.buffers.borrow();
        let Some(buffer) = buffers.get(&effect) else { return };

        // Playback may fail while the context is still suspended; ignore it
        let Ok(src) = ctx.create_buffer_source() else { return };
        let Ok(gain) = ctx.create_gain() else { return };
        src.set_buffer(Some(buffer));
        src.playback_rate().set_value(params.playback_rate);
        gain.gain().set_value(params.volume);

        if src.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }
        let _ = src.start();
    }
}
