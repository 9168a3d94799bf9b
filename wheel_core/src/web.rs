// Browser facade. WheelApp owns the engine over the page canvas; JS is plumbing:
// it forwards input, drives frames and timers, and plays the effects it is asked for.

use js_sys::{Function, Object, Reflect};
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::canvas::CanvasSurface;
use crate::effects::{EffectHandle, EffectKind, EffectSink};
use crate::engine::WheelEngine;
use crate::error::{js_message, WheelError};
use crate::persistence::SeedStore;
use crate::surface::SurfaceSize;
use crate::types::{SpinId, Timestamp, WheelConfig};

/// `log` backend writing to the browser console.
pub struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Install the console logger once. Later calls are no-ops.
pub fn install_logger(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Effect sink backed by a JS object with `start(kindJson) -> number` and
/// `stop(handle)` methods.
pub struct JsEffects {
    target: Object,
}

impl JsEffects {
    pub fn new(target: Object) -> Self {
        JsEffects { target }
    }

    fn method(&self, name: &str) -> Result<Function, WheelError> {
        Reflect::get(&self.target, &JsValue::from_str(name))
            .map_err(|e| WheelError::Effect(js_message(&e)))?
            .dyn_into::<Function>()
            .map_err(|_| WheelError::Effect(format!("effects.{} is not a function", name)))
    }
}

/// A JS number usable as a handle: a whole number in `u32` range.
fn effect_handle(raw: f64) -> Option<EffectHandle> {
    let whole = raw.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&raw);
    whole.then(|| EffectHandle::new(raw as u32))
}

impl EffectSink for JsEffects {
    fn start(&mut self, kind: EffectKind) -> Result<EffectHandle, WheelError> {
        let kind_json = serde_json::to_string(&kind)?;
        let handle = self
            .method("start")?
            .call1(&self.target, &JsValue::from_str(&kind_json))
            .map_err(|e| WheelError::Effect(js_message(&e)))?;
        handle
            .as_f64()
            .and_then(effect_handle)
            .ok_or_else(|| WheelError::Effect(format!("start({}) returned no handle", kind_json)))
    }

    fn stop(&mut self, handle: EffectHandle) -> Result<(), WheelError> {
        self.method("stop")?
            .call1(&self.target, &JsValue::from(handle.as_u32()))
            .map_err(|e| WheelError::Effect(js_message(&e)))?;
        Ok(())
    }
}

/// Seed store over `window.localStorage`.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, WheelError> {
        let storage = web_sys::window()
            .ok_or_else(|| WheelError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(|e| WheelError::Storage(js_message(&e)))?
            .ok_or_else(|| WheelError::Storage("localStorage unavailable".to_string()))?;
        Ok(LocalStorageStore { storage })
    }
}

impl SeedStore for LocalStorageStore {
    fn take(&mut self, key: &str) -> Result<Option<String>, WheelError> {
        let value = self
            .storage
            .get_item(key)
            .map_err(|e| WheelError::Storage(js_message(&e)))?;
        if value.is_some() {
            self.storage
                .remove_item(key)
                .map_err(|e| WheelError::Storage(js_message(&e)))?;
        }
        Ok(value)
    }
}

fn now() -> Timestamp {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    Timestamp::from_millis_f64(ms)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Main wheel interface exposed to JavaScript.
/// Structured results come back as JSON strings.
#[wasm_bindgen]
pub struct WheelApp {
    engine: WheelEngine<CanvasSurface, JsEffects>,
}

#[wasm_bindgen]
impl WheelApp {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        effects: Object,
        config_json: &str,
    ) -> Result<WheelApp, JsValue> {
        let config = WheelConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        let surface = CanvasSurface::new(canvas)?;
        let mut engine = WheelEngine::new(surface, JsEffects::new(effects), config)?;
        engine.present()?;
        Ok(WheelApp { engine })
    }

    /// Replace the entries from the input text. Returns the `EntriesChanged` event.
    pub fn set_entries_text(&mut self, raw: &str) -> Result<String, JsValue> {
        let event = self.engine.set_entries(raw)?;
        to_json(&event)
    }

    /// Consume the seed list from localStorage, if one was left there.
    pub fn load_seed(&mut self) -> Result<Option<String>, JsValue> {
        let mut store = LocalStorageStore::open()?;
        match self.engine.load_seed(&mut store)? {
            Some(_) => Ok(Some(self.engine.entries().to_text())),
            None => Ok(None),
        }
    }

    pub fn entries_text(&self) -> String {
        self.engine.entries().to_text()
    }

    pub fn can_spin(&self) -> bool {
        self.engine.can_spin()
    }

    pub fn is_spinning(&self) -> bool {
        self.engine.is_spinning()
    }

    pub fn orientation(&self) -> f64 {
        self.engine.orientation()
    }

    /// Request a spin. The JSON carries `fallback_after_ms` for the safety timer.
    pub fn spin(&mut self) -> Result<String, JsValue> {
        let request = self.engine.request_spin(now())?;
        to_json(&request)
    }

    /// Animation frame callback with its `DOMHighResTimeStamp`.
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsValue> {
        let report = self.engine.frame(Timestamp::from_millis_f64(now_ms))?;
        to_json(&report)
    }

    /// Safety timer for `spin_id` fired.
    pub fn fallback(&mut self, spin_id: u32) -> Result<String, JsValue> {
        let report = self.engine.fallback(SpinId::new(spin_id), now())?;
        to_json(&report)
    }

    /// Timer callback for reveal and resize deadlines.
    pub fn poll(&mut self) -> Result<String, JsValue> {
        let report = self.engine.poll(now())?;
        to_json(&report)
    }

    /// Double-click at canvas coordinates. Returns the pinned entry.
    pub fn pick_at(&mut self, x: f64, y: f64) -> Option<String> {
        self.engine.pick_at(x, y)
    }

    /// Typed query. Returns the pinned entry.
    pub fn pick_matching(&mut self, query: &str) -> Option<String> {
        self.engine.pick_matching(query)
    }

    /// Layout changed; the resize lands after the debounce window.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.engine
            .request_resize(SurfaceSize::new(width, height), now());
    }

    /// An effect ended on its own (audio `ended`, spawner done).
    pub fn effect_ended(&mut self, handle: u32) {
        self.engine.effect_finished(EffectHandle::new(handle));
    }

    /// Page is unloading. Returns the events emitted while stopping.
    pub fn teardown(&mut self) -> Result<String, JsValue> {
        let events = self.engine.teardown(now())?;
        to_json(&events)
    }
}
