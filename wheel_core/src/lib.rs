// wheel_core: wheel-of-names Rust/WASM engine.
// Spin resolution, rendering and entry bookkeeping live here; JS supplies the clock,
// the canvas element and the sounds.

mod canvas;
mod effects;
mod engine;
mod entries;
mod error;
mod geometry;
mod persistence;
mod recording;
mod render;
mod resize;
mod selection;
mod spin;
mod surface;
mod types;
mod web;

use wasm_bindgen::prelude::*;

pub use canvas::{Canvas2d, CanvasSurface};
pub use effects::{EffectHandle, EffectKind, EffectRegistry, EffectSink, SilentEffects};
pub use engine::{Finalize, FrameReport, WheelEngine, WheelEvent};
pub use entries::EntryList;
pub use error::WheelError;
pub use geometry::*;
pub use persistence::{MemoryStore, SeedStore};
pub use recording::{DrawOp, RecordedLayer, RecordingSurface};
pub use render::{paint_wheel, wheel_radius, LabelDensity, LabelTier, RenderCache, PLACEHOLDER_SEGMENTS};
pub use resize::ResizeDebouncer;
pub use selection::{entry_matching, segment_at_point, SelectionOverride};
pub use spin::*;
pub use surface::*;
pub use types::*;
pub use web::{install_logger, ConsoleLogger, JsEffects, LocalStorageStore, WheelApp};

/// Install the panic hook and console logger.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web::install_logger(log::LevelFilter::Info);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_engine_spins_and_announces() {
        let config = WheelConfig::from_json(r#"{"rng_seed": 42}"#).unwrap();
        let mut engine = WheelEngine::new(
            RecordingSurface::new(SurfaceSize::new(500, 500)),
            SilentEffects::default(),
            config,
        )
        .unwrap();
        engine.set_entries("Alice\nBob\nCarol").unwrap();

        let plan = match engine.request_spin(Timestamp::from_micros(0)).unwrap() {
            SpinRequest::Started(plan) => plan,
            other => panic!("unexpected {:?}", other),
        };
        let end = Timestamp::from_millis_f64(plan.fallback_after_ms);
        engine.fallback(plan.spin_id, end).unwrap();
        let report = engine.poll(end.plus_millis(1_000.0)).unwrap();

        assert!(matches!(
            report.events.as_slice(),
            [WheelEvent::WinnerAnnounced { remaining: 2, .. }]
        ));
        assert_eq!(engine.entries().len(), 2);
        assert!(engine.surface().frames_presented() > 0);
    }

    #[test]
    fn bad_config_is_rejected() {
        assert!(WheelConfig::from_json(r#"{"min_rounds": 5, "max_rounds": 2}"#).is_err());
    }
}
