// Ambient effects: tones and sparkles started through the host, tracked in an
// explicit registry so every live one can be stopped on spin end or teardown.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::WheelError;

/// Host-issued identifier of a running effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectHandle(u32);

impl EffectHandle {
    pub fn new(id: u32) -> Self {
        EffectHandle(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Kind of ambient effect the engine asks the host for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EffectKind {
    /// Short blip when a spin is admitted.
    ClickTone,
    /// Ticking and whoosh for the whole spin.
    SpinTone,
    /// Periodic sparkle bursts around the rim.
    Sparkles { interval_ms: u32 },
    /// Winner fanfare; two variants that alternate.
    WinnerChime { variant: u8 },
}

/// The host side of ambient effects (tone generators, particle spawners).
pub trait EffectSink {
    fn start(&mut self, kind: EffectKind) -> Result<EffectHandle, WheelError>;

    fn stop(&mut self, handle: EffectHandle) -> Result<(), WheelError>;
}

/// A sink that plays nothing. Hands out fresh handles so bookkeeping still works.
#[derive(Debug, Default)]
pub struct SilentEffects {
    next: u32,
}

impl EffectSink for SilentEffects {
    fn start(&mut self, _kind: EffectKind) -> Result<EffectHandle, WheelError> {
        self.next += 1;
        Ok(EffectHandle::new(self.next))
    }

    fn stop(&mut self, _handle: EffectHandle) -> Result<(), WheelError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveEffect {
    handle: EffectHandle,
    kind: EffectKind,
}

/// Every effect currently running, in start order.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    active: Vec<ActiveEffect>,
    winner_variant: u8,
}

impl EffectRegistry {
    pub fn new() -> Self {
        EffectRegistry::default()
    }

    /// Start an effect and track it. Failures are logged and swallowed.
    pub fn start<E: EffectSink + ?Sized>(
        &mut self,
        sink: &mut E,
        kind: EffectKind,
    ) -> Option<EffectHandle> {
        match sink.start(kind) {
            Ok(handle) => {
                self.active.push(ActiveEffect { handle, kind });
                Some(handle)
            }
            Err(err) => {
                warn!("Effect {:?} failed to start: {}", kind, err);
                None
            }
        }
    }

    /// Start the next winner chime, alternating between the two variants.
    pub fn start_winner_chime<E: EffectSink + ?Sized>(
        &mut self,
        sink: &mut E,
    ) -> Option<EffectHandle> {
        let variant = self.winner_variant;
        self.winner_variant = (self.winner_variant + 1) % 2;
        self.start(sink, EffectKind::WinnerChime { variant })
    }

    /// Stop one effect if it is still tracked.
    pub fn stop<E: EffectSink + ?Sized>(&mut self, sink: &mut E, handle: EffectHandle) {
        let Some(pos) = self.active.iter().position(|e| e.handle == handle) else {
            return;
        };
        let effect = self.active.remove(pos);
        if let Err(err) = sink.stop(effect.handle) {
            warn!("Effect {:?} failed to stop: {}", effect.kind, err);
        }
    }

    /// Stop every tracked effect. Returns how many were stopped.
    pub fn stop_all<E: EffectSink + ?Sized>(&mut self, sink: &mut E) -> usize {
        let effects = std::mem::take(&mut self.active);
        for effect in &effects {
            if let Err(err) = sink.stop(effect.handle) {
                warn!("Effect {:?} failed to stop: {}", effect.kind, err);
            }
        }
        effects.len()
    }

    /// The host reports an effect that ran to its natural end.
    pub fn finished(&mut self, handle: EffectHandle) {
        let before = self.active.len();
        self.active.retain(|e| e.handle != handle);
        if self.active.len() == before {
            debug!("Effect {:?} already untracked", handle);
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, handle: EffectHandle) -> bool {
        self.active.iter().any(|e| e.handle == handle)
    }
}
