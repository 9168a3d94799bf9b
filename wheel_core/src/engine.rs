// WheelEngine: the one context that owns orientation, entries, render cache,
// the active spin and the ambient effects. Single-threaded and driven by the host:
// frame(now) per animation callback, fallback(id, now) from the safety timer.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::effects::{EffectHandle, EffectKind, EffectRegistry, EffectSink};
use crate::entries::EntryList;
use crate::error::WheelError;
use crate::geometry::normalize_angle;
use crate::persistence::SeedStore;
use crate::render::RenderCache;
use crate::resize::ResizeDebouncer;
use crate::selection::{entry_matching, segment_at_point, SelectionOverride};
use crate::spin::*;
use crate::surface::{Point, Surface, SurfaceSize};
use crate::types::{SpinId, Timestamp, WheelConfig};

/// Something the host may need to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WheelEvent {
    EntriesChanged {
        count: usize,
    },
    SpinStarted {
        spin_id: SpinId,
        target_index: usize,
    },
    SpinFinished {
        spin_id: SpinId,
        orientation: f64,
        path: FinishPath,
    },
    /// Show the winner. `entries_text` is the remaining list, one per line.
    WinnerAnnounced {
        winner: String,
        remaining: usize,
        entries_text: String,
    },
    Resized {
        width: u32,
        height: u32,
    },
}

/// Outcome of one driving call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub orientation: f64,
    pub spinning: bool,
    /// Whether the visible surface was redrawn.
    pub rendered: bool,
    pub events: Vec<WheelEvent>,
    /// Milliseconds until a timed step (reveal, resize) is due.
    pub next_poll_ms: Option<f64>,
}

/// Result of a finalize attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finalize {
    Finished,
    /// The spin was already finalized (or never existed); nothing happened.
    AlreadyFinished,
}

#[derive(Debug, Clone)]
struct PendingReveal {
    winner: String,
    due: Timestamp,
}

/// The wheel: entries, orientation, cache and at most one spin in flight.
pub struct WheelEngine<S: Surface, E: EffectSink> {
    config: WheelConfig,
    surface: S,
    effects: E,
    registry: EffectRegistry,
    entries: EntryList,
    selection: SelectionOverride,
    cache: RenderCache<S::Layer>,
    orientation: f64,
    job: Option<SpinJob>,
    next_spin: SpinId,
    reveal: Option<PendingReveal>,
    resize: ResizeDebouncer,
    rng: SmallRng,
}

impl<S: Surface, E: EffectSink> WheelEngine<S, E> {
    pub fn new(surface: S, effects: E, config: WheelConfig) -> Result<Self, WheelError> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let mut seed = [0u8; 32];
                getrandom::fill(&mut seed)?;
                SmallRng::from_seed(seed)
            }
        };
        Ok(WheelEngine {
            resize: ResizeDebouncer::new(config.resize_debounce_ms),
            config,
            surface,
            effects,
            registry: EffectRegistry::new(),
            entries: EntryList::new(),
            selection: SelectionOverride::new(),
            cache: RenderCache::new(),
            orientation: 0.0,
            job: None,
            next_spin: SpinId::new(1),
            reveal: None,
            rng,
        })
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    pub fn is_spinning(&self) -> bool {
        self.job.is_some()
    }

    /// Whether the spin control should be enabled.
    pub fn can_spin(&self) -> bool {
        !self.entries.is_empty() && self.job.is_none() && self.reveal.is_none()
    }

    /// Whether a winner is waiting to be announced.
    pub fn reveal_pending(&self) -> bool {
        self.reveal.is_some()
    }

    pub fn active_job(&self) -> Option<&SpinJob> {
        self.job.as_ref()
    }

    pub fn pinned(&self) -> Option<&str> {
        self.selection.pinned()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &RenderCache<S::Layer> {
        &self.cache
    }

    /// Draw the wheel at its current orientation.
    pub fn present(&mut self) -> Result<(), WheelError> {
        self.cache
            .present(&mut self.surface, &self.entries, self.orientation)
    }

    /// Replace the entries from raw input text and redraw.
    pub fn set_entries(&mut self, raw: &str) -> Result<WheelEvent, WheelError> {
        self.entries = EntryList::parse(raw);
        if self.selection.reconcile(&self.entries) {
            debug!("Pinned entry left the list; next spin is random");
        }
        self.cache.invalidate();
        self.present()?;
        Ok(WheelEvent::EntriesChanged {
            count: self.entries.len(),
        })
    }

    /// Pre-fill entries from the one-shot seed in `store`, if any.
    pub fn load_seed<T: SeedStore + ?Sized>(
        &mut self,
        store: &mut T,
    ) -> Result<Option<WheelEvent>, WheelError> {
        let Some(raw) = store.take(&self.config.seed_key)? else {
            return Ok(None);
        };
        let event = self.set_entries(&raw)?;
        info!("Loaded {} seed entries", self.entries.len());
        Ok(Some(event))
    }

    /// Start a spin if idle and there is something to spin.
    pub fn request_spin(&mut self, now: Timestamp) -> Result<SpinRequest, WheelError> {
        if let Some(job) = &self.job {
            debug!("Spin request ignored: spin {:?} still running", job.id);
            return Ok(SpinRequest::Busy);
        }
        // The previous winner must be off the wheel before the next target is chosen.
        if self.reveal.is_some() {
            debug!("Spin request ignored: winner reveal pending");
            return Ok(SpinRequest::Busy);
        }
        let total = self.entries.len();
        if total == 0 {
            return Ok(SpinRequest::Empty);
        }

        self.registry.start(&mut self.effects, EffectKind::ClickTone);

        let target_index = match self.selection.resolve(&self.entries) {
            Some(index) => index,
            None => self.rng.random_range(0..total),
        };
        let winner = self.entries.get(target_index).unwrap_or_default().to_string();
        let rounds = self
            .rng
            .random_range(self.config.min_rounds..=self.config.max_rounds);
        let duration_ms = self
            .rng
            .random_range(self.config.min_duration_ms..self.config.max_duration_ms);
        let trajectory = Trajectory::plan(target_index, total, self.orientation, rounds, duration_ms);
        self.orientation = trajectory.start;

        let mut effects = Vec::new();
        effects.extend(self.registry.start(&mut self.effects, EffectKind::SpinTone));
        effects.extend(self.registry.start(
            &mut self.effects,
            EffectKind::Sparkles {
                interval_ms: self.config.sparkle_interval_ms,
            },
        ));

        let id = self.next_spin;
        self.next_spin = id.next();
        self.job = Some(SpinJob {
            id,
            target_index,
            winner,
            trajectory,
            started_at: now,
            throttle: FrameThrottle::new(self.config.frame_interval_ms()),
            effects,
        });

        info!(
            "Spin {} to index {} of {}: {} turns over {:.0} ms",
            id.as_u32(),
            target_index,
            total,
            rounds,
            duration_ms
        );
        Ok(SpinRequest::Started(SpinPlan {
            spin_id: id,
            target_index,
            duration_ms,
            fallback_after_ms: duration_ms + self.config.fallback_slack_ms,
        }))
    }

    /// Animation callback. Advances the spin from the clock and handles due work.
    pub fn frame(&mut self, now: Timestamp) -> Result<FrameReport, WheelError> {
        let mut events = Vec::new();
        let mut rendered = self.apply_due_resize(now, &mut events)?;

        let step = match self.job.as_mut() {
            Some(job) if job.is_complete(now) => Some((job.id, true)),
            Some(job) => {
                if job.throttle.admit(now) {
                    self.orientation = job.orientation_at(now);
                    Some((job.id, false))
                } else {
                    None
                }
            }
            None => None,
        };
        match step {
            Some((id, true)) => {
                self.finalize(id, FinishPath::Animation, now, &mut events)?;
                rendered = true;
            }
            Some((_, false)) => {
                self.present()?;
                rendered = true;
            }
            None => {}
        }

        rendered |= self.reveal_if_due(now, &mut events)?;
        Ok(self.report(now, rendered, events))
    }

    /// Safety timer for spin `spin_id`. Finalizes it unless something already did.
    pub fn fallback(&mut self, spin_id: SpinId, now: Timestamp) -> Result<FrameReport, WheelError> {
        let mut events = Vec::new();
        let mut rendered = self.apply_due_resize(now, &mut events)?;
        if self.finalize(spin_id, FinishPath::SafetyTimer, now, &mut events)? == Finalize::Finished {
            warn!("Spin {} finished by safety timer", spin_id.as_u32());
            rendered = true;
        }
        rendered |= self.reveal_if_due(now, &mut events)?;
        Ok(self.report(now, rendered, events))
    }

    /// Handle timed work (reveal, debounced resize) without advancing a spin.
    pub fn poll(&mut self, now: Timestamp) -> Result<FrameReport, WheelError> {
        let mut events = Vec::new();
        let mut rendered = self.apply_due_resize(now, &mut events)?;
        rendered |= self.reveal_if_due(now, &mut events)?;
        Ok(self.report(now, rendered, events))
    }

    /// End spin `id`: snap to the resting orientation, stop its effects and
    /// schedule the reveal. Safe to call from both completion paths.
    pub fn finalize(
        &mut self,
        id: SpinId,
        path: FinishPath,
        now: Timestamp,
        events: &mut Vec<WheelEvent>,
    ) -> Result<Finalize, WheelError> {
        let job = match self.job.take() {
            Some(job) if job.id == id => job,
            other => {
                self.job = other;
                debug!("Spin {} already finalized ({:?})", id.as_u32(), path);
                return Ok(Finalize::AlreadyFinished);
            }
        };

        self.orientation = normalize_angle(job.trajectory.end());
        for handle in &job.effects {
            self.registry.stop(&mut self.effects, *handle);
        }
        if path != FinishPath::Teardown {
            self.reveal = Some(PendingReveal {
                winner: job.winner,
                due: now.plus_millis(self.config.announce_delay_ms),
            });
        }
        events.push(WheelEvent::SpinFinished {
            spin_id: id,
            orientation: self.orientation,
            path,
        });
        info!(
            "Spin {} at rest ({:?}), orientation {:.4}",
            id.as_u32(),
            path,
            self.orientation
        );
        self.present_or_warn("resting wheel");
        Ok(Finalize::Finished)
    }

    /// Pin the entry under surface point (`x`, `y`) as the next target.
    pub fn pick_at(&mut self, x: f64, y: f64) -> Option<String> {
        if self.is_spinning() {
            debug!("Pick ignored while spinning");
            return None;
        }
        let index = segment_at_point(
            Point::new(x, y),
            self.surface.size(),
            self.entries.len(),
            self.orientation,
        )?;
        let value = self.entries.get(index)?.to_string();
        self.selection.pin(&value);
        debug!("Pinned entry {} by pointer", index);
        Some(value)
    }

    /// Pin the first entry containing `query` (any case) as the next target.
    pub fn pick_matching(&mut self, query: &str) -> Option<String> {
        if self.is_spinning() {
            debug!("Pick ignored while spinning");
            return None;
        }
        let value = entry_matching(&self.entries, query)?.to_string();
        self.selection.pin(&value);
        debug!("Pinned entry by typed match");
        Some(value)
    }

    /// Queue a resize; applied once requests stay quiet for the debounce window.
    pub fn request_resize(&mut self, size: SurfaceSize, now: Timestamp) {
        self.resize.request(size, now);
    }

    /// Resize immediately and redraw.
    pub fn resize_now(&mut self, size: SurfaceSize) -> Result<WheelEvent, WheelError> {
        self.surface.resize(size)?;
        self.cache.invalidate();
        self.present()?;
        Ok(WheelEvent::Resized {
            width: size.width,
            height: size.height,
        })
    }

    /// The host reports that an effect ended on its own.
    pub fn effect_finished(&mut self, handle: EffectHandle) {
        self.registry.finished(handle);
    }

    /// Host is going away: end any spin without a reveal and stop every effect.
    pub fn teardown(&mut self, now: Timestamp) -> Result<Vec<WheelEvent>, WheelError> {
        let mut events = Vec::new();
        if let Some(id) = self.job.as_ref().map(|job| job.id) {
            self.finalize(id, FinishPath::Teardown, now, &mut events)?;
        }
        self.reveal = None;
        let stopped = self.registry.stop_all(&mut self.effects);
        info!("Teardown stopped {} effects", stopped);
        Ok(events)
    }

    fn apply_due_resize(
        &mut self,
        now: Timestamp,
        events: &mut Vec<WheelEvent>,
    ) -> Result<bool, WheelError> {
        match self.resize.take_due(now) {
            Some(size) => {
                events.push(self.resize_now(size)?);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn reveal_if_due(
        &mut self,
        now: Timestamp,
        events: &mut Vec<WheelEvent>,
    ) -> Result<bool, WheelError> {
        match &self.reveal {
            Some(reveal) if now >= reveal.due => self.reveal_now(events),
            _ => Ok(false),
        }
    }

    /// Announce the pending winner and take one copy of it off the wheel.
    fn reveal_now(&mut self, events: &mut Vec<WheelEvent>) -> Result<bool, WheelError> {
        let Some(reveal) = self.reveal.take() else {
            return Ok(false);
        };
        self.registry.start_winner_chime(&mut self.effects);

        let removed = self.entries.remove_first(&reveal.winner).is_some();
        let mut rendered = false;
        if removed {
            self.selection.reconcile(&self.entries);
            self.cache.invalidate();
            rendered = self.present_or_warn("wheel without winner");
        }
        info!(
            "Winner '{}' announced, {} entries left",
            reveal.winner,
            self.entries.len()
        );
        events.push(WheelEvent::WinnerAnnounced {
            winner: reveal.winner,
            remaining: self.entries.len(),
            entries_text: self.entries.to_text(),
        });
        Ok(rendered)
    }

    /// Redraw on a path whose state change must still be reported if drawing fails.
    /// The next successful present repaints from the same state.
    fn present_or_warn(&mut self, what: &str) -> bool {
        match self.present() {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to draw {}: {}", what, err);
                false
            }
        }
    }

    fn report(&self, now: Timestamp, rendered: bool, events: Vec<WheelEvent>) -> FrameReport {
        let next_due = [self.reveal.as_ref().map(|r| r.due), self.resize.deadline()]
            .into_iter()
            .flatten()
            .min();
        FrameReport {
            orientation: self.orientation,
            spinning: self.is_spinning(),
            rendered,
            events,
            next_poll_ms: next_due.map(|due| due.millis_since(now)),
        }
    }
}
