//! Frame loop and page lifecycle as a pure event handler.
//!
//! The host forwards animation frames and DOM signals as [`SeaEvent`]s and
//! acts on the returned [`Directive`]. Nothing here touches the DOM, so the
//! whole lifecycle runs under plain unit tests.

use crate::config::{FrameConfig, SeaConfig};
use crate::persist::{KeyValueStore, Persistence};
use crate::sea::Sea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Input delivered by the host. Timestamps are on the monotonic frame clock
/// (`performance.now()`), in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeaEvent {
    Frame { timestamp: f64 },
    PointerMove { x: f64, y: f64, timestamp: f64 },
    PointerLeave,
    IdleCheck { timestamp: f64 },
    Resize { width: f64, height: f64, timestamp: f64 },
    Visibility(Visibility),
    /// Flush state now, e.g. before navigating away.
    SaveRequested,
}

/// What the host should do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Idle,
    /// A frame was simulated: paint it and schedule the next one.
    Paint,
    /// Do not schedule another frame.
    Halt,
    /// The loop is stopped; schedule a frame to restart it.
    ResumeLoop,
}

/// Converts frame timestamps into clamped simulation steps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    default_step_ms: f64,
    max_gap_ms: f64,
}

impl FrameClock {
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            last: None,
            default_step_ms: config.default_step_ms,
            max_gap_ms: config.max_gap_ms,
        }
    }

    /// Milliseconds since the previous frame. The first frame after a reset,
    /// gaps above the maximum, and backwards or non-finite gaps all yield the
    /// default step.
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        let step = match self.last {
            Some(last) => {
                let gap = timestamp - last;
                if gap.is_finite() && (0.0..=self.max_gap_ms).contains(&gap) {
                    gap
                } else {
                    self.default_step_ms
                }
            }
            None => self.default_step_ms,
        };
        if timestamp.is_finite() {
            self.last = Some(timestamp);
        }
        step
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    width: f64,
    height: f64,
    requested_at: f64,
}

/// Owns the simulation context and its persistence for one page.
pub struct Driver<S> {
    sea: Sea,
    persistence: Persistence<S>,
    clock: FrameClock,
    resize_debounce_ms: f64,
    pending_resize: Option<PendingResize>,
    visible: bool,
    loop_active: bool,
}

impl<S: KeyValueStore> Driver<S> {
    /// Build the simulation, adopting a fresh persisted snapshot when one exists.
    ///
    /// The loop starts stopped; deliver `Visibility(Visible)` to start it.
    pub fn boot(config: SeaConfig, width: f64, height: f64, seed: u64, store: S, wall_ms: f64) -> Self {
        let mut persistence = Persistence::new(store, config.persist.clone());
        let clock = FrameClock::new(&config.frame);
        let resize_debounce_ms = config.frame.resize_debounce_ms;
        let mut sea = Sea::new(config, width, height, seed);
        match persistence.load(wall_ms) {
            Some(snapshot) => sea.restore(snapshot),
            None => log::info!("starting fresh sea with {} creatures", sea.creatures().len()),
        }

        Self {
            sea,
            persistence,
            clock,
            resize_debounce_ms,
            pending_resize: None,
            visible: true,
            loop_active: false,
        }
    }

    pub fn sea(&self) -> &Sea {
        &self.sea
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn is_loop_active(&self) -> bool {
        self.loop_active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// `wall_ms` is wall-clock time used to stamp snapshots.
    pub fn handle_event(&mut self, event: SeaEvent, wall_ms: f64) -> Directive {
        match event {
            SeaEvent::Frame { timestamp } => self.frame(timestamp, wall_ms),
            SeaEvent::PointerMove { x, y, timestamp } => {
                self.sea.pointer_moved(x, y, timestamp);
                Directive::Idle
            }
            SeaEvent::PointerLeave => {
                self.sea.pointer_left();
                Directive::Idle
            }
            SeaEvent::IdleCheck { timestamp } => {
                self.sea.check_pointer_idle(timestamp);
                Directive::Idle
            }
            SeaEvent::Resize {
                width,
                height,
                timestamp,
            } => {
                self.pending_resize = Some(PendingResize {
                    width,
                    height,
                    requested_at: timestamp,
                });
                Directive::Idle
            }
            SeaEvent::Visibility(Visibility::Hidden) => {
                self.visible = false;
                self.save_now(wall_ms);
                Directive::Idle
            }
            SeaEvent::Visibility(Visibility::Visible) => {
                self.visible = true;
                if self.loop_active {
                    return Directive::Idle;
                }
                self.loop_active = true;
                self.clock.reset();
                self.persistence.reset_schedule();
                log::debug!("frame loop resumed");
                Directive::ResumeLoop
            }
            SeaEvent::SaveRequested => {
                self.save_now(wall_ms);
                Directive::Idle
            }
        }
    }

    pub fn save_now(&mut self, wall_ms: f64) -> bool {
        self.persistence
            .save(self.sea.creatures(), self.sea.field().seed(), wall_ms)
    }

    fn frame(&mut self, timestamp: f64, wall_ms: f64) -> Directive {
        if !self.visible {
            self.loop_active = false;
            return Directive::Halt;
        }
        self.loop_active = true;

        if let Some(pending) = self.pending_resize {
            if timestamp - pending.requested_at >= self.resize_debounce_ms {
                self.pending_resize = None;
                self.sea.resize(pending.width, pending.height);
                log::info!("resized sea to {}x{}", pending.width, pending.height);
            }
        }

        let delta_ms = self.clock.tick(timestamp);
        self.sea.step(delta_ms);
        self.persistence.save_if_due(
            timestamp,
            self.sea.creatures(),
            self.sea.field().seed(),
            wall_ms,
        );
        Directive::Paint
    }
}
