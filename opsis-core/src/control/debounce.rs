//! Button debouncing
//!
//! Two deployment variants behind one [`ButtonSource`] seam, selected by
//! [`crate::config::ButtonPolicy`]:
//!
//! - [`LevelButton`]: the control state's button field tracks the
//!   debounced instantaneous level every sampling tick.
//! - [`OneShotLatch`] + [`LatchedButton`]: a hardware edge arms the latch;
//!   the next sampling tick emits pressed exactly once, then the latch is
//!   permanently spent for the session. Models the single-use trigger
//!   device on the vehicle.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::traits::ButtonProbe;

/// Consecutive agreeing raw samples required before the reported level
/// changes
const LEVEL_STABLE_TICKS: u8 = 3;

/// Logical button reading, one sample per control tick
pub trait ButtonSource {
    /// Sample the button for this control tick
    fn sample(&mut self) -> bool;
}

/// Level-sensed variant: debounced instantaneous level
///
/// A raw level change is reported only after [`LEVEL_STABLE_TICKS`]
/// consecutive samples agree, filtering contact bounce at the sampling
/// cadence.
pub struct LevelButton<P: ButtonProbe> {
    probe: P,
    reported: bool,
    candidate: bool,
    stable_ticks: u8,
}

impl<P: ButtonProbe> LevelButton<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            reported: false,
            candidate: false,
            stable_ticks: 0,
        }
    }
}

impl<P: ButtonProbe> ButtonSource for LevelButton<P> {
    fn sample(&mut self) -> bool {
        let raw = self.probe.is_pressed();

        if raw == self.reported {
            // Bounce back to the reported level resets the streak
            self.candidate = raw;
            self.stable_ticks = 0;
        } else if raw == self.candidate {
            self.stable_ticks = self.stable_ticks.saturating_add(1);
            if self.stable_ticks >= LEVEL_STABLE_TICKS {
                self.reported = raw;
                self.stable_ticks = 0;
            }
        } else {
            self.candidate = raw;
            self.stable_ticks = 1;
        }

        self.reported
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LatchState {
    /// Waiting; an edge will produce the one event
    Armed,
    /// The one event was emitted; no edge ever fires again
    Fired,
}

#[derive(Clone, Copy)]
struct LatchSlot {
    state: LatchState,
    edge_pending: bool,
}

/// One-shot edge latch shared between the edge ISR and the main loop
///
/// Monotonic `Armed -> Fired`; the transition happens exactly once per
/// session no matter how many edges arrive or how they bounce. Guarded the
/// same way as the control store so the ISR and the sampling tick never
/// observe a half-updated slot.
pub struct OneShotLatch {
    slot: Mutex<CriticalSectionRawMutex, Cell<LatchSlot>>,
}

impl OneShotLatch {
    /// Create an armed latch with no pending edge
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(LatchSlot {
                state: LatchState::Armed,
                edge_pending: false,
            })),
        }
    }

    /// Record a hardware edge (ISR context, non-blocking)
    ///
    /// Edges after the latch has fired are ignored.
    pub fn record_edge(&self) {
        self.slot.lock(|slot| {
            let mut current = slot.get();
            if current.state == LatchState::Armed {
                current.edge_pending = true;
                slot.set(current);
            }
        });
    }

    /// Consume the pending edge, if any
    ///
    /// Returns true exactly once: on the first call that observes a
    /// pending edge while still armed. That call performs the permanent
    /// `Armed -> Fired` transition.
    pub fn try_fire(&self) -> bool {
        self.slot.lock(|slot| {
            let current = slot.get();
            if current.state == LatchState::Armed && current.edge_pending {
                slot.set(LatchSlot {
                    state: LatchState::Fired,
                    edge_pending: false,
                });
                true
            } else {
                false
            }
        })
    }

    /// True once the one event has been emitted
    pub fn is_fired(&self) -> bool {
        self.slot.lock(|slot| slot.get().state == LatchState::Fired)
    }
}

impl Default for OneShotLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge-latched variant: adapts a [`OneShotLatch`] to the sampling seam
pub struct LatchedButton<'a> {
    latch: &'a OneShotLatch,
}

impl<'a> LatchedButton<'a> {
    pub fn new(latch: &'a OneShotLatch) -> Self {
        Self { latch }
    }
}

impl ButtonSource for LatchedButton<'_> {
    fn sample(&mut self) -> bool {
        self.latch.try_fire()
    }
}
