//! Shared control-state store
//!
//! One slot holding the latest accepted control state plus an "updated"
//! flag. The producer is the link receive callback (interrupt context);
//! the consumer is the cooperative main loop. The slot is overwrite-only -
//! last value wins, stale samples are dropped - because control latency
//! matters more than completeness for a live joystick signal.
//!
//! All access goes through a critical section that covers exactly the
//! fixed-size value copy, so the consumer can never observe a torn pair of
//! fields from two different samples, and frame pacing picks up no jitter
//! from a longer hold.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use opsis_protocol::ControlState;

#[derive(Clone, Copy)]
struct Slot {
    state: ControlState,
    updated: bool,
}

/// Latest-value cell shared between receive callback and main loop
///
/// `const fn new` so nodes can keep it in a `static` reachable from the
/// receive callback.
pub struct ControlCell {
    slot: Mutex<CriticalSectionRawMutex, Cell<Slot>>,
}

impl ControlCell {
    /// Create a cell holding the neutral state, not marked updated
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(Slot {
                state: ControlState::neutral(),
                updated: false,
            })),
        }
    }

    /// Replace the stored state with a whole new sample
    ///
    /// Producer side. The previous value is discarded whether or not the
    /// consumer saw it.
    pub fn write(&self, state: ControlState) {
        self.slot.lock(|slot| {
            slot.set(Slot {
                state,
                updated: true,
            });
        });
    }

    /// Copy out the latest state and clear the "updated" flag
    ///
    /// Consumer side. The returned flag says whether a new sample arrived
    /// since the previous read.
    pub fn read_and_clear(&self) -> (ControlState, bool) {
        self.slot.lock(|slot| {
            let current = slot.get();
            slot.set(Slot {
                state: current.state,
                updated: false,
            });
            (current.state, current.updated)
        })
    }
}

impl Default for ControlCell {
    fn default() -> Self {
        Self::new()
    }
}
