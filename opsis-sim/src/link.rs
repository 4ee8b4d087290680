//! In-memory lossy transport
//!
//! Models the radio as a pair of one-direction datagram queues. Loss and
//! truncation are driven by a seeded generator, so a run is reproducible
//! from its seed alone.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand_core::RngCore;
use rand_wyrand::WyRand;
use tracing::debug;

use opsis_core::traits::{LinkError, PacketLink};
use opsis_protocol::{PeerAddress, MAX_FRAME_LEN};

/// One-direction datagram queue shared between a sender and a receiver
pub type Inbox = Rc<RefCell<VecDeque<Vec<u8>>>>;

pub fn inbox() -> Inbox {
    Rc::new(RefCell::new(VecDeque::new()))
}

/// Statistics shared by both directions of the simulated radio
#[derive(Debug, Default)]
pub struct LinkStats {
    pub delivered: u64,
    pub dropped: u64,
    pub corrupted: u64,
}

/// Lossy datagram link feeding a shared inbox
pub struct LossyLink {
    label: &'static str,
    inbox: Inbox,
    rng: WyRand,
    loss_percent: u8,
    corrupt_percent: u8,
    stats: Rc<RefCell<LinkStats>>,
}

impl LossyLink {
    pub fn new(
        label: &'static str,
        inbox: Inbox,
        rng: WyRand,
        loss_percent: u8,
        corrupt_percent: u8,
        stats: Rc<RefCell<LinkStats>>,
    ) -> Self {
        Self {
            label,
            inbox,
            rng,
            loss_percent,
            corrupt_percent,
            stats,
        }
    }

    fn roll_percent(&mut self) -> u8 {
        (self.rng.next_u32() % 100) as u8
    }
}

impl PacketLink for LossyLink {
    fn max_payload(&self) -> usize {
        MAX_FRAME_LEN
    }

    fn send(&mut self, _peer: &PeerAddress, payload: &[u8]) -> Result<(), LinkError> {
        if payload.len() > self.max_payload() {
            return Err(LinkError::Oversize {
                got: payload.len(),
                max: self.max_payload(),
            });
        }

        if self.roll_percent() < self.loss_percent {
            self.stats.borrow_mut().dropped += 1;
            debug!(link = self.label, bytes = payload.len(), "datagram lost");
            return Ok(());
        }

        let mut datagram = payload.to_vec();
        if self.roll_percent() < self.corrupt_percent && datagram.len() > 1 {
            datagram.truncate(datagram.len() - 1);
            self.stats.borrow_mut().corrupted += 1;
            debug!(link = self.label, "datagram truncated in flight");
        }

        self.stats.borrow_mut().delivered += 1;
        self.inbox.borrow_mut().push_back(datagram);
        Ok(())
    }
}
