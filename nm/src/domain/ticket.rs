//! Generation stamps for asynchronous requests
//!
//! Every identity change bumps the [`Epoch`]. Every request issued by a
//! component carries a [`Ticket`] made of the epoch it was issued under and the
//! component's own monotonically increasing sequence number. A completion is
//! applied only if both still match what the component considers current.

use std::fmt;

/// Identity generation; bumped on every identity activation and sign-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub epoch: Epoch,
    pub seq: u64,
}

impl Ticket {
    pub fn new(epoch: Epoch, seq: u64) -> Self {
        Self { epoch, seq }
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.epoch, self.seq)
    }
}
