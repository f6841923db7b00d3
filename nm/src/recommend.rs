//! Recommendation Requester
//!
//! One suggestion request in flight at a time. A request hides the current
//! recommendation; success replaces it, failure brings the previous one back.

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::domain::{Epoch, Recommendation, SelectionCriteria, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A suggestion is already on its way")]
pub struct AlreadyPending;

#[derive(Debug, Default)]
pub struct RecommendationRequester {
    current: Option<Recommendation>,
    stashed: Option<Recommendation>,
    in_flight: Option<(Ticket, SelectionCriteria)>,
    seq: u64,
}

impl RecommendationRequester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Recommendation> {
        self.current.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Criteria of the request in flight, if any
    pub fn pending_criteria(&self) -> Option<SelectionCriteria> {
        self.in_flight.map(|(_, c)| c)
    }

    /// Issue a new request stamped with `epoch`
    pub fn request(&mut self, epoch: Epoch, criteria: SelectionCriteria) -> Result<Ticket, AlreadyPending> {
        debug!(%epoch, ?criteria, "request: called");
        if self.in_flight.is_some() {
            return Err(AlreadyPending);
        }
        self.seq += 1;
        let ticket = Ticket::new(epoch, self.seq);
        self.stashed = self.current.take();
        self.in_flight = Some((ticket, criteria));
        Ok(ticket)
    }

    /// Invalidate the request in flight; its result will be dropped
    pub fn supersede(&mut self) -> Option<Ticket> {
        let (ticket, _) = self.in_flight.take()?;
        debug!(%ticket, "supersede: invalidating suggestion request");
        self.current = self.stashed.take();
        Some(ticket)
    }

    /// Apply a completion; `None` means it was stale and nothing changed
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<Recommendation, ApiError>,
    ) -> Option<Result<&Recommendation, ApiError>> {
        match self.in_flight {
            Some((current, _)) if current == ticket => {}
            _ => {
                warn!(%ticket, "resolve: discarding stale suggestion");
                return None;
            }
        }
        self.in_flight = None;
        match result {
            Ok(recommendation) => {
                debug!(%ticket, name = %recommendation.name, "resolve: suggestion applied");
                self.stashed = None;
                Some(Ok(self.current.insert(recommendation)))
            }
            Err(e) => {
                warn!(%ticket, error = %e, "resolve: suggestion failed, restoring previous");
                self.current = self.stashed.take();
                Some(Err(e))
            }
        }
    }

    /// Forget everything, including any request in flight
    pub fn clear(&mut self) {
        self.current = None;
        self.stashed = None;
        self.in_flight = None;
    }
}
