//! Plan Synchronizer
//!
//! Holds the locally displayed copy of the backend plan. Every fetch replaces
//! it wholesale; a failed fetch leaves it as it was.

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::domain::{Epoch, Plan, PlannedMeal, Ticket};

#[derive(Debug, Default)]
pub struct PlanSynchronizer {
    plan: Plan,
    seq: u64,
    in_flight: Option<Ticket>,
    fetched_for: Option<Epoch>,
}

impl PlanSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a fetch has succeeded under `epoch`
    pub fn has_fetched(&self, epoch: Epoch) -> bool {
        self.fetched_for == Some(epoch)
    }

    /// Start a fetch; only the latest one issued is applied
    pub fn refresh(&mut self, epoch: Epoch) -> Ticket {
        self.seq += 1;
        let ticket = Ticket::new(epoch, self.seq);
        if let Some(previous) = self.in_flight.replace(ticket) {
            debug!(%previous, %ticket, "refresh: superseding earlier fetch");
        }
        debug!(%ticket, "refresh: called");
        ticket
    }

    /// Start a fetch unless one already succeeded or is running under `epoch`
    pub fn ensure_fetched(&mut self, epoch: Epoch) -> Option<Ticket> {
        let running = self.in_flight.is_some_and(|t| t.epoch == epoch);
        if self.has_fetched(epoch) || running {
            return None;
        }
        Some(self.refresh(epoch))
    }

    /// Apply a completion; `None` means it was stale and nothing changed
    pub fn resolve(&mut self, ticket: Ticket, result: Result<Vec<PlannedMeal>, ApiError>) -> Option<Result<&Plan, ApiError>> {
        if self.in_flight != Some(ticket) {
            warn!(%ticket, "resolve: discarding stale plan");
            return None;
        }
        self.in_flight = None;
        match result {
            Ok(entries) => {
                info!(%ticket, count = entries.len(), "resolve: plan replaced");
                self.plan = Plan::new(entries);
                self.fetched_for = Some(ticket.epoch);
                Some(Ok(&self.plan))
            }
            Err(e) => {
                warn!(%ticket, error = %e, "resolve: plan fetch failed, keeping previous plan");
                Some(Err(e))
            }
        }
    }

    pub fn clear(&mut self) {
        self.plan = Plan::default();
        self.in_flight = None;
        self.fetched_for = None;
    }
}
