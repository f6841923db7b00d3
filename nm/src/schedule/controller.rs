//! Pending selection state and the commit lifecycle

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::CommitError;
use crate::domain::{Epoch, MealSlot, PendingSchedule, Recommendation, Ticket};

/// What to put in the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealTarget {
    /// The recommendation carried a backend meal id
    Id(i64),
    /// Only the name is known; it is looked up in the catalog
    Name(String),
}

impl MealTarget {
    pub fn for_recommendation(recommendation: &Recommendation) -> Self {
        match recommendation.meal_id {
            Some(id) => MealTarget::Id(id),
            None => MealTarget::Name(recommendation.name.clone()),
        }
    }
}

/// Everything needed to perform one commit, captured when it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub ticket: Ticket,
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub meal: MealTarget,
}

#[derive(Debug, Default)]
pub struct ScheduleCommitController {
    pending: Option<PendingSchedule>,
    committing: Option<Ticket>,
    seq: u64,
}

impl ScheduleCommitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<PendingSchedule> {
        self.pending
    }

    pub fn is_committing(&self) -> bool {
        self.committing.is_some()
    }

    /// Start a selection for `default_slot` on `today`
    pub fn open(&mut self, default_slot: MealSlot, today: NaiveDate) -> Result<PendingSchedule, CommitError> {
        debug!(%default_slot, %today, "open: called");
        if self.committing.is_some() {
            return Err(CommitError::AlreadyCommitting);
        }
        let pending = PendingSchedule {
            date: today,
            slot: default_slot,
        };
        self.pending = Some(pending);
        Ok(pending)
    }

    fn editable(&mut self) -> Result<&mut PendingSchedule, CommitError> {
        if self.committing.is_some() {
            return Err(CommitError::AlreadyCommitting);
        }
        self.pending.as_mut().ok_or(CommitError::NothingPending)
    }

    pub fn set_date(&mut self, date: NaiveDate) -> Result<PendingSchedule, CommitError> {
        let pending = self.editable()?;
        pending.date = date;
        Ok(*pending)
    }

    pub fn set_slot(&mut self, slot: MealSlot) -> Result<PendingSchedule, CommitError> {
        let pending = self.editable()?;
        pending.slot = slot;
        Ok(*pending)
    }

    /// Drop the selection; no side effects
    pub fn cancel(&mut self) -> Result<PendingSchedule, CommitError> {
        self.editable()?;
        self.pending.take().ok_or(CommitError::NothingPending)
    }

    /// Capture the selection and the meal for a commit stamped with `epoch`
    pub fn begin_commit(
        &mut self,
        epoch: Epoch,
        recommendation: Option<&Recommendation>,
    ) -> Result<CommitRequest, CommitError> {
        let pending = *self.editable()?;
        let recommendation = recommendation.ok_or(CommitError::NoRecommendation)?;
        self.seq += 1;
        let ticket = Ticket::new(epoch, self.seq);
        self.committing = Some(ticket);
        info!(%ticket, date = %pending.date, slot = %pending.slot, meal = %recommendation.name, "begin_commit: committing");
        Ok(CommitRequest {
            ticket,
            date: pending.date,
            slot: pending.slot,
            meal: MealTarget::for_recommendation(recommendation),
        })
    }

    /// Apply a commit outcome; success consumes the selection, failure keeps it
    ///
    /// Returns `None` for a stale ticket.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<(), CommitError>,
    ) -> Option<Result<PendingSchedule, CommitError>> {
        if self.committing != Some(ticket) {
            warn!(%ticket, "resolve: discarding stale commit outcome");
            return None;
        }
        self.committing = None;
        match result {
            Ok(()) => {
                let done = self.pending.take()?;
                info!(%ticket, "resolve: committed");
                Some(Ok(done))
            }
            Err(e) => {
                warn!(%ticket, error = %e, "resolve: commit failed, keeping selection");
                Some(Err(e))
            }
        }
    }

    /// Drop the selection unless a commit for it is in flight
    pub fn discard_pending(&mut self) {
        if self.committing.is_none() {
            self.pending = None;
        }
    }

    /// Forget everything, including a commit in flight
    pub fn clear(&mut self) {
        self.pending = None;
        self.committing = None;
    }
}
