//! App - the single owner of session, suggestion, plan and schedule state

use tracing::{debug, info, warn};

use super::{AppSnapshot, Completion, Effect, Intent, Notice, NoticeLevel, Phase, UiMode};
use crate::config::ProviderKind;
use crate::domain::{Identity, IdentityKind, MealSlot, SelectionCriteria, UserKey};
use crate::plan::PlanSynchronizer;
use crate::recommend::RecommendationRequester;
use crate::schedule::{CommitError, ScheduleCommitController};
use crate::session::{Credential, SessionStore};

pub struct App {
    session: SessionStore,
    recommender: RecommendationRequester,
    plan: PlanSynchronizer,
    schedule: ScheduleCommitController,
    criteria: SelectionCriteria,
    /// Criteria the displayed recommendation was produced for
    suggested_for: Option<SelectionCriteria>,
    mode: UiMode,
    notices: Vec<Notice>,
    next_notice: u64,
}

impl App {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            recommender: RecommendationRequester::new(),
            plan: PlanSynchronizer::new(),
            schedule: ScheduleCommitController::new(),
            criteria: SelectionCriteria::default(),
            suggested_for: None,
            mode: UiMode::default(),
            notices: Vec::new(),
            next_notice: 1,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        if !self.session.identity().is_anonymous() {
            Phase::Active(self.mode)
        } else if let Some(pending) = self.session.pending() {
            Phase::Authenticating(pending.kind)
        } else {
            Phase::Unauthenticated
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            phase: self.phase(),
            identity: self.session.identity().clone(),
            epoch: self.session.epoch(),
            criteria: self.criteria,
            recommendation: self.recommender.current().cloned(),
            suggestion_pending: self.recommender.is_pending(),
            plan: self.plan.plan().clone(),
            plan_loading: self.plan.is_loading(),
            pending_schedule: self.schedule.pending(),
            committing: self.schedule.is_committing(),
            notices: self.notices.clone(),
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>, retryable: bool) {
        let notice = Notice {
            id: self.next_notice,
            level,
            message: message.into(),
            retryable,
        };
        self.next_notice += 1;
        debug!(id = notice.id, ?level, message = %notice.message, "App::notify: notice raised");
        self.notices.push(notice);
    }

    fn info(&mut self, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, message, false);
    }

    fn error(&mut self, message: impl Into<String>, retryable: bool) {
        self.notify(NoticeLevel::Error, message, retryable);
    }

    /// The backend key of the active identity, or a notice asking to sign in
    fn require_user(&mut self) -> Option<UserKey> {
        let key = self.session.identity().user_key();
        if key.is_none() {
            self.info("Sign in first");
        }
        key
    }

    /// Route one user intent
    pub fn handle(&mut self, intent: Intent) -> Vec<Effect> {
        debug!(?intent, "App::handle: called");
        match intent {
            Intent::Register(form) => match self.session.begin_registration(&form) {
                Ok((ticket, form)) => vec![Effect::Register { ticket, form }],
                Err(e) => {
                    self.error(e.to_string(), e.is_retryable());
                    vec![]
                }
            },
            Intent::SignInWithId(key) => self.begin_resolve(ProviderKind::Local, Credential::UserId(key)),
            Intent::SignInGuest => match self.session.sign_in_guest() {
                Ok(_) => {
                    self.info("Signed in as Guest");
                    self.identity_changed()
                }
                Err(e) => {
                    self.error(e.to_string(), false);
                    vec![]
                }
            },
            Intent::SignInFederated => match self.session.begin_federated() {
                Ok((ticket, url)) => {
                    debug!(%ticket, "App::handle: redirecting to identity provider");
                    vec![Effect::OpenFederatedRedirect { url }]
                }
                Err(e) => {
                    self.error(e.to_string(), false);
                    vec![]
                }
            },
            Intent::FederatedSessionEstablished(session) => {
                let credential = Credential::Federated(session);
                match self.session.pending() {
                    Some(pending) if pending.kind == ProviderKind::Federated => vec![Effect::ResolveIdentity {
                        ticket: pending.ticket,
                        provider: ProviderKind::Federated,
                        credential,
                    }],
                    _ => self.begin_resolve(ProviderKind::Federated, credential),
                }
            }
            Intent::FederatedSessionCleared => {
                if self.session.identity().kind() == IdentityKind::Federated {
                    self.sign_out();
                } else if self.session.pending().is_some_and(|p| p.kind == ProviderKind::Federated) {
                    self.session.cancel_pending();
                }
                vec![]
            }
            Intent::SignOut => {
                self.sign_out();
                vec![]
            }
            Intent::SetMood(mood) => {
                self.set_criteria(SelectionCriteria { mood, ..self.criteria });
                vec![]
            }
            Intent::SetTimeOfDay(time_of_day) => {
                self.set_criteria(SelectionCriteria {
                    time_of_day,
                    ..self.criteria
                });
                vec![]
            }
            Intent::RequestSuggestion => self.request_suggestion(),
            Intent::SwitchMode(mode) => {
                let Some(user) = self.require_user() else {
                    return vec![];
                };
                self.mode = mode;
                if mode != UiMode::Plan {
                    return vec![];
                }
                match self.plan.ensure_fetched(self.session.epoch()) {
                    Some(ticket) => vec![Effect::FetchPlan { ticket, user }],
                    None => vec![],
                }
            }
            Intent::RefreshPlan => {
                let Some(user) = self.require_user() else {
                    return vec![];
                };
                let ticket = self.plan.refresh(self.session.epoch());
                vec![Effect::FetchPlan { ticket, user }]
            }
            Intent::OpenSchedule { today } => {
                if self.require_user().is_none() {
                    return vec![];
                }
                if self.recommender.current().is_none() {
                    self.info(CommitError::NoRecommendation.to_string());
                    return vec![];
                }
                let time = self.suggested_for.unwrap_or(self.criteria).time_of_day;
                if let Err(e) = self.schedule.open(MealSlot::for_time_of_day(time), today) {
                    self.info(e.to_string());
                }
                vec![]
            }
            Intent::SetScheduleDate(date) => {
                if let Err(e) = self.schedule.set_date(date) {
                    self.info(e.to_string());
                }
                vec![]
            }
            Intent::SetScheduleSlot(slot) => {
                if let Err(e) = self.schedule.set_slot(slot) {
                    self.info(e.to_string());
                }
                vec![]
            }
            Intent::CancelSchedule => {
                if let Err(e) = self.schedule.cancel() {
                    self.info(e.to_string());
                }
                vec![]
            }
            Intent::CommitSchedule => {
                let Some(user) = self.require_user() else {
                    return vec![];
                };
                match self
                    .schedule
                    .begin_commit(self.session.epoch(), self.recommender.current())
                {
                    Ok(request) => vec![Effect::CommitMeal { user, request }],
                    Err(e) => {
                        self.info(e.to_string());
                        vec![]
                    }
                }
            }
            Intent::DismissNotice(id) => {
                self.notices.retain(|n| n.id != id);
                vec![]
            }
        }
    }

    /// Apply the outcome of an effect
    pub fn complete(&mut self, completion: Completion) -> Vec<Effect> {
        let ticket = completion.ticket();
        debug!(%ticket, "App::complete: called");
        match completion {
            Completion::Registered { ticket, result } => match self.session.finish(ticket, result) {
                Some(Ok(identity)) => {
                    self.info(format!("Welcome, {}", identity.display_name()));
                    self.identity_changed()
                }
                Some(Err(e)) => {
                    self.error(e.to_string(), e.is_retryable());
                    vec![]
                }
                None => vec![],
            },
            Completion::Resolved { ticket, result } => {
                let confirmed = result.as_ref().map_or(true, |r| r.confirmed);
                match self.session.finish(ticket, result.map(|r| r.identity)) {
                    Some(Ok(identity)) => {
                        self.info(format!("Signed in as {}", identity.display_name()));
                        if !confirmed {
                            let id = identity.user_key().map(|k| k.to_string()).unwrap_or_default();
                            self.info(format!(
                                "Could not verify user id {}: it has no planned meals yet. If this is not a new account, check the id",
                                id
                            ));
                        }
                        self.identity_changed()
                    }
                    Some(Err(e)) => {
                        self.error(e.to_string(), e.is_retryable());
                        vec![]
                    }
                    None => vec![],
                }
            }
            Completion::Suggestion { ticket, result } => {
                if !self.session.is_current(ticket.epoch) {
                    warn!(%ticket, "App::complete: suggestion for a previous identity");
                    return vec![];
                }
                let criteria = self.recommender.pending_criteria();
                let outcome = self.recommender.resolve(ticket, result).map(|r| r.map(|_| ()));
                match outcome {
                    Some(Ok(())) => {
                        self.suggested_for = criteria;
                        self.schedule.discard_pending();
                    }
                    Some(Err(e)) => self.error(format!("Could not get a suggestion: {}", e), e.is_retryable()),
                    None => {}
                }
                vec![]
            }
            Completion::Plan { ticket, result } => {
                if !self.session.is_current(ticket.epoch) {
                    warn!(%ticket, "App::complete: plan for a previous identity");
                    return vec![];
                }
                let outcome = self.plan.resolve(ticket, result).map(|r| r.map(|_| ()));
                if let Some(Err(e)) = outcome {
                    self.error(format!("Could not load your plan: {}", e), e.is_retryable());
                }
                vec![]
            }
            Completion::Committed { ticket, result } => {
                if !self.session.is_current(ticket.epoch) {
                    warn!(%ticket, "App::complete: commit for a previous identity");
                    return vec![];
                }
                match self.schedule.resolve(ticket, result) {
                    Some(Ok(done)) => {
                        self.info(format!("Added to your plan for {} {}", done.slot, done.date));
                        match self.session.identity().user_key() {
                            Some(user) => vec![Effect::FetchPlan {
                                ticket: self.plan.refresh(self.session.epoch()),
                                user,
                            }],
                            None => vec![],
                        }
                    }
                    Some(Err(e)) => {
                        self.error(e.to_string(), e.is_retryable());
                        vec![]
                    }
                    None => vec![],
                }
            }
        }
    }

    fn begin_resolve(&mut self, provider: ProviderKind, credential: Credential) -> Vec<Effect> {
        match self.session.begin_resolve(provider) {
            Ok(ticket) => vec![Effect::ResolveIdentity {
                ticket,
                provider,
                credential,
            }],
            Err(e) => {
                self.error(e.to_string(), false);
                vec![]
            }
        }
    }

    fn request_suggestion(&mut self) -> Vec<Effect> {
        let Some(user) = self.require_user() else {
            return vec![];
        };
        match self.recommender.request(self.session.epoch(), self.criteria) {
            Ok(ticket) => vec![Effect::FetchSuggestion {
                ticket,
                user,
                criteria: self.criteria,
            }],
            Err(e) => {
                self.info(e.to_string());
                vec![]
            }
        }
    }

    fn set_criteria(&mut self, criteria: SelectionCriteria) {
        if criteria == self.criteria {
            return;
        }
        self.criteria = criteria;
        if self.recommender.supersede().is_some() {
            debug!(?criteria, "App::set_criteria: criteria changed, dropped suggestion in flight");
        }
    }

    /// Reset derived state for a newly active identity and fetch its plan
    fn identity_changed(&mut self) -> Vec<Effect> {
        self.clear_derived();
        let identity: &Identity = self.session.identity();
        info!(kind = ?identity.kind(), epoch = %self.session.epoch(), "App::identity_changed: loading plan");
        match identity.user_key() {
            Some(user) => vec![Effect::FetchPlan {
                ticket: self.plan.refresh(self.session.epoch()),
                user,
            }],
            None => vec![],
        }
    }

    fn sign_out(&mut self) {
        self.session.sign_out();
        self.clear_derived();
        self.info("Signed out");
    }

    fn clear_derived(&mut self) {
        self.recommender.clear();
        self.plan.clear();
        self.schedule.clear();
        self.suggested_for = None;
        self.mode = UiMode::Suggest;
    }
}
