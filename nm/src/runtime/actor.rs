//! AppHandle - cloneable handle to the runtime actor

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info};

use super::EffectRunner;
use super::messages::{RuntimeCommand, RuntimeError, RuntimeEvent, RuntimeResponse};
use crate::api::{ApiError, MealApi};
use crate::app::{App, AppSnapshot, Completion, Effect, Intent};
use crate::config::Config;
use crate::session::{ProviderSet, SessionStore};

/// Handle to send commands to the runtime actor
#[derive(Clone)]
pub struct AppHandle {
    tx: mpsc::Sender<RuntimeCommand>,
    event_tx: broadcast::Sender<RuntimeEvent>,
}

impl AppHandle {
    /// Build the App from configuration and spawn its actor
    pub fn start(config: &Config, api: Arc<dyn MealApi>) -> Self {
        debug!("start: called");
        let providers = ProviderSet::from_config(config, api.clone());
        let session = SessionStore::new(providers.clone(), config.identity.default_name.clone());
        let runner = EffectRunner::new(api, providers, &config.backend);
        Self::spawn(App::new(session), runner)
    }

    /// Spawn an actor around an existing App
    pub fn spawn(app: App, runner: EffectRunner) -> Self {
        debug!("spawn: called");
        let (tx, rx) = mpsc::channel(64);
        let (event_tx, _) = broadcast::channel(64);

        tokio::spawn(actor_loop(app, runner, rx, event_tx.clone()));

        info!("runtime spawned");
        Self { tx, event_tx }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.event_tx.subscribe()
    }

    /// Route an intent; replies with the state right after it was handled
    pub async fn dispatch(&self, intent: Intent) -> RuntimeResponse<AppSnapshot> {
        debug!(?intent, "dispatch: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(RuntimeCommand::Intent {
                intent,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelError)?;
        reply_rx.await.map_err(|_| RuntimeError::ChannelError)
    }

    pub async fn snapshot(&self) -> RuntimeResponse<AppSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(RuntimeCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::ChannelError)?;
        reply_rx.await.map_err(|_| RuntimeError::ChannelError)
    }

    /// Wait until every effect has completed, then return the state
    ///
    /// Effects are bounded by the backend timeout, so this always returns.
    pub async fn when_idle(&self) -> RuntimeResponse<AppSnapshot> {
        debug!("when_idle: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(RuntimeCommand::WhenIdle { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::ChannelError)?;
        reply_rx.await.map_err(|_| RuntimeError::ChannelError)
    }

    pub async fn shutdown(&self) -> RuntimeResponse<()> {
        debug!("shutdown: called");
        self.tx
            .send(RuntimeCommand::Shutdown)
            .await
            .map_err(|_| RuntimeError::ChannelError)
    }
}

struct Actor {
    app: App,
    runner: EffectRunner,
    done_tx: mpsc::UnboundedSender<Completion>,
    event_tx: broadcast::Sender<RuntimeEvent>,
    in_flight: usize,
    idle_waiters: Vec<oneshot::Sender<AppSnapshot>>,
}

impl Actor {
    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            if let Effect::OpenFederatedRedirect { url } = &effect {
                debug!("run_effects: requesting redirect");
                let _ = self.event_tx.send(RuntimeEvent::RedirectRequested { url: url.clone() });
                continue;
            }
            let Some(ticket) = effect.ticket() else {
                continue;
            };
            self.in_flight += 1;
            let runner = self.runner.clone();
            let done_tx = self.done_tx.clone();
            let task = tokio::spawn({
                let effect = effect.clone();
                async move { runner.run(effect).await }
            });
            tokio::spawn(async move {
                // A task that dies still owes the App a completion
                let completion = match task.await {
                    Ok(completion) => completion,
                    Err(e) => {
                        error!(%ticket, error = %e, "run_effects: effect task failed");
                        effect.failed(ApiError::Unavailable(format!("request task failed: {}", e)))
                    }
                };
                match completion {
                    Some(completion) => {
                        if done_tx.send(completion).is_err() {
                            debug!("run_effects: runtime gone, dropping completion");
                        }
                    }
                    None => error!(%ticket, "run_effects: effect produced no completion"),
                }
            });
        }
    }

    fn complete(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let effects = self.app.complete(completion);
        self.run_effects(effects);
        let snapshot = self.app.snapshot();
        let _ = self.event_tx.send(RuntimeEvent::Updated(Box::new(snapshot.clone())));
        if self.in_flight == 0 {
            for waiter in self.idle_waiters.drain(..) {
                let _ = waiter.send(snapshot.clone());
            }
        }
    }
}

async fn actor_loop(
    app: App,
    runner: EffectRunner,
    mut rx: mpsc::Receiver<RuntimeCommand>,
    event_tx: broadcast::Sender<RuntimeEvent>,
) {
    debug!("actor_loop: called");
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut actor = Actor {
        app,
        runner,
        done_tx,
        event_tx,
        in_flight: 0,
        idle_waiters: Vec::new(),
    };

    loop {
        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!("actor_loop: all handles dropped");
                    break;
                };
                match cmd {
                    RuntimeCommand::Intent { intent, reply } => {
                        let effects = actor.app.handle(intent);
                        actor.run_effects(effects);
                        let _ = reply.send(actor.app.snapshot());
                    }
                    RuntimeCommand::Snapshot { reply } => {
                        let _ = reply.send(actor.app.snapshot());
                    }
                    RuntimeCommand::WhenIdle { reply } => {
                        if actor.in_flight == 0 {
                            let _ = reply.send(actor.app.snapshot());
                        } else {
                            actor.idle_waiters.push(reply);
                        }
                    }
                    RuntimeCommand::Shutdown => {
                        info!("actor_loop: shutdown requested");
                        break;
                    }
                }
            }
            Some(completion) = done_rx.recv() => {
                debug!(ticket = %completion.ticket(), "actor_loop: completion");
                actor.complete(completion);
            }
        }
    }

    if actor.in_flight > 0 {
        error!(in_flight = actor.in_flight, "actor_loop: stopping with effects still running");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockMealApi, MockOp};
    use crate::app::{NoticeLevel, Phase, UiMode};
    use crate::config::ProviderKind;
    use crate::domain::{MealSlot, UserKey};
    use crate::session::{AuthError, Credential, IdentityProvider, ResolvedIdentity};
    use async_trait::async_trait;
    use chrono::{Days, Local};
    use std::time::Duration;

    fn start(api: Arc<MockMealApi>, timeout_ms: u64) -> AppHandle {
        let mut config = Config::default();
        config.backend.timeout_ms = timeout_ms;
        AppHandle::start(&config, api)
    }

    #[tokio::test]
    async fn test_guest_session_loads_plan() {
        let api = Arc::new(MockMealApi::new());
        let handle = start(api.clone(), 1_000);

        let snapshot = handle.dispatch(Intent::SignInGuest).await.unwrap();
        assert_eq!(snapshot.phase, Phase::Active(UiMode::Suggest));

        let snapshot = handle.when_idle().await.unwrap();
        assert!(!snapshot.plan_loading);
        assert_eq!(api.calls(MockOp::FetchPlan), 1);
    }

    #[tokio::test]
    async fn test_sign_out_while_suggestion_in_flight() {
        let api = Arc::new(MockMealApi::new());
        api.hold(MockOp::Recommend);
        let handle = start(api.clone(), 5_000);

        handle.dispatch(Intent::SignInGuest).await.unwrap();
        let snapshot = handle.dispatch(Intent::RequestSuggestion).await.unwrap();
        assert!(snapshot.suggestion_pending);

        let snapshot = handle.dispatch(Intent::SignOut).await.unwrap();
        assert_eq!(snapshot.phase, Phase::Unauthenticated);

        api.release(MockOp::Recommend, 1);
        let snapshot = handle.when_idle().await.unwrap();
        assert_eq!(snapshot.phase, Phase::Unauthenticated);
        assert!(snapshot.recommendation.is_none());
        assert!(!snapshot.suggestion_pending);
    }

    #[tokio::test]
    async fn test_hung_backend_becomes_retryable_notice() {
        let api = Arc::new(MockMealApi::new());
        api.hold(MockOp::Recommend);
        let handle = start(api, 50);

        handle.dispatch(Intent::SignInGuest).await.unwrap();
        handle.dispatch(Intent::RequestSuggestion).await.unwrap();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), handle.when_idle())
            .await
            .unwrap()
            .unwrap();

        assert!(!snapshot.suggestion_pending);
        let notice = snapshot.notices.last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.retryable);
        assert!(notice.message.contains("Timeout"));
    }

    #[tokio::test]
    async fn test_schedule_commit_and_refresh() {
        let api = Arc::new(MockMealApi::new());
        let handle = start(api.clone(), 1_000);
        let today = Local::now().date_naive();
        let target = today + Days::new(2);

        handle.dispatch(Intent::SignInGuest).await.unwrap();
        handle.dispatch(Intent::RequestSuggestion).await.unwrap();
        let snapshot = handle.when_idle().await.unwrap();
        assert_eq!(snapshot.recommendation.unwrap().name, "Paneer Butter Masala");

        handle.dispatch(Intent::OpenSchedule { today }).await.unwrap();
        handle.dispatch(Intent::SetScheduleDate(target)).await.unwrap();
        handle.dispatch(Intent::SetScheduleSlot(MealSlot::Lunch)).await.unwrap();
        handle.dispatch(Intent::CommitSchedule).await.unwrap();
        let snapshot = handle.when_idle().await.unwrap();

        assert!(snapshot.pending_schedule.is_none());
        let entry = snapshot.plan.iter().next().unwrap();
        assert_eq!(entry.date.date(), target);
        assert_eq!(entry.meal_type, MealSlot::Lunch);
        assert_eq!(entry.meal.name, "Paneer Butter Masala");
        assert!(entry.id >= 100);
        assert_eq!(api.plan_of(&UserKey::Numeric(1)).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_selection() {
        let api = Arc::new(MockMealApi::new());
        api.fail(MockOp::AddToPlan, 503);
        let handle = start(api.clone(), 1_000);

        handle.dispatch(Intent::SignInGuest).await.unwrap();
        handle.dispatch(Intent::RequestSuggestion).await.unwrap();
        handle.when_idle().await.unwrap();
        handle
            .dispatch(Intent::OpenSchedule {
                today: Local::now().date_naive(),
            })
            .await
            .unwrap();
        handle.dispatch(Intent::CommitSchedule).await.unwrap();
        let snapshot = handle.when_idle().await.unwrap();
        assert!(snapshot.pending_schedule.is_some());
        assert!(snapshot.notices.last().unwrap().retryable);

        api.clear_failure(MockOp::AddToPlan);
        handle.dispatch(Intent::CommitSchedule).await.unwrap();
        let snapshot = handle.when_idle().await.unwrap();
        assert!(snapshot.pending_schedule.is_none());
        assert_eq!(snapshot.plan.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_twice_is_identical() {
        let api = Arc::new(MockMealApi::new());
        let handle = start(api, 1_000);
        handle.dispatch(Intent::SignInGuest).await.unwrap();
        handle.dispatch(Intent::RequestSuggestion).await.unwrap();
        handle.when_idle().await.unwrap();
        handle
            .dispatch(Intent::OpenSchedule {
                today: Local::now().date_naive(),
            })
            .await
            .unwrap();
        handle.dispatch(Intent::CommitSchedule).await.unwrap();
        handle.when_idle().await.unwrap();

        handle.dispatch(Intent::RefreshPlan).await.unwrap();
        let first = handle.when_idle().await.unwrap().plan;
        handle.dispatch(Intent::RefreshPlan).await.unwrap();
        let second = handle.when_idle().await.unwrap().plan;
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_federated_redirect_is_broadcast() {
        let api: Arc<dyn MealApi> = Arc::new(MockMealApi::new());
        let mut config = Config::default();
        config.identity.providers = vec![ProviderKind::Federated];
        config.federated.authorize_url = "https://auth.example.com/authorize".to_string();
        let handle = AppHandle::start(&config, api);
        let mut events = handle.subscribe_events();

        let snapshot = handle.dispatch(Intent::SignInFederated).await.unwrap();
        assert_eq!(snapshot.phase, Phase::Authenticating(ProviderKind::Federated));
        match events.recv().await.unwrap() {
            RuntimeEvent::RedirectRequested { url } => assert!(url.contains("redirect_uri")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shutdown_closes_channel() {
        let handle = start(Arc::new(MockMealApi::new()), 1_000);
        handle.shutdown().await.unwrap();
        tokio::task::yield_now().await;
        assert!(handle.snapshot().await.is_err());
    }

    struct PanickingProvider;

    #[async_trait]
    impl IdentityProvider for PanickingProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Local
        }

        async fn resolve_identity(&self, _credential: &Credential) -> Result<ResolvedIdentity, AuthError> {
            panic!("provider bug");
        }
    }

    #[tokio::test]
    async fn test_panicking_effect_still_reaches_idle() {
        let api = Arc::new(MockMealApi::new());
        let config = Config::default();
        let providers = ProviderSet::from_config(&config, api.clone()).with(Arc::new(PanickingProvider));
        let session = SessionStore::new(providers.clone(), config.identity.default_name.clone());
        let runner = EffectRunner::new(api, providers, &config.backend);
        let handle = AppHandle::spawn(App::new(session), runner);

        handle.dispatch(Intent::SignInWithId(UserKey::Numeric(5))).await.unwrap();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), handle.when_idle())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.phase, Phase::Unauthenticated);
        let notice = snapshot.notices.last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.retryable);

        // The runtime keeps serving after the failure
        let snapshot = handle.dispatch(Intent::SignInGuest).await.unwrap();
        assert!(snapshot.phase.is_active());
    }
}
