//! The per-session polling loop.
//!
//! One task drives the loop: wait for visibility, poll, compare, apply,
//! sleep for the cadence interval. A cycle holds the loop-state lock from
//! fetch to apply, so a manual or visibility-triggered fetch can never run
//! alongside a scheduled one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use atelier_core::config::SyncConfig;
use atelier_core::types::id::NotificationId;
use atelier_entity::notification::NotificationRecord;

use crate::audio::AlertOutcome;
use crate::cache::{CacheUpdate, NotificationCache};
use crate::cadence::Cadence;
use crate::credential::{Credential, CredentialManager, CredentialState, TokenSource};
use crate::error::SyncError;
use crate::inbox::InboxClient;
use crate::session::SessionContext;

/// Where the loop is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Waiting for the next cycle.
    Idle,
    /// A fetch is in flight.
    Polling,
    /// The fetch differed and replaced the cache.
    Applied,
    /// The fetch matched the cache and was discarded.
    Skipped,
}

/// What the UI renders. Published only when something visible changed.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSnapshot {
    /// Cached records, newest first.
    pub records: Vec<NotificationRecord>,
    /// Unread records among them.
    pub unread_count: usize,
    /// Phase at publication.
    pub phase: SyncPhase,
    /// Credential sub-state at publication.
    pub credential: CredentialState,
    /// Interval until the next scheduled poll.
    #[serde(with = "duration_secs")]
    pub interval: Duration,
    /// Failure to show with a retry affordance.
    #[serde(skip)]
    pub last_error: Option<SyncError>,
    /// When the cache last matched the server.
    pub synced_at: Option<DateTime<Utc>>,
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}

impl SyncSnapshot {
    fn initial(interval: Duration, credential: CredentialState) -> Self {
        Self {
            records: Vec::new(),
            unread_count: 0,
            phase: SyncPhase::Idle,
            credential,
            interval,
            last_error: None,
            synced_at: None,
        }
    }

    /// Whether the UI should offer a manual retry.
    pub fn needs_retry(&self) -> bool {
        self.last_error
            .as_ref()
            .is_some_and(SyncError::is_recoverable)
    }
}

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fingerprint matched; nothing published.
    Unchanged,
    /// Cache replaced; `alert` says what the alert sub-routine did, if it ran.
    Applied {
        /// Alert result for the newest new unread record.
        alert: Option<AlertOutcome>,
    },
}

struct LoopState {
    cache: NotificationCache,
    cadence: Cadence,
    consecutive_failures: u32,
}

struct Inner {
    client: Arc<dyn InboxClient>,
    credentials: CredentialManager,
    session: Arc<SessionContext>,
    config: SyncConfig,
    state: Mutex<LoopState>,
    snapshot: watch::Sender<SyncSnapshot>,
    phase: watch::Sender<SyncPhase>,
    wake: Notify,
}

/// Keeps one session's inbox in step with the server.
///
/// Cloning is cheap; clones drive the same session.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("phase", &*self.inner.phase.borrow())
            .field("credentials", &self.inner.credentials)
            .finish()
    }
}

impl SyncEngine {
    /// Create an engine for one session.
    ///
    /// `initial` is the credential obtained at sign-in, if any.
    pub fn new(
        client: Arc<dyn InboxClient>,
        tokens: Arc<dyn TokenSource>,
        initial: Option<Credential>,
        session: Arc<SessionContext>,
        config: SyncConfig,
    ) -> Self {
        let credentials = CredentialManager::new(tokens, initial, config.refresh_window());
        let cadence = Cadence::from_config(&config);
        let snapshot = SyncSnapshot::initial(cadence.interval(), credentials.state());
        let state = LoopState {
            cache: NotificationCache::new(config.cache_size as usize),
            cadence,
            consecutive_failures: 0,
        };

        Self {
            inner: Arc::new(Inner {
                client,
                credentials,
                session,
                config,
                state: Mutex::new(state),
                snapshot: watch::Sender::new(snapshot),
                phase: watch::Sender::new(SyncPhase::Idle),
                wake: Notify::new(),
            }),
        }
    }

    /// Observe published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SyncSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Observe phase transitions.
    pub fn watch_phase(&self) -> watch::Receiver<SyncPhase> {
        self.inner.phase.subscribe()
    }

    /// The session this engine serves.
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.inner.session
    }

    /// Credential sub-state.
    pub fn credential_state(&self) -> CredentialState {
        self.inner.credentials.state()
    }

    /// Interval until the next scheduled poll.
    pub async fn current_interval(&self) -> Duration {
        self.inner.state.lock().await.cadence.interval()
    }

    /// Ask the loop for an out-of-cycle fetch (manual retry).
    pub fn refresh_now(&self) {
        self.inner.wake.notify_one();
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.inner.phase.send_replace(phase);
    }

    fn publish(&self, state: &LoopState, phase: SyncPhase) {
        let cache = &state.cache;
        self.inner.snapshot.send_replace(SyncSnapshot {
            records: cache.records().to_vec(),
            unread_count: cache.unread_count(),
            phase,
            credential: self.inner.credentials.state(),
            interval: state.cadence.interval(),
            last_error: None,
            synced_at: Some(Utc::now()),
        });
    }

    /// Run `op` with a fresh token, refreshing and retrying exactly once if
    /// the server rejects it.
    async fn authorized<T, F, Fut>(&self, op: F) -> Result<T, SyncError>
    where
        F: Fn(Arc<dyn InboxClient>, String) -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let credentials = &self.inner.credentials;
        let token = credentials.ensure_fresh().await?;
        let result = match op(self.inner.client.clone(), token.clone()).await {
            Err(SyncError::Unauthorized) => {
                debug!("Credential rejected, refreshing once");
                let token = credentials.force_refresh(&token).await?;
                let retried = op(self.inner.client.clone(), token).await;
                if matches!(retried, Err(SyncError::Unauthorized)) {
                    credentials.mark_expired();
                }
                retried
            }
            other => other,
        };
        if result.is_ok() {
            credentials.mark_accepted();
        }
        result
    }

    fn record_failure(&self, state: &mut LoopState, err: SyncError) -> SyncError {
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        let threshold = self.inner.config.max_consecutive_failures.max(1);
        if err.is_auth() || state.consecutive_failures >= threshold {
            warn!(
                error = %err,
                consecutive_failures = state.consecutive_failures,
                "Inbox refresh failing"
            );
            let credential = self.inner.credentials.state();
            let surfaced = err.clone();
            self.inner.snapshot.send_modify(|snapshot| {
                snapshot.phase = SyncPhase::Idle;
                snapshot.credential = credential;
                snapshot.last_error = Some(surfaced);
            });
        } else {
            debug!(error = %err, consecutive_failures = state.consecutive_failures, "Poll failed");
        }
        err
    }

    /// Run one fetch-compare-apply cycle.
    pub async fn poll_once(&self) -> Result<PollOutcome, SyncError> {
        let mut state = self.inner.state.lock().await;
        self.set_phase(SyncPhase::Polling);

        let limit = self.inner.config.cache_size;
        let fetched = match self
            .authorized(|client, token| async move { client.fetch_recent(&token, limit).await })
            .await
        {
            Ok(records) => records,
            Err(e) => {
                self.set_phase(SyncPhase::Idle);
                return Err(self.record_failure(&mut state, e));
            }
        };

        state.consecutive_failures = 0;
        let had_error = self.inner.snapshot.borrow().last_error.is_some();
        let update = state.cache.apply(fetched);
        state.cadence.record(update.is_change());

        let outcome = match update {
            CacheUpdate::Unchanged => {
                self.set_phase(SyncPhase::Skipped);
                if had_error {
                    self.publish(&state, SyncPhase::Skipped);
                }
                PollOutcome::Unchanged
            }
            CacheUpdate::Changed { alert } => {
                self.set_phase(SyncPhase::Applied);
                let alert = match alert {
                    Some(record) => Some(self.inner.session.alert_for(&record).await),
                    None => None,
                };
                self.publish(&state, SyncPhase::Applied);
                debug!(unread = state.cache.unread_count(), ?alert, "Inbox changed");
                PollOutcome::Applied { alert }
            }
        };

        self.set_phase(SyncPhase::Idle);
        Ok(outcome)
    }

    /// Mark one record read on the server, then in the cache.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), SyncError> {
        self.authorized(|client, token| async move { client.mark_read(&token, id).await })
            .await?;
        let mut state = self.inner.state.lock().await;
        if state.cache.mark_read(id) {
            self.publish(&state, SyncPhase::Applied);
        }
        Ok(())
    }

    /// Mark everything read on the server, then in the cache.
    pub async fn mark_all_read(&self) -> Result<u64, SyncError> {
        let updated = self
            .authorized(|client, token| async move { client.mark_all_read(&token).await })
            .await?;
        let mut state = self.inner.state.lock().await;
        if state.cache.mark_all_read() > 0 {
            self.publish(&state, SyncPhase::Applied);
        }
        Ok(updated)
    }

    /// Delete one record on the server, then from the cache.
    pub async fn delete(&self, id: NotificationId) -> Result<(), SyncError> {
        self.authorized(|client, token| async move { client.delete(&token, id).await })
            .await?;
        let mut state = self.inner.state.lock().await;
        if state.cache.remove(id) {
            self.publish(&state, SyncPhase::Applied);
        }
        Ok(())
    }

    /// Drive the loop until `cancel` fires, then release session resources.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut visibility = self.inner.session.watch_visibility();
        info!("Inbox sync started");

        loop {
            let visible = *visibility.borrow_and_update();
            if !visible {
                self.set_phase(SyncPhase::Idle);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    changed = visibility.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }

            if let Err(e) = self.poll_once().await {
                debug!(error = %e, "Poll failed, next cycle proceeds");
            }

            let interval = self.current_interval().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = visibility.changed() => {}
                _ = self.inner.wake.notified() => {
                    debug!("Out-of-cycle refresh requested");
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self.inner.session.release().await;
        self.set_phase(SyncPhase::Idle);
        info!("Inbox sync stopped");
    }

    /// Run the loop on a background task.
    pub fn spawn(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move { engine.run(cancel).await }.instrument(info_span!("inbox_sync")))
    }
}
