//! Access credential freshness.
//!
//! Refresh is a critical section: the current credential sits behind an
//! async mutex, so a caller that finds a refresh in flight waits for it and
//! then reuses its result instead of starting another.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::error::SyncError;

/// A bearer token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Bearer token sent to the inbox API.
    pub access_token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    /// Create a credential.
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Whether less than `window` of validity remains at `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        self.expires_at.signed_duration_since(now) < window
    }
}

/// Where fresh credentials come from (the auth backend's refresh call).
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Obtain a new credential.
    async fn refresh(&self) -> Result<Credential, SyncError>;
}

/// Credential sub-state, orthogonal to the polling phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    /// A usable credential is held.
    Valid,
    /// A refresh is in flight.
    Refreshing,
    /// No usable credential; the user may need to sign in again.
    Expired,
}

/// Holds the session credential and refreshes it on demand.
pub struct CredentialManager {
    source: Arc<dyn TokenSource>,
    window: Duration,
    current: Mutex<Option<Credential>>,
    state: watch::Sender<CredentialState>,
}

impl fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialManager")
            .field("window", &self.window)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl CredentialManager {
    /// Create a manager, optionally seeded with the sign-in credential.
    pub fn new(source: Arc<dyn TokenSource>, initial: Option<Credential>, window: Duration) -> Self {
        let state = if initial.is_some() {
            CredentialState::Valid
        } else {
            CredentialState::Expired
        };
        Self {
            source,
            window,
            current: Mutex::new(initial),
            state: watch::Sender::new(state),
        }
    }

    /// Current sub-state.
    pub fn state(&self) -> CredentialState {
        *self.state.borrow()
    }

    /// Observe sub-state changes.
    pub fn subscribe(&self) -> watch::Receiver<CredentialState> {
        self.state.subscribe()
    }

    /// A token with at least the refresh window of validity left.
    pub async fn ensure_fresh(&self) -> Result<String, SyncError> {
        let mut current = self.current.lock().await;
        if let Some(credential) = current
            .as_ref()
            .filter(|c| !c.needs_refresh(Utc::now(), self.window))
        {
            return Ok(credential.access_token.clone());
        }
        debug!("Credential missing or near expiry, refreshing");
        self.refresh_locked(&mut current).await
    }

    /// Replace a token the server just rejected.
    ///
    /// When another caller already replaced `rejected`, its result is reused.
    pub async fn force_refresh(&self, rejected: &str) -> Result<String, SyncError> {
        let mut current = self.current.lock().await;
        if let Some(credential) = current
            .as_ref()
            .filter(|c| c.access_token != rejected && !c.needs_refresh(Utc::now(), self.window))
        {
            return Ok(credential.access_token.clone());
        }
        self.refresh_locked(&mut current).await
    }

    /// Record that even a freshly refreshed token was rejected.
    pub fn mark_expired(&self) {
        self.state.send_replace(CredentialState::Expired);
    }

    /// Record that the server accepted the current token.
    pub fn mark_accepted(&self) {
        self.state.send_if_modified(|state| {
            let expired = *state == CredentialState::Expired;
            if expired {
                *state = CredentialState::Valid;
            }
            expired
        });
    }

    async fn refresh_locked(&self, slot: &mut Option<Credential>) -> Result<String, SyncError> {
        self.state.send_replace(CredentialState::Refreshing);
        match self.source.refresh().await {
            Ok(credential) => {
                let token = credential.access_token.clone();
                debug!(expires_at = %credential.expires_at, "Credential refreshed");
                *slot = Some(credential);
                self.state.send_replace(CredentialState::Valid);
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "Credential refresh failed");
                self.state.send_replace(CredentialState::Expired);
                Err(match e {
                    SyncError::Credential(_) => e,
                    other => SyncError::Credential(other.to_string()),
                })
            }
        }
    }
}
