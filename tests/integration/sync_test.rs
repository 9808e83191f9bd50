//! The client sync engine against a live server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;

use atelier_core::config::SyncConfig;
use atelier_core::types::id::UserId;
use atelier_sync::{
    AlertOutcome, AudioBackend, AudioContext, AudioGate, AudioState, Credential, CredentialState,
    HttpInboxClient, PollOutcome, SessionContext, SyncEngine, SyncError, TokenSource,
};

use crate::helpers::{SECRET, Studio, TestApp, token_for};

struct Chime {
    plays: Arc<AtomicUsize>,
}

impl AudioContext for Chime {
    fn state(&self) -> AudioState {
        AudioState::Running
    }

    fn resume(&mut self) -> AudioState {
        AudioState::Running
    }

    fn play_chime(&mut self) -> bool {
        self.plays.fetch_add(1, Ordering::SeqCst);
        true
    }
}

#[derive(Default)]
struct ChimeBackend {
    plays: Arc<AtomicUsize>,
}

impl AudioBackend for ChimeBackend {
    fn create_context(&self) -> Option<Box<dyn AudioContext>> {
        Some(Box::new(Chime {
            plays: self.plays.clone(),
        }))
    }
}

/// Signs fresh tokens for one user, as the auth backend would.
struct SignedTokens {
    user: UserId,
    issued: AtomicUsize,
}

#[async_trait]
impl TokenSource for SignedTokens {
    async fn refresh(&self) -> Result<Credential, SyncError> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(Credential::new(
            token_for(self.user, SECRET, 3600),
            Utc::now() + chrono::Duration::hours(1),
        ))
    }
}

struct Client {
    engine: SyncEngine,
    tokens: Arc<SignedTokens>,
    plays: Arc<AtomicUsize>,
}

async fn client_for(app: &TestApp, user: UserId, initial_secret: &str) -> Client {
    let inbox = HttpInboxClient::new(app.base_url.clone(), Duration::from_secs(5))
        .expect("inbox client");
    let tokens = Arc::new(SignedTokens {
        user,
        issued: AtomicUsize::new(0),
    });
    let backend = Arc::new(ChimeBackend::default());
    let plays = backend.plays.clone();
    let session = Arc::new(SessionContext::in_memory(AudioGate::new(Some(backend), None)));
    session.unlock_audio().await;

    let engine = SyncEngine::new(
        Arc::new(inbox),
        tokens.clone(),
        Some(Credential::new(
            token_for(user, initial_secret, 3600),
            Utc::now() + chrono::Duration::hours(1),
        )),
        session,
        SyncConfig::default(),
    );
    Client {
        engine,
        tokens,
        plays,
    }
}

async fn comment(app: &TestApp, studio: &Studio, text: &str) {
    let token = token_for(studio.commenter.id, SECRET, 600);
    let response = app
        .request(
            Method::POST,
            "/api/events",
            Some(studio.comment_payload(text)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_new_record_alerts_once_and_read_state_round_trips() {
    let app = TestApp::spawn().await;
    let studio = Studio::seed(&app.store, "Lakeside Villa");
    let client = client_for(&app, studio.uploader.id, SECRET).await;
    let engine = &client.engine;

    assert_eq!(engine.poll_once().await, Ok(PollOutcome::Applied { alert: None }));

    comment(&app, &studio, "Looks good, one question on the sill").await;
    let record = app.wait_for_inbox(studio.uploader.id, 1).await.remove(0);

    assert_eq!(
        engine.poll_once().await,
        Ok(PollOutcome::Applied {
            alert: Some(AlertOutcome::Played)
        })
    );
    assert_eq!(engine.poll_once().await, Ok(PollOutcome::Unchanged));
    assert_eq!(client.plays.load(Ordering::SeqCst), 1);
    assert_eq!(engine.snapshot().unread_count, 1);

    engine.mark_read(record.id).await.expect("mark read");
    assert_eq!(engine.snapshot().unread_count, 0);
    assert!(!app.store.inbox(studio.uploader.id)[0].is_unread());
    assert_eq!(engine.poll_once().await, Ok(PollOutcome::Unchanged));
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_against_live_server() {
    let app = TestApp::spawn().await;
    let studio = Studio::seed(&app.store, "Hilltop Cafe");
    let client = client_for(&app, studio.owner.id, "revoked-signing-key").await;

    assert_eq!(client.engine.poll_once().await, Ok(PollOutcome::Applied { alert: None }));
    assert_eq!(client.tokens.issued.load(Ordering::SeqCst), 1);
    assert_eq!(client.engine.credential_state(), CredentialState::Valid);
}

#[tokio::test]
async fn test_running_loop_picks_up_records_on_manual_refresh() {
    let app = TestApp::spawn().await;
    let studio = Studio::seed(&app.store, "Garden Studio");
    let client = client_for(&app, studio.mentioned.id, SECRET).await;
    let mut snapshots = client.engine.subscribe();

    let cancel = CancellationToken::new();
    let handle = client.engine.spawn(cancel.clone());

    // First fetch of an empty inbox.
    tokio::time::timeout(Duration::from_secs(5), snapshots.changed())
        .await
        .expect("first fetch published")
        .expect("engine alive");
    assert_eq!(snapshots.borrow_and_update().unread_count, 0);

    comment(&app, &studio, "@dev please confirm the tile delivery").await;
    app.wait_for_inbox(studio.mentioned.id, 1).await;
    client.engine.refresh_now();

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            snapshots.changed().await.expect("engine alive");
            if snapshots.borrow_and_update().unread_count == 1 {
                break;
            }
        }
    })
    .await
    .expect("new record published");
    assert_eq!(client.plays.load(Ordering::SeqCst), 1);

    cancel.cancel();
    handle.await.expect("loop exits");
}
