//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use atelier_api::auth::Claims;
use atelier_api::{AppState, build_app};
use atelier_core::config::AppConfig;
use atelier_core::types::id::{DesignFileId, ProjectId, UserId};
use atelier_database::{DirectoryStore, MemoryStore, NotificationStore};
use atelier_delivery::{
    ChannelSender, FanOutDispatcher, InAppChannel, MessagingChannel, Notifier, PushChannel,
};
use atelier_entity::notification::NotificationRecord;
use atelier_entity::project::{Project, ProjectStatus};
use atelier_entity::user::UserProfile;
use atelier_entity::work::DesignFile;
use atelier_service::{InboxService, StakeholderResolver, TemplateComposer};
use atelier_worker::DailyLogReminderJob;

pub const SECRET: &str = "integration-secret";
pub const TRIGGER_SECRET: &str = "integration-trigger";

/// A running server over a fresh in-memory store.
pub struct TestApp {
    /// Base URL of the server, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    /// The store behind the server, for seeding and assertions.
    pub store: MemoryStore,
    client: reqwest::Client,
    server: JoinHandle<()>,
}

/// A parsed response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Start a server on an ephemeral port.
    pub async fn spawn() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = SECRET.to_string();
        config.auth.leeway_seconds = 0;
        config.reminders.trigger_secret = TRIGGER_SECRET.to_string();

        let store = MemoryStore::new();
        let directory: Arc<dyn DirectoryStore> = Arc::new(store.clone());
        let notifications: Arc<dyn NotificationStore> = Arc::new(store.clone());

        let in_app: Arc<dyn ChannelSender> = Arc::new(InAppChannel::new(notifications.clone()));
        let push: Arc<dyn ChannelSender> =
            Arc::new(PushChannel::new(config.notifications.push.clone()).expect("push channel"));
        let messaging: Arc<dyn ChannelSender> = Arc::new(
            MessagingChannel::new(config.notifications.messaging.clone())
                .expect("messaging channel"),
        );
        let dispatcher = Arc::new(FanOutDispatcher::new(
            directory.clone(),
            in_app,
            push,
            messaging,
        ));
        let notifier = Notifier::new(
            Arc::new(StakeholderResolver::new(directory.clone())),
            Arc::new(TemplateComposer::new(directory.clone())),
            dispatcher.clone(),
        );
        let inbox = Arc::new(InboxService::new(
            notifications,
            config.notifications.inbox.clone(),
        ));
        let reminders = Arc::new(DailyLogReminderJob::new(
            directory,
            dispatcher,
            config.reminders.clone(),
        ));
        let state = AppState::new(Arc::new(config), inbox, notifier, reminders);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_app(state);
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
            client: reqwest::Client::new(),
            server,
        }
    }

    /// Send a request, optionally with a JSON body and bearer token.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(&body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.expect("Failed to send request");
        let status = response.status();
        let text = response.text().await.expect("Failed to read body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    /// Wait until `user` holds at least `count` records.
    pub async fn wait_for_inbox(&self, user: UserId, count: usize) -> Vec<NotificationRecord> {
        for _ in 0..100 {
            let inbox = self.store.inbox(user);
            if inbox.len() >= count {
                return inbox;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("inbox of {user} never reached {count} records");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A signed access token for `user`, valid for `ttl_seconds`.
pub fn token_for(user: UserId, secret: &str, ttl_seconds: i64) -> String {
    let claims = Claims {
        sub: user,
        exp: Utc::now().timestamp() + ttl_seconds,
        role: Some("authenticated".to_string()),
        email: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token")
}

/// A directory entry with a handle and a role.
pub fn person(name: &str, handle: &str, role: &str) -> UserProfile {
    UserProfile {
        id: UserId::new(),
        display_name: name.to_string(),
        handle: Some(handle.to_string()),
        email: Some(format!("{handle}@studio.example")),
        contact_address: None,
        role: role.to_string(),
        designation: None,
    }
}

/// One project with a commenter, an uploader, an owner, and a mentionable
/// member.
pub struct Studio {
    pub project: Project,
    pub design_file: DesignFile,
    pub commenter: UserProfile,
    pub uploader: UserProfile,
    pub owner: UserProfile,
    pub mentioned: UserProfile,
    pub bystander: UserProfile,
}

impl Studio {
    /// Seed the studio into `store`.
    pub fn seed(store: &MemoryStore, name: &str) -> Self {
        let commenter = person("Asha Rao", "asha", "designer");
        let uploader = person("Bilal Khan", "bilal", "designer");
        let owner = person("Chitra Menon", "chitra", "project manager");
        let mentioned = person("Dev Patel", "dev", "site supervisor");
        let bystander = person("Esha Gill", "esha", "accountant");

        let project = Project {
            id: ProjectId::new(),
            name: name.to_string(),
            owner_id: owner.id,
            status: ProjectStatus::Active,
            created_at: Utc::now(),
        };
        let design_file = DesignFile {
            id: DesignFileId::new(),
            project_id: project.id,
            name: "Kitchen elevation v3".to_string(),
            uploaded_by: uploader.id,
        };

        for user in [&commenter, &uploader, &owner, &mentioned, &bystander] {
            store.insert_user(user.clone());
        }
        store.insert_project(project.clone());
        for user in [&commenter, &uploader, &mentioned, &bystander] {
            store.add_member(project.id, user.id, Some(user.role.as_str()));
        }
        store.insert_design_file(design_file.clone());

        Self {
            project,
            design_file,
            commenter,
            uploader,
            owner,
            mentioned,
            bystander,
        }
    }

    /// A comment on the design file mentioning the site supervisor.
    pub fn comment_payload(&self, comment: &str) -> Value {
        serde_json::json!({
            "payload": {
                "type": "comment_added",
                "project_id": self.project.id,
                "design_file_id": self.design_file.id,
                "comment": comment,
            }
        })
    }
}
