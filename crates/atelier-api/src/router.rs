//! Route definitions for the Atelier notification API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::Router;
use axum::routing::{delete, get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the API router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(event_routes())
        .merge(internal_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// The caller's inbox
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            post(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            post(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
}

/// Domain events from the business layer
fn event_routes() -> Router<AppState> {
    Router::new().route("/events", post(handlers::events::publish_event))
}

/// Time-triggered jobs
fn internal_routes() -> Router<AppState> {
    Router::new().route(
        "/internal/reminders/daily-logs",
        post(handlers::reminders::trigger_daily_log_sweep),
    )
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    use atelier_core::config::AppConfig;
    use atelier_core::types::id::{ProjectId, TaskId, UserId};
    use atelier_database::{DirectoryStore, MemoryStore, NotificationStore};
    use atelier_delivery::{
        ChannelSender, FanOutDispatcher, InAppChannel, MessagingChannel, Notifier, PushChannel,
    };
    use atelier_entity::notification::{
        NewNotification, NotificationRecord, NotificationType, RelatedEntityKind,
    };
    use atelier_service::{InboxService, StakeholderResolver, TemplateComposer};
    use atelier_worker::DailyLogReminderJob;

    use super::*;
    use crate::auth::tests::{SECRET, config as auth_config, token_for};

    fn app_with(config: AppConfig) -> (Router, MemoryStore) {
        let store = MemoryStore::new();
        let directory: Arc<dyn DirectoryStore> = Arc::new(store.clone());
        let notifications: Arc<dyn NotificationStore> = Arc::new(store.clone());

        let in_app: Arc<dyn ChannelSender> = Arc::new(InAppChannel::new(notifications.clone()));
        let push: Arc<dyn ChannelSender> =
            Arc::new(PushChannel::new(config.notifications.push.clone()).expect("push"));
        let messaging: Arc<dyn ChannelSender> = Arc::new(
            MessagingChannel::new(config.notifications.messaging.clone()).expect("messaging"),
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
        (build_router(state), store)
    }

    fn app() -> (Router, MemoryStore) {
        let config = AppConfig {
            auth: auth_config(),
            ..AppConfig::default()
        };
        app_with(config)
    }

    fn seed(store: &MemoryStore, user: UserId, title: &str) -> NotificationRecord {
        let record = NewNotification {
            user_id: user,
            title: title.to_string(),
            message: "body".to_string(),
            notification_type: NotificationType::TaskAssigned,
            project_id: Some(ProjectId::new()),
            related_entity_id: Some(TaskId::new().into_uuid()),
            related_entity_kind: Some(RelatedEntityKind::Task),
        }
        .into_record(Utc::now());
        store.insert_notification(record.clone());
        record
    }

    fn request(method: Method, uri: &str, user: Option<UserId>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(user, SECRET, 600)),
            );
        }
        builder.body(Body::empty()).expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let (app, _) = app();
        let response = app
            .oneshot(request(Method::GET, "/api/health", None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_inbox_requires_bearer_token() {
        let (app, _) = app();
        let response = app
            .oneshot(request(Method::GET, "/api/notifications", None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_list_returns_own_records_newest_first_with_links() {
        let (app, store) = app();
        let user = UserId::new();
        seed(&store, user, "first");
        let newest = seed(&store, user, "second");
        seed(&store, UserId::new(), "someone else's");

        let response = app
            .oneshot(request(Method::GET, "/api/notifications?limit=10", Some(user)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let items = body["data"].as_array().expect("array");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "second");
        assert_eq!(
            items[0]["link"],
            Value::String(newest.deep_link().expect("link"))
        );
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected() {
        let (app, _) = app();
        let response = app
            .oneshot(request(
                Method::GET,
                "/api/notifications?limit=0",
                Some(UserId::new()),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_recipient() {
        let (app, store) = app();
        let owner = UserId::new();
        let record = seed(&store, owner, "task");
        let uri = format!("/api/notifications/{}/read", record.id);

        let response = app
            .clone()
            .oneshot(request(Method::POST, &uri, Some(UserId::new())))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Marking twice succeeds both times.
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request(Method::POST, &uri, Some(owner)))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
        assert!(store.inbox(owner)[0].is_read);
    }

    #[tokio::test]
    async fn test_read_all_then_delete() {
        let (app, store) = app();
        let user = UserId::new();
        let record = seed(&store, user, "one");
        seed(&store, user, "two");

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/api/notifications/read-all", Some(user)))
            .await
            .expect("response");
        assert_eq!(json_body(response).await["data"]["count"], 2);

        let response = app
            .clone()
            .oneshot(request(
                Method::GET,
                "/api/notifications/unread-count",
                Some(user),
            ))
            .await
            .expect("response");
        assert_eq!(json_body(response).await["data"]["count"], 0);

        let response = app
            .oneshot(request(
                Method::DELETE,
                &format!("/api/notifications/{}", record.id),
                Some(user),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.inbox(user).len(), 1);
    }

    #[tokio::test]
    async fn test_event_intake_accepts_immediately() {
        let (app, _) = app();
        let payload = serde_json::json!({
            "payload": {
                "type": "project_update",
                "project_id": ProjectId::new(),
                "message": "Site visit moved to Friday",
            }
        });
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/events")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(UserId::new(), SECRET, 600)),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(json_body(response).await["data"]["event_id"].is_string());
    }

    #[tokio::test]
    async fn test_reminder_trigger_is_unavailable_without_secret() {
        let (app, _) = app();
        let response = app
            .oneshot(request(Method::POST, "/api/internal/reminders/daily-logs", None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_reminder_trigger_checks_secret() {
        let mut config = AppConfig {
            auth: auth_config(),
            ..AppConfig::default()
        };
        config.reminders.trigger_secret = "cron-secret".to_string();
        let (app, _) = app_with(config);

        let wrong = Request::builder()
            .method(Method::POST)
            .uri("/api/internal/reminders/daily-logs")
            .header("x-cron-secret", "guess")
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(wrong).await.expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let right = Request::builder()
            .method(Method::POST)
            .uri("/api/internal/reminders/daily-logs")
            .header("x-cron-secret", "cron-secret")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(right).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["projects_scanned"], 0);
        assert_eq!(body["data"]["reminders_sent"], 0);
    }
}
