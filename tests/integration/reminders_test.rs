//! The authenticated daily-log reminder trigger.

use chrono::Utc;
use reqwest::{Method, StatusCode};
use uuid::Uuid;

use atelier_core::config::RemindersConfig;
use atelier_entity::project::DailyLog;

use crate::helpers::{Studio, TRIGGER_SECRET, TestApp};

async fn trigger(app: &TestApp, secret: Option<&str>) -> crate::helpers::TestResponse {
    let mut request = reqwest::Client::new().request(
        Method::POST,
        format!("{}/api/internal/reminders/daily-logs", app.base_url),
    );
    if let Some(secret) = secret {
        request = request.header("x-cron-secret", secret);
    }
    let response = request.send().await.expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(serde_json::Value::Null);
    crate::helpers::TestResponse { status, body }
}

#[tokio::test]
async fn test_trigger_rejects_missing_or_wrong_secret() {
    let app = TestApp::spawn().await;
    Studio::seed(&app.store, "Lakeside Villa");

    assert_eq!(trigger(&app, None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        trigger(&app, Some("guess")).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_sweep_reminds_only_projects_without_todays_log() {
    let app = TestApp::spawn().await;
    let quiet = Studio::seed(&app.store, "Lakeside Villa");
    let logged = Studio::seed(&app.store, "Hilltop Cafe");

    let today = Utc::now()
        .with_timezone(&RemindersConfig::default().time_zone())
        .date_naive();
    app.store.insert_daily_log(DailyLog {
        id: Uuid::new_v4(),
        project_id: logged.project.id,
        log_date: today,
        submitted_by: logged.mentioned.id,
        created_at: Utc::now(),
    });

    let response = trigger(&app, Some(TRIGGER_SECRET)).await;
    assert_eq!(response.status, StatusCode::OK);
    let summary = &response.body["data"];
    assert_eq!(summary["projects_scanned"], 2);
    assert_eq!(summary["missing"], 1);
    // The site supervisor and the owner of the quiet project.
    assert_eq!(summary["reminders_sent"], 2);
    assert_eq!(summary["failures"], 0);

    // Reminders are pushed, never written to the inbox.
    assert!(app.store.inbox(quiet.mentioned.id).is_empty());
    assert!(app.store.inbox(quiet.owner.id).is_empty());
}
