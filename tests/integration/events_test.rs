//! Publishing domain events and reading the resulting inboxes.

use reqwest::{Method, StatusCode};

use crate::helpers::{SECRET, Studio, TestApp, token_for};

#[tokio::test]
async fn test_comment_reaches_uploader_owner_and_mentioned_once() {
    let app = TestApp::spawn().await;
    let studio = Studio::seed(&app.store, "Lakeside Villa");
    let token = token_for(studio.commenter.id, SECRET, 600);

    let response = app
        .request(
            Method::POST,
            "/api/events",
            Some(studio.comment_payload("@dev can you confirm the sill height? @dev")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert!(response.body["data"]["event_id"].is_string());

    for user in [&studio.uploader, &studio.owner, &studio.mentioned] {
        let inbox = app.wait_for_inbox(user.id, 1).await;
        assert_eq!(inbox.len(), 1, "{} should hold exactly one record", user.display_name);
        assert_eq!(inbox[0].project_id, Some(studio.project.id));
    }
    assert!(app.store.inbox(studio.commenter.id).is_empty());
    assert!(app.store.inbox(studio.bystander.id).is_empty());

    let uploader = app.store.inbox(studio.uploader.id).remove(0);
    assert_eq!(uploader.title, "New comment on Kitchen elevation v3");
    let mentioned = app.store.inbox(studio.mentioned.id).remove(0);
    assert_eq!(mentioned.title, "Asha Rao mentioned you");
}

#[tokio::test]
async fn test_project_update_reaches_every_member_but_the_actor() {
    let app = TestApp::spawn().await;
    let studio = Studio::seed(&app.store, "Hilltop Cafe");
    let token = token_for(studio.owner.id, SECRET, 600);

    let response = app
        .request(
            Method::POST,
            "/api/events",
            Some(serde_json::json!({
                "payload": {
                    "type": "project_update",
                    "project_id": studio.project.id,
                    "message": "Site visit moved to Friday",
                }
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    for user in [
        &studio.commenter,
        &studio.uploader,
        &studio.mentioned,
        &studio.bystander,
    ] {
        assert_eq!(app.wait_for_inbox(user.id, 1).await.len(), 1);
    }
    assert!(app.store.inbox(studio.owner.id).is_empty());
}

#[tokio::test]
async fn test_publishing_requires_a_valid_token() {
    let app = TestApp::spawn().await;
    let studio = Studio::seed(&app.store, "Harbour Loft");

    let anonymous = app
        .request(Method::POST, "/api/events", Some(studio.comment_payload("hi")), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["error"], "UNAUTHORIZED");

    let forged = token_for(studio.commenter.id, "some-other-secret", 600);
    let rejected = app
        .request(
            Method::POST,
            "/api/events",
            Some(studio.comment_payload("hi")),
            Some(&forged),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.notification_count(), 0);
}

#[tokio::test]
async fn test_inbox_routes_serve_only_the_callers_records() {
    let app = TestApp::spawn().await;
    let studio = Studio::seed(&app.store, "Garden Studio");
    let commenter = token_for(studio.commenter.id, SECRET, 600);
    let mentioned = token_for(studio.mentioned.id, SECRET, 600);
    let uploader = token_for(studio.uploader.id, SECRET, 600);

    app.request(
        Method::POST,
        "/api/events",
        Some(studio.comment_payload("@dev please check")),
        Some(&commenter),
    )
    .await;
    let record = app.wait_for_inbox(studio.mentioned.id, 1).await.remove(0);
    app.wait_for_inbox(studio.uploader.id, 1).await;

    let listed = app
        .request(Method::GET, "/api/notifications", None, Some(&mentioned))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    let items = listed.body["data"].as_array().expect("array").clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], record.id.to_string());
    let link = items[0]["link"].as_str().expect("deep link");
    assert!(link.starts_with(&format!("/projects/{}/", studio.project.id)));

    // Another user cannot touch the record.
    let foreign = app
        .request(
            Method::POST,
            &format!("/api/notifications/{}/read", record.id),
            None,
            Some(&uploader),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let marked = app
        .request(
            Method::POST,
            &format!("/api/notifications/{}/read", record.id),
            None,
            Some(&mentioned),
        )
        .await;
    assert_eq!(marked.status, StatusCode::NO_CONTENT);

    let count = app
        .request(
            Method::GET,
            "/api/notifications/unread-count",
            None,
            Some(&mentioned),
        )
        .await;
    assert_eq!(count.body["data"]["count"], 0);
    assert!(app.store.inbox(studio.uploader.id)[0].is_unread());
}
