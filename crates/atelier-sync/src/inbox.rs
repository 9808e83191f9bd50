//! Access to the server's inbox API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use atelier_core::types::id::NotificationId;
use atelier_entity::notification::NotificationRecord;

use crate::error::SyncError;

/// The inbox operations the engine needs, authenticated per call.
#[async_trait]
pub trait InboxClient: Send + Sync {
    /// The most recent `limit` records, newest first.
    async fn fetch_recent(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<NotificationRecord>, SyncError>;

    /// Mark one record read.
    async fn mark_read(&self, token: &str, id: NotificationId) -> Result<(), SyncError>;

    /// Mark every record read; returns how many changed.
    async fn mark_all_read(&self, token: &str) -> Result<u64, SyncError>;

    /// Delete one record.
    async fn delete(&self, token: &str, id: NotificationId) -> Result<(), SyncError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Count {
    count: u64,
}

/// [`InboxClient`] over the `/api/notifications` routes.
#[derive(Debug, Clone)]
pub struct HttpInboxClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInboxClient {
    /// Build a client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to build inbox client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/notifications{path}", self.base_url)
    }

    async fn check(response: Response) -> Result<Response, SyncError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SyncError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn data<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
        let envelope: Envelope<T> = Self::check(response).await?.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl InboxClient for HttpInboxClient {
    async fn fetch_recent(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<NotificationRecord>, SyncError> {
        let response = self
            .client
            .get(self.url(&format!("?limit={limit}")))
            .bearer_auth(token)
            .send()
            .await?;
        let records: Vec<NotificationRecord> = Self::data(response).await?;
        debug!(count = records.len(), "Fetched inbox");
        Ok(records)
    }

    async fn mark_read(&self, token: &str, id: NotificationId) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.url(&format!("/{id}/read")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn mark_all_read(&self, token: &str) -> Result<u64, SyncError> {
        let response = self
            .client
            .post(self.url("/read-all"))
            .bearer_auth(token)
            .send()
            .await?;
        let count: Count = Self::data(response).await?;
        Ok(count.count)
    }

    async fn delete(&self, token: &str, id: NotificationId) -> Result<(), SyncError> {
        let response = self
            .client
            .delete(self.url(&format!("/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::cache::tests::record;

    fn client(server: &MockServer) -> HttpInboxClient {
        HttpInboxClient::new(server.uri(), Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_and_limit() {
        let server = MockServer::start().await;
        let newest = record(2, false);
        let older = record(1, true);
        let mut first = serde_json::to_value(&newest).expect("serialize");
        first["link"] = json!(null);

        Mock::given(method("GET"))
            .and(path("/api/notifications"))
            .and(query_param("limit", "20"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [first, older],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let records = client(&server)
            .fetch_recent("token-1", 20)
            .await
            .expect("fetch");
        assert_eq!(records, vec![newest, older]);
    }

    #[tokio::test]
    async fn test_unauthorized_is_distinguished() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_recent("expired", 20)
            .await
            .expect_err("401");
        assert_eq!(err, SyncError::Unauthorized);
    }

    #[tokio::test]
    async fn test_server_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/notifications/read-all"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server)
            .mark_all_read("token")
            .await
            .expect_err("503");
        assert_eq!(
            err,
            SyncError::Server {
                status: 503,
                message: "maintenance".to_string()
            }
        );
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_mark_read_and_delete_hit_record_routes() {
        let server = MockServer::start().await;
        let target = record(1, false);

        Mock::given(method("POST"))
            .and(path(format!("/api/notifications/{}/read", target.id)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/notifications/{}", target.id)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client.mark_read("token", target.id).await.expect("mark read");
        client.delete("token", target.id).await.expect("delete");
    }
}
