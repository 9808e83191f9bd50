//! The caller's own inbox: list, count, mark read, delete.

use std::sync::Arc;

use tracing::info;

use atelier_core::config::InboxConfig;
use atelier_core::error::AppError;
use atelier_core::result::AppResult;
use atelier_core::types::id::NotificationId;
use atelier_database::store::NotificationStore;
use atelier_entity::notification::NotificationRecord;

use crate::context::RequestContext;

/// Serves inbox reads and recipient-initiated mutations.
#[derive(Debug, Clone)]
pub struct InboxService {
    store: Arc<dyn NotificationStore>,
    config: InboxConfig,
}

impl InboxService {
    /// Creates a new inbox service.
    pub fn new(store: Arc<dyn NotificationStore>, config: InboxConfig) -> Self {
        Self { store, config }
    }

    /// The most recent notifications, newest first.
    ///
    /// `limit` defaults to the configured page size and is clamped to the
    /// configured maximum.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        limit: Option<u32>,
    ) -> AppResult<Vec<NotificationRecord>> {
        let limit = limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit.max(1));
        self.store.list_recent(ctx.user_id, limit).await
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.store.count_unread(ctx.user_id).await
    }

    /// Marks one notification as read. Already-read notifications succeed.
    pub async fn mark_read(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        if self.store.mark_read(ctx.user_id, id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Notification {id} not found")))
        }
    }

    /// Marks every notification of the caller as read.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let updated = self.store.mark_all_read(ctx.user_id).await?;
        info!(user_id = %ctx.user_id, updated, "Marked all notifications read");
        Ok(updated)
    }

    /// Deletes one notification.
    pub async fn delete(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        if self.store.delete(ctx.user_id, id).await? {
            info!(user_id = %ctx.user_id, notification_id = %id, "Deleted notification");
            Ok(())
        } else {
            Err(AppError::not_found(format!("Notification {id} not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use atelier_core::types::id::UserId;
    use atelier_database::MemoryStore;
    use atelier_entity::notification::{NewNotification, NotificationType};

    use super::*;

    async fn service_with(count: usize) -> (InboxService, MemoryStore, RequestContext) {
        let store = MemoryStore::new();
        let ctx = RequestContext::for_user(UserId::new());
        for i in 0..count {
            store
                .create(NewNotification {
                    user_id: ctx.user_id,
                    title: format!("n{i}"),
                    message: "body".to_string(),
                    notification_type: NotificationType::General,
                    project_id: None,
                    related_entity_id: None,
                    related_entity_kind: None,
                })
                .await
                .expect("create");
        }
        let config = InboxConfig {
            default_limit: 2,
            max_limit: 3,
            ..InboxConfig::default()
        };
        (InboxService::new(Arc::new(store.clone()), config), store, ctx)
    }

    #[tokio::test]
    async fn test_list_applies_default_and_max_limit() {
        let (service, _, ctx) = service_with(5).await;
        assert_eq!(service.list(&ctx, None).await.expect("list").len(), 2);
        assert_eq!(service.list(&ctx, Some(50)).await.expect("list").len(), 3);
        assert_eq!(service.list(&ctx, Some(0)).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_twice_succeeds() {
        let (service, store, ctx) = service_with(1).await;
        let id = store.inbox(ctx.user_id)[0].id;
        service.mark_read(&ctx, id).await.expect("first");
        service.mark_read(&ctx, id).await.expect("second");
        assert_eq!(service.unread_count(&ctx).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_other_users_records_are_not_found() {
        let (service, store, owner) = service_with(1).await;
        let id = store.inbox(owner.user_id)[0].id;
        let stranger = RequestContext::for_user(UserId::new());

        let err = service.mark_read(&stranger, id).await.expect_err("foreign");
        assert!(err.is_not_found());
        let err = service.delete(&stranger, id).await.expect_err("foreign");
        assert!(err.is_not_found());
        assert_eq!(store.inbox(owner.user_id).len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (service, store, ctx) = service_with(2).await;
        let id = store.inbox(ctx.user_id)[0].id;
        service.delete(&ctx, id).await.expect("delete");
        assert_eq!(store.inbox(ctx.user_id).len(), 1);
    }
}
