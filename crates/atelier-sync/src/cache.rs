//! The session's local copy of the most recent notifications.

use std::collections::HashSet;

use atelier_core::types::id::NotificationId;
use atelier_entity::notification::NotificationRecord;

use crate::fingerprint::Fingerprint;

/// Result of applying a fetch to the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheUpdate {
    /// Same ids and read flags as before; nothing replaced.
    Unchanged,
    /// The cache was replaced.
    Changed {
        /// The most recent record that is new by id and unread, if any.
        alert: Option<NotificationRecord>,
    },
}

impl CacheUpdate {
    /// Whether the cached records were replaced.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Bounded, newest-first notification cache.
#[derive(Debug, Clone)]
pub struct NotificationCache {
    records: Vec<NotificationRecord>,
    fingerprint: Option<Fingerprint>,
    capacity: usize,
}

impl NotificationCache {
    /// An empty cache holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            fingerprint: None,
            capacity: capacity.max(1),
        }
    }

    /// Compare a fetch against the cache and replace it when different.
    pub fn apply(&mut self, mut fetched: Vec<NotificationRecord>) -> CacheUpdate {
        fetched.truncate(self.capacity);
        let fingerprint = Fingerprint::of(&fetched);

        if self.fingerprint.as_ref() == Some(&fingerprint) {
            return CacheUpdate::Unchanged;
        }

        let known: HashSet<NotificationId> = self.records.iter().map(|r| r.id).collect();
        let alert = fetched
            .iter()
            .filter(|r| r.is_unread() && !known.contains(&r.id))
            .max_by_key(|r| r.created_at)
            .cloned();

        self.replace(fetched, fingerprint);
        CacheUpdate::Changed { alert }
    }

    fn replace(&mut self, records: Vec<NotificationRecord>, fingerprint: Fingerprint) {
        self.records = records;
        self.fingerprint = Some(fingerprint);
    }

    fn refingerprint(&mut self) {
        self.fingerprint = Some(Fingerprint::of(&self.records));
    }

    /// Cached records, newest first.
    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    /// The current fingerprint; `None` before the first fetch.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Unread records among the cached ones.
    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_unread()).count()
    }

    /// Mark one cached record read. Returns whether anything changed.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if record.is_read {
            return false;
        }
        record.is_read = true;
        self.refingerprint();
        true
    }

    /// Mark every cached record read. Returns how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for record in self.records.iter_mut().filter(|r| r.is_unread()) {
            record.is_read = true;
            changed += 1;
        }
        if changed > 0 {
            self.refingerprint();
        }
        changed
    }

    /// Drop one cached record. Returns whether it was present.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.refingerprint();
        }
        removed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use atelier_core::types::id::UserId;
    use atelier_entity::notification::{NewNotification, NotificationType};

    use super::*;

    /// A record created `minute` minutes past a fixed epoch.
    pub(crate) fn record(minute: i64, is_read: bool) -> NotificationRecord {
        let created = Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
            + Duration::minutes(minute);
        let mut record = NewNotification {
            user_id: UserId::new(),
            title: format!("notification {minute}"),
            message: "body".to_string(),
            notification_type: NotificationType::General,
            project_id: None,
            related_entity_id: None,
            related_entity_kind: None,
        }
        .into_record(created);
        record.is_read = is_read;
        record
    }

    #[test]
    fn test_first_fetch_treats_every_record_as_new() {
        let read = record(1, true);
        let older = record(2, false);
        let newest = record(3, false);
        let mut cache = NotificationCache::new(20);

        let update = cache.apply(vec![newest.clone(), older, read]);
        assert_eq!(
            update,
            CacheUpdate::Changed {
                alert: Some(newest)
            }
        );
        assert_eq!(cache.unread_count(), 2);
    }

    #[test]
    fn test_first_fetch_of_empty_inbox_is_a_change_without_alert() {
        let mut cache = NotificationCache::new(20);
        assert_eq!(cache.apply(Vec::new()), CacheUpdate::Changed { alert: None });
        assert!(cache.fingerprint().is_some());
        assert_eq!(cache.apply(Vec::new()), CacheUpdate::Unchanged);
    }

    #[test]
    fn test_same_records_in_any_order_are_unchanged() {
        let one = record(1, false);
        let two = record(2, true);
        let mut cache = NotificationCache::new(20);
        cache.apply(vec![two.clone(), one.clone()]);

        assert_eq!(cache.apply(vec![one, two]), CacheUpdate::Unchanged);
    }

    #[test]
    fn test_new_unread_record_alerts_once() {
        let one = record(1, false);
        let two = record(2, true);
        let three = record(3, false);
        let mut cache = NotificationCache::new(20);
        cache.apply(vec![one.clone(), two.clone()]);

        let update = cache.apply(vec![three.clone(), one, two]);
        assert_eq!(
            update,
            CacheUpdate::Changed {
                alert: Some(three)
            }
        );
        assert_eq!(cache.unread_count(), 2);
    }

    #[test]
    fn test_only_most_recent_new_record_alerts() {
        let old = record(1, true);
        let mut cache = NotificationCache::new(20);
        cache.apply(vec![old.clone()]);

        let newer = record(5, false);
        let newest = record(9, false);
        let already_read = record(10, true);
        let update = cache.apply(vec![already_read, newest.clone(), newer, old]);
        assert_eq!(
            update,
            CacheUpdate::Changed {
                alert: Some(newest)
            }
        );
    }

    #[test]
    fn test_read_flag_change_replaces_without_alert() {
        let one = record(1, false);
        let mut cache = NotificationCache::new(20);
        cache.apply(vec![one.clone()]);

        let mut read = one;
        read.is_read = true;
        assert_eq!(
            cache.apply(vec![read]),
            CacheUpdate::Changed { alert: None }
        );
        assert_eq!(cache.unread_count(), 0);
    }

    #[test]
    fn test_local_mutations_recompute_fingerprint() {
        let one = record(1, false);
        let two = record(2, false);
        let mut cache = NotificationCache::new(20);
        cache.apply(vec![two.clone(), one.clone()]);
        let before = cache.fingerprint().cloned();

        assert!(cache.mark_read(one.id));
        assert!(!cache.mark_read(one.id));
        assert_ne!(cache.fingerprint().cloned(), before);
        let after_first = cache.fingerprint().cloned();

        // Server state matching the local change reads as unchanged.
        let mut server_one = one.clone();
        server_one.is_read = true;
        assert_eq!(
            cache.apply(vec![two.clone(), server_one]),
            CacheUpdate::Unchanged
        );
        assert_eq!(cache.fingerprint().cloned(), after_first);

        assert_eq!(cache.mark_all_read(), 1);
        assert!(cache.remove(two.id));
        assert!(!cache.remove(two.id));
        assert_eq!(cache.records().len(), 1);
    }

    #[test]
    fn test_marking_read_twice_is_idempotent() {
        let one = record(1, false);
        let two = record(2, false);
        let mut cache = NotificationCache::new(20);
        cache.apply(vec![two, one.clone()]);

        assert!(cache.mark_read(one.id));
        let after_first = cache.fingerprint().cloned();
        assert!(!cache.mark_read(one.id));
        assert_eq!(cache.fingerprint().cloned(), after_first);
        assert_eq!(cache.unread_count(), 1);
    }

    #[test]
    fn test_capacity_bounds_cache() {
        let mut cache = NotificationCache::new(2);
        cache.apply(vec![record(3, false), record(2, false), record(1, false)]);
        assert_eq!(cache.records().len(), 2);
    }
}
