//! Order-independent digest of an inbox's (id, read flag) pairs.

use std::fmt;

use sha2::{Digest, Sha256};

use atelier_core::types::id::NotificationId;
use atelier_entity::notification::NotificationRecord;

/// Compact summary of an inbox used to detect change without comparing
/// payloads. Only ids and read flags contribute; titles and timestamps
/// never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a fetched or cached page of records.
    pub fn of(records: &[NotificationRecord]) -> Self {
        Self::from_pairs(records.iter().map(|r| (r.id, r.is_read)))
    }

    /// Fingerprint raw (id, is_read) pairs in any order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NotificationId, bool)>) -> Self {
        let mut pairs: Vec<(NotificationId, bool)> = pairs.into_iter().collect();
        pairs.sort_unstable();

        let mut hasher = Sha256::new();
        for (id, is_read) in &pairs {
            hasher.update(id.as_uuid().as_bytes());
            hasher.update([u8::from(*is_read)]);
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
