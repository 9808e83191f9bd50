//! Session-scoped state shared by the engine and the hosting UI.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, watch};

use atelier_core::config::SyncConfig;
use atelier_entity::notification::NotificationRecord;

use crate::audio::{AlertOutcome, AudioGate};

/// Key-value storage that lives as long as the browser session.
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value.
    fn set(&self, key: &str, value: &str);
}

/// Process-local session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    values: RwLock<HashMap<String, String>>,
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

/// Everything one dashboard session owns: the audio gate, the last-played
/// marker, and the visibility signal.
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    audio: Mutex<AudioGate>,
    visibility: watch::Sender<bool>,
    sound_key: String,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("sound_key", &self.sound_key)
            .field("visible", &*self.visibility.borrow())
            .finish()
    }
}

impl SessionContext {
    /// A visible session over the given storage and audio gate.
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        audio: AudioGate,
        sound_key: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            audio: Mutex::new(audio),
            visibility: watch::Sender::new(true),
            sound_key: sound_key.into(),
        }
    }

    /// A session with fresh in-memory storage and the default marker key.
    pub fn in_memory(audio: AudioGate) -> Self {
        Self::new(
            Arc::new(MemorySessionStorage::default()),
            audio,
            SyncConfig::default().last_sound_key,
        )
    }

    /// Report whether the hosting tab is visible.
    pub fn set_visible(&self, visible: bool) {
        self.visibility.send_if_modified(|current| {
            let changed = *current != visible;
            *current = visible;
            changed
        });
    }

    /// Whether the hosting tab is visible.
    pub fn is_visible(&self) -> bool {
        *self.visibility.borrow()
    }

    /// Observe visibility changes.
    pub fn watch_visibility(&self) -> watch::Receiver<bool> {
        self.visibility.subscribe()
    }

    /// Forward a user gesture to the audio gate.
    pub async fn unlock_audio(&self) {
        self.audio.lock().await.unlock();
    }

    /// Alert for `record` unless this session already did.
    pub async fn alert_for(&self, record: &NotificationRecord) -> AlertOutcome {
        let id = record.id.to_string();
        if self.storage.get(&self.sound_key).as_deref() == Some(id.as_str()) {
            return AlertOutcome::AlreadyPlayed;
        }
        let outcome = self.audio.lock().await.alert(&record.title, &record.message);
        self.storage.set(&self.sound_key, &id);
        outcome
    }

    /// Id of the last record alerted in this session.
    pub fn last_alerted(&self) -> Option<String> {
        self.storage.get(&self.sound_key)
    }

    /// Release the audio context on teardown.
    pub async fn release(&self) {
        self.audio.lock().await.release();
    }
}
