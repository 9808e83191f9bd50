//! # atelier-sync
//!
//! Keeps a dashboard session's notification inbox in step with the server.
//!
//! One [`SyncEngine`] runs per session. It polls the inbox API on an
//! adaptive cadence, compares each fetch against the cached fingerprint,
//! keeps the access credential fresh, and plays at most one alert for a
//! newly arrived unread notification. Session-scoped state lives in a
//! [`SessionContext`] handed to the engine at construction.

pub mod audio;
pub mod cache;
pub mod cadence;
pub mod credential;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod inbox;
pub mod session;

pub use audio::{AlertOutcome, AudioBackend, AudioContext, AudioGate, AudioState, NativeNotifier};
pub use cache::{CacheUpdate, NotificationCache};
pub use cadence::Cadence;
pub use credential::{Credential, CredentialManager, CredentialState, TokenSource};
pub use engine::{PollOutcome, SyncEngine, SyncPhase, SyncSnapshot};
pub use error::SyncError;
pub use fingerprint::Fingerprint;
pub use inbox::{HttpInboxClient, InboxClient};
pub use session::{MemorySessionStorage, SessionContext, SessionStorage};
