//! Alert playback gating.
//!
//! Mobile platforms refuse to play sound until a user gesture has unlocked
//! an audio context. The gate holds a single context per session, created on
//! the first unlock and reused for every alert after that. When sound is
//! unavailable the gate tries a native notification, then does nothing.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// Lifecycle state reported by an audio context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    /// Ready to play.
    Running,
    /// Paused by the platform; needs `resume`.
    Suspended,
    /// Unusable; a new context is required.
    Closed,
}

/// A platform audio context.
pub trait AudioContext: Send {
    /// Current state.
    fn state(&self) -> AudioState;
    /// Try to leave the suspended state. Returns the state afterwards.
    fn resume(&mut self) -> AudioState;
    /// Play the alert chime. Returns whether playback started.
    fn play_chime(&mut self) -> bool;
    /// Release platform resources.
    fn close(&mut self) {}
}

/// Creates audio contexts.
pub trait AudioBackend: Send + Sync {
    /// A new context, or `None` when the platform has no audio.
    fn create_context(&self) -> Option<Box<dyn AudioContext>>;
}

/// The platform's native notification capability.
pub trait NativeNotifier: Send + Sync {
    /// Whether the user granted permission.
    fn is_authorized(&self) -> bool;
    /// Show a notification. Returns whether it was shown.
    fn notify(&self, title: &str, body: &str) -> bool;
}

/// What an alert attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// The chime played.
    Played,
    /// Sound was unavailable; a native notification was shown.
    Native,
    /// Nothing was available; the alert was dropped.
    Silent,
    /// This record's alert already played in this session.
    AlreadyPlayed,
}

/// Session-scoped owner of the audio context.
pub struct AudioGate {
    backend: Option<Arc<dyn AudioBackend>>,
    native: Option<Arc<dyn NativeNotifier>>,
    unlocked: bool,
    context: Option<Box<dyn AudioContext>>,
}

impl fmt::Debug for AudioGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioGate")
            .field("has_backend", &self.backend.is_some())
            .field("has_native", &self.native.is_some())
            .field("unlocked", &self.unlocked)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

impl AudioGate {
    /// A gate over the given capabilities. Either may be absent.
    pub fn new(
        backend: Option<Arc<dyn AudioBackend>>,
        native: Option<Arc<dyn NativeNotifier>>,
    ) -> Self {
        Self {
            backend,
            native,
            unlocked: false,
            context: None,
        }
    }

    /// A gate with no capabilities; every alert is silent.
    pub fn silent() -> Self {
        Self::new(None, None)
    }

    /// Called from a user gesture. Acquires the context if needed.
    pub fn unlock(&mut self) {
        self.unlocked = true;
        if let Some(context) = self.acquire() {
            if context.state() == AudioState::Suspended {
                context.resume();
            }
        }
    }

    /// Whether a user gesture has unlocked playback.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Whether a context is currently held.
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    fn acquire(&mut self) -> Option<&mut (dyn AudioContext + 'static)> {
        if !self.unlocked {
            return None;
        }
        if self
            .context
            .as_ref()
            .is_some_and(|c| c.state() == AudioState::Closed)
        {
            self.context = None;
        }
        if self.context.is_none() {
            self.context = self.backend.as_ref().and_then(|b| b.create_context());
        }
        self.context.as_deref_mut()
    }

    /// Play an alert, falling back to a native notification, then silence.
    pub fn alert(&mut self, title: &str, body: &str) -> AlertOutcome {
        if let Some(context) = self.acquire() {
            if context.state() == AudioState::Suspended {
                context.resume();
            }
            if context.state() == AudioState::Running && context.play_chime() {
                return AlertOutcome::Played;
            }
        }

        if let Some(native) = self.native.as_ref().filter(|n| n.is_authorized()) {
            if native.notify(title, body) {
                return AlertOutcome::Native;
            }
        }

        debug!("No audio or native notification available, alert dropped");
        AlertOutcome::Silent
    }

    /// Close and drop the context. Playback needs a new gesture afterwards.
    pub fn release(&mut self) {
        if let Some(mut context) = self.context.take() {
            context.close();
        }
        self.unlocked = false;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct Counters {
        pub(crate) created: AtomicUsize,
        pub(crate) resumed: AtomicUsize,
        pub(crate) played: AtomicUsize,
        pub(crate) closed: AtomicUsize,
    }

    struct FakeContext {
        state: AudioState,
        counters: Arc<Counters>,
    }

    impl AudioContext for FakeContext {
        fn state(&self) -> AudioState {
            self.state
        }

        fn resume(&mut self) -> AudioState {
            self.counters.resumed.fetch_add(1, Ordering::SeqCst);
            self.state = AudioState::Running;
            self.state
        }

        fn play_chime(&mut self) -> bool {
            self.counters.played.fetch_add(1, Ordering::SeqCst);
            true
        }

        fn close(&mut self) {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            self.state = AudioState::Closed;
        }
    }

    /// Hands out contexts that start in `initial`.
    pub(crate) struct FakeBackend {
        pub(crate) counters: Arc<Counters>,
        pub(crate) initial: AudioState,
        pub(crate) available: bool,
    }

    impl FakeBackend {
        pub(crate) fn running() -> Self {
            Self {
                counters: Arc::new(Counters::default()),
                initial: AudioState::Running,
                available: true,
            }
        }
    }

    impl AudioBackend for FakeBackend {
        fn create_context(&self) -> Option<Box<dyn AudioContext>> {
            if !self.available {
                return None;
            }
            self.counters.created.fetch_add(1, Ordering::SeqCst);
            Some(Box::new(FakeContext {
                state: self.initial,
                counters: self.counters.clone(),
            }))
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeNative {
        pub(crate) authorized: bool,
        pub(crate) shown: Mutex<Vec<String>>,
    }

    impl NativeNotifier for FakeNative {
        fn is_authorized(&self) -> bool {
            self.authorized
        }

        fn notify(&self, title: &str, _body: &str) -> bool {
            self.shown
                .lock()
                .expect("native log")
                .push(title.to_string());
            true
        }
    }

    #[test]
    fn test_context_created_once_and_reused() {
        let backend = Arc::new(FakeBackend::running());
        let counters = backend.counters.clone();
        let mut gate = AudioGate::new(Some(backend), None);

        gate.unlock();
        assert_eq!(gate.alert("a", "b"), AlertOutcome::Played);
        assert_eq!(gate.alert("c", "d"), AlertOutcome::Played);
        assert_eq!(counters.created.load(Ordering::SeqCst), 1);
        assert_eq!(counters.played.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_context_before_gesture() {
        let backend = Arc::new(FakeBackend::running());
        let counters = backend.counters.clone();
        let native = Arc::new(FakeNative {
            authorized: true,
            ..FakeNative::default()
        });
        let mut gate = AudioGate::new(Some(backend), Some(native.clone()));

        assert_eq!(gate.alert("New comment", "body"), AlertOutcome::Native);
        assert_eq!(counters.created.load(Ordering::SeqCst), 0);
        assert_eq!(native.shown.lock().expect("log").len(), 1);
    }

    #[test]
    fn test_suspended_context_is_resumed() {
        let backend = Arc::new(FakeBackend {
            initial: AudioState::Suspended,
            ..FakeBackend::running()
        });
        let counters = backend.counters.clone();
        let mut gate = AudioGate::new(Some(backend), None);

        gate.unlock();
        assert_eq!(gate.alert("a", "b"), AlertOutcome::Played);
        assert_eq!(counters.resumed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nothing_available_is_silent() {
        let backend = Arc::new(FakeBackend {
            available: false,
            ..FakeBackend::running()
        });
        let native = Arc::new(FakeNative::default());
        let mut gate = AudioGate::new(Some(backend), Some(native));
        gate.unlock();
        assert_eq!(gate.alert("a", "b"), AlertOutcome::Silent);
        assert_eq!(AudioGate::silent().alert("a", "b"), AlertOutcome::Silent);
    }

    #[test]
    fn test_release_closes_context() {
        let backend = Arc::new(FakeBackend::running());
        let counters = backend.counters.clone();
        let mut gate = AudioGate::new(Some(backend), None);
        gate.unlock();
        gate.release();

        assert!(!gate.has_context());
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
        assert_eq!(gate.alert("a", "b"), AlertOutcome::Silent);
    }
}
