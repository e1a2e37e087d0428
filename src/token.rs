//! One-shot change notification for configuration reloads.
//!
//! A [`ReloadToken`] represents one generation of a provider's (or the
//! root's) data. Each reload replaces the token wholesale: the previous
//! token fires its callbacks exactly once and never again, so listeners
//! must re-fetch the current token after every firing. The
//! [`ChangeTokenRegistration`] helper automates that re-fetch loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Callback = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct TokenState {
    fired: AtomicBool,
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Callback)>>,
}

/// A fire-once change token. Cheap to clone; clones observe the same
/// generation.
#[derive(Clone, Default)]
pub struct ReloadToken {
    state: Arc<TokenState>,
}

impl ReloadToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this generation has been invalidated.
    pub fn has_changed(&self) -> bool {
        self.state.fired.load(Ordering::Acquire)
    }

    /// Registers a callback invoked when this token fires. Dropping the
    /// returned guard unregisters it. Registering on an already-fired
    /// token registers nothing.
    pub fn on_change(&self, callback: impl Fn() + Send + Sync + 'static) -> CallbackGuard {
        let mut callbacks = self.state.callbacks.lock().unwrap();
        if self.has_changed() {
            return CallbackGuard::noop();
        }
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        callbacks.push((id, Box::new(callback)));
        CallbackGuard {
            state: Arc::downgrade(&self.state),
            id,
        }
    }

    /// Fires the token. Invokes and drains every registered callback; a
    /// second call is a no-op.
    pub(crate) fn notify(&self) {
        if self.state.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        let callbacks = std::mem::take(&mut *self.state.callbacks.lock().unwrap());
        for (_, callback) in callbacks {
            callback();
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl std::fmt::Debug for ReloadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadToken")
            .field("has_changed", &self.has_changed())
            .finish()
    }
}

impl PartialEq for ReloadToken {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ReloadToken {}

/// Unregisters its callback when dropped.
pub struct CallbackGuard {
    state: Weak<TokenState>,
    id: u64,
}

impl CallbackGuard {
    fn noop() -> Self {
        Self {
            state: Weak::new(),
            id: 0,
        }
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut callbacks = state.callbacks.lock().unwrap();
            callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Holds the current token for one provider or root and rotates it on
/// reload.
#[derive(Default)]
pub struct TokenSource {
    current: Mutex<ReloadToken>,
}

impl TokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token for the current data generation.
    pub fn token(&self) -> ReloadToken {
        self.current.lock().unwrap().clone()
    }

    /// Installs a fresh token and fires the previous one.
    pub fn replace(&self) {
        let previous = {
            let mut current = self.current.lock().unwrap();
            std::mem::replace(&mut *current, ReloadToken::new())
        };
        previous.notify();
    }
}

type TokenProducer = Box<dyn Fn() -> Option<ReloadToken> + Send + Sync>;
type TokenConsumer = Box<dyn Fn() + Send + Sync>;

enum GuardSlot {
    Active(Option<CallbackGuard>),
    Disposed,
}

struct RegistrationState {
    producer: TokenProducer,
    consumer: TokenConsumer,
    guard: Mutex<GuardSlot>,
}

/// A persistent subscription across token generations.
///
/// Fetches the producer's current token, registers on it, and whenever
/// that token fires, invokes the consumer and re-registers against the
/// producer's fresh token. Dropping the registration stops listening.
pub struct ChangeTokenRegistration {
    state: Arc<RegistrationState>,
}

impl ChangeTokenRegistration {
    pub fn new(
        producer: impl Fn() -> Option<ReloadToken> + Send + Sync + 'static,
        consumer: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let state = Arc::new(RegistrationState {
            producer: Box::new(producer),
            consumer: Box::new(consumer),
            guard: Mutex::new(GuardSlot::Active(None)),
        });
        Self::subscribe(&state);
        Self { state }
    }

    fn subscribe(state: &Arc<RegistrationState>) {
        loop {
            let Some(token) = (state.producer)() else {
                return;
            };

            let weak = Arc::downgrade(state);
            let guard = token.on_change(move || {
                if let Some(state) = weak.upgrade() {
                    (state.consumer)();
                    Self::subscribe(&state);
                }
            });

            {
                let mut slot = state.guard.lock().unwrap();
                match &mut *slot {
                    // Disposed while we were registering; the dropped
                    // guard unregisters the callback.
                    GuardSlot::Disposed => return,
                    GuardSlot::Active(current) => *current = Some(guard),
                }
            }

            // The token fired between production and registration: treat
            // it as a change and chase the fresh token.
            if token.has_changed() {
                (state.consumer)();
                continue;
            }

            return;
        }
    }
}

impl Drop for ChangeTokenRegistration {
    fn drop(&mut self) {
        let mut slot = self.state.guard.lock().unwrap();
        *slot = GuardSlot::Disposed;
    }
}
