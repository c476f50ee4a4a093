//! In-process audio focus registry.
//!
//! Desktop platforms have no system-wide audio focus, so producers inside one
//! process arbitrate among themselves. The registry keeps a stack of
//! registrations: the top entry holds focus. A new grant sends `Loss` to the
//! previous holder; when the holder abandons, the next entry gets `Gain`.

use async_trait::async_trait;
use bridge_traits::{
    audio::{AudioSystem, FocusChange, FocusChangeListener, FocusGrant},
    error::Result,
};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

struct Registration {
    client: u64,
    listener: Arc<dyn FocusChangeListener>,
}

struct RegistryState {
    stack: Vec<Registration>,
    next_client: u64,
    volume: f32,
    deny_requests: bool,
}

/// Shared focus arbiter for every producer in the process.
#[derive(Clone)]
pub struct FocusRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryState {
                stack: Vec::new(),
                next_client: 0,
                volume: 1.0,
                deny_requests: false,
            })),
        }
    }

    /// Process-wide registry used when no audio system is configured.
    pub fn global() -> &'static FocusRegistry {
        static GLOBAL: OnceLock<FocusRegistry> = OnceLock::new();
        GLOBAL.get_or_init(FocusRegistry::new)
    }

    /// A new producer handle. Each handle holds at most one registration.
    pub fn client(&self) -> FocusClient {
        let id = {
            let mut state = self.inner.lock();
            state.next_client += 1;
            state.next_client
        };
        FocusClient {
            id,
            registry: self.clone(),
        }
    }

    /// Refuse every request until cleared, like a platform in a phone call.
    pub fn set_deny_requests(&self, deny: bool) {
        self.inner.lock().deny_requests = deny;
    }

    /// Client id currently holding focus.
    pub fn holder(&self) -> Option<u64> {
        self.inner.lock().stack.last().map(|r| r.client)
    }

    pub fn registration_count(&self) -> usize {
        self.inner.lock().stack.len()
    }

    /// Shared output volume, `0.0..=1.0`.
    pub fn volume(&self) -> f32 {
        self.inner.lock().volume
    }

    fn request(&self, client: u64, listener: Arc<dyn FocusChangeListener>) -> FocusGrant {
        let previous = {
            let mut state = self.inner.lock();
            if state.deny_requests {
                debug!(client, "Focus request denied");
                return FocusGrant::Denied;
            }

            state.stack.retain(|r| r.client != client);
            let previous = state.stack.last().map(|r| Arc::clone(&r.listener));
            state.stack.push(Registration { client, listener });
            previous
        };

        debug!(client, "Focus granted");
        // Notify outside the lock; listeners may call back into the registry.
        if let Some(previous) = previous {
            previous.on_focus_change(FocusChange::Loss);
        }
        FocusGrant::Granted
    }

    fn abandon(&self, client: u64) {
        let next = {
            let mut state = self.inner.lock();
            let Some(index) = state.stack.iter().position(|r| r.client == client) else {
                return;
            };
            let was_holder = index + 1 == state.stack.len();
            state.stack.remove(index);
            if was_holder {
                state.stack.last().map(|r| Arc::clone(&r.listener))
            } else {
                None
            }
        };

        debug!(client, "Focus abandoned");
        if let Some(next) = next {
            next.on_focus_change(FocusChange::Gain);
        }
    }

    fn set_volume(&self, volume: f32) {
        self.inner.lock().volume = volume.clamp(0.0, 1.0);
    }
}

impl Default for FocusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One producer's view of a [`FocusRegistry`].
#[derive(Clone)]
pub struct FocusClient {
    id: u64,
    registry: FocusRegistry,
}

impl FocusClient {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn holds_focus(&self) -> bool {
        self.registry.holder() == Some(self.id)
    }
}

#[async_trait]
impl AudioSystem for FocusClient {
    async fn request_focus(&self, listener: Arc<dyn FocusChangeListener>) -> Result<FocusGrant> {
        Ok(self.registry.request(self.id, listener))
    }

    async fn abandon_focus(&self) -> Result<()> {
        self.registry.abandon(self.id);
        Ok(())
    }

    async fn set_stream_volume(&self, volume: f32) -> Result<()> {
        self.registry.set_volume(volume);
        Ok(())
    }
}
