//! Caller-side access to a server's properties.
//!
//! [`PropertiesAccessor`] is what an editing client holds: it lists
//! properties for display, keeps the last listing per server, and submits
//! edits. Edits are debounced per `(server, key)` so a burst of keystrokes
//! turns into one remote update carrying the final value. After a
//! successful update the listing is re-fetched, so what is displayed is
//! what the daemon confirmed.
//!
//! Outcomes of submitted edits arrive as [`AccessorEvent`]s on
//! [`subscribe`](PropertiesAccessor::subscribe).

mod debounce;
mod panel;

pub use panel::HttpPropertiesApi;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::api::ServerVariable;
use debounce::Debouncer;

/// Why a call to the panel failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessorError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("panel returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected reply: {0}")]
    Decode(String),

    #[error("panel reported failure{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected(Option<String>),

    #[error("panel call timed out after {0:?}")]
    Timeout(Duration),
}

/// The two panel operations the accessor needs.
pub trait PropertiesApi: Send + Sync + 'static {
    fn fetch(
        &self,
        server_id: &str,
    ) -> impl Future<Output = Result<Vec<ServerVariable>, AccessorError>> + Send;

    fn update(
        &self,
        server_id: &str,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), AccessorError>> + Send;
}

/// Result of a submitted edit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccessorEvent {
    /// The update landed and the cached listing was refreshed.
    Saved { server_id: String, key: String },
    Failed { server_id: String, key: String, error: AccessorError },
}

/// Tuning for [`PropertiesAccessor`].
#[derive(Clone, Debug)]
pub struct AccessorConfig {
    /// Quiet period after the last edit of a key before it is sent.
    pub debounce: Duration,
    /// Extra attempts after a failed listing.
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

struct Inner<A> {
    api: A,
    config: AccessorConfig,
    debounce: Debouncer<(String, String)>,
    cache: Mutex<HashMap<String, Vec<ServerVariable>>>,
    events: broadcast::Sender<AccessorEvent>,
}

/// Lists and edits server properties through a [`PropertiesApi`].
///
/// Cheap to clone; clones share the cache, the debounce state and the
/// event channel.
pub struct PropertiesAccessor<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for PropertiesAccessor<A> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<A: PropertiesApi> PropertiesAccessor<A> {
    pub fn new(api: A) -> Self {
        Self::with_config(api, AccessorConfig::default())
    }

    pub fn with_config(api: A, config: AccessorConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        let inner = Inner {
            api,
            debounce: Debouncer::new(config.debounce),
            config,
            cache: Mutex::new(HashMap::new()),
            events,
        };
        Self { inner: Arc::new(inner) }
    }

    /// Fetches the listing for `server_id` and caches it.
    ///
    /// Has no side effect on the server; safe to call as often as needed.
    pub async fn fetch_properties(&self, server_id: &str) -> Result<Vec<ServerVariable>, AccessorError> {
        let mut attempt = 0;
        loop {
            match self.inner.api.fetch(server_id).await {
                Ok(vars) => {
                    self.inner.cache.lock().insert(server_id.to_owned(), vars.clone());
                    return Ok(vars);
                }
                Err(e) if attempt < self.inner.config.retries => {
                    attempt += 1;
                    debug!(server = server_id, attempt, "listing failed, retrying: {e}");
                    tokio::time::sleep(self.inner.config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Last listing fetched for `server_id`, if any.
    pub fn cached(&self, server_id: &str) -> Option<Vec<ServerVariable>> {
        self.inner.cache.lock().get(server_id).cloned()
    }

    pub fn invalidate(&self, server_id: &str) {
        self.inner.cache.lock().remove(server_id);
    }

    /// Drops the cached listing and fetches a fresh one.
    pub async fn refresh(&self, server_id: &str) -> Result<Vec<ServerVariable>, AccessorError> {
        self.invalidate(server_id);
        self.fetch_properties(server_id).await
    }

    /// Schedules `key = value` for `server_id`.
    ///
    /// Another call for the same server and key within the debounce window
    /// replaces this one; only the last value is sent. Different keys are
    /// debounced independently. Must be called from within a tokio runtime.
    pub fn submit_update(&self, server_id: &str, key: &str, value: &str) {
        let slot = (server_id.to_owned(), key.to_owned());
        let generation = self.inner.debounce.arm(slot.clone());
        let this = self.clone();
        let value = value.to_owned();

        tokio::spawn(async move {
            tokio::time::sleep(this.inner.debounce.window()).await;
            if !this.inner.debounce.claim(&slot, generation) {
                return;
            }
            let (server_id, key) = slot;
            let event = this.send_update(server_id, key, value).await;
            // No subscribers is fine.
            let _ = this.inner.events.send(event);
        });
    }

    /// Edits scheduled and not yet sent.
    pub fn pending(&self) -> usize {
        self.inner.debounce.pending()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AccessorEvent> {
        self.inner.events.subscribe()
    }

    async fn send_update(&self, server_id: String, key: String, value: String) -> AccessorEvent {
        if let Err(error) = self.inner.api.update(&server_id, &key, &value).await {
            warn!(server = %server_id, key = %key, "property update failed: {error}");
            return AccessorEvent::Failed { server_id, key, error };
        }
        if let Err(e) = self.refresh(&server_id).await {
            warn!(server = %server_id, "refresh after update failed: {e}");
        }
        AccessorEvent::Saved { server_id, key }
    }
}
