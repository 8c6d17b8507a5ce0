//! Reading and patching `server.properties` through a [`FileStore`].
//!
//! Reads never fail from the caller's point of view: any remote problem is
//! logged and the caller sees an empty list. Writes validate first, then run
//! one fetch-patch-write cycle and report remote failures as a distinct
//! error. There is no locking across cycles, so two writers racing on the
//! same server can lose one of the updates.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::daemon::{FileStore, RemoteError, ServerRef};
use crate::properties::{PROPERTIES_FILE, PropertiesDocument, PropertyRecord, WritePolicy};

/// Longest accepted key, in characters.
pub const MAX_KEY_LEN: usize = 64;
/// Longest accepted value, in characters.
pub const MAX_VALUE_LEN: usize = 191;

/// A rejected update, reported before any remote call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("key must not be empty")]
    EmptyKey,

    #[error("key is {len} characters long, the limit is {MAX_KEY_LEN}")]
    KeyTooLong { len: usize },

    #[error("value is {len} characters long, the limit is {MAX_VALUE_LEN}")]
    ValueTooLong { len: usize },

    #[error("key must not contain `=` or line breaks")]
    InvalidKey,

    #[error("value must not contain line breaks")]
    InvalidValue,

    #[error("`{field}` is required and must be a string")]
    MissingField { field: &'static str },
}

/// Why an update did not happen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Coarse failure classes reported to HTTP callers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    Validation,
    RemoteUnavailable,
    Timeout,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::RemoteUnavailable => "remote_unavailable",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl UpdateError {
    pub fn kind(&self) -> FailureKind {
        match self {
            UpdateError::Validation(_) => FailureKind::Validation,
            UpdateError::Remote(e) if e.is_timeout() => FailureKind::Timeout,
            UpdateError::Remote(_) => FailureKind::RemoteUnavailable,
        }
    }
}

/// What a successful update touched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UpdateOutcome {
    /// Entries rewritten. Zero when the key is not in the file; the file is
    /// still written back.
    pub updated: usize,
}

/// Checks key and value limits.
pub fn validate(key: &str, value: &str) -> Result<(), ValidationError> {
    let key_len = key.chars().count();
    if key_len == 0 {
        return Err(ValidationError::EmptyKey);
    }
    if key_len > MAX_KEY_LEN {
        return Err(ValidationError::KeyTooLong { len: key_len });
    }
    let value_len = value.chars().count();
    if value_len > MAX_VALUE_LEN {
        return Err(ValidationError::ValueTooLong { len: value_len });
    }
    if key.contains(['=', '\n', '\r']) {
        return Err(ValidationError::InvalidKey);
    }
    if value.contains(['\n', '\r']) {
        return Err(ValidationError::InvalidValue);
    }
    Ok(())
}

/// Properties reader/writer over one file store.
pub struct PropertiesService<S> {
    store: S,
    timeout: Duration,
    policy: WritePolicy,
}

impl<S: FileStore> PropertiesService<S> {
    pub fn new(store: S) -> Self {
        Self { store, timeout: Duration::from_secs(5), policy: WritePolicy::default() }
    }

    /// Sets the bound on each remote read or write.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists the entries of `server.properties` in file order.
    ///
    /// Returns an empty list when the file cannot be fetched.
    pub async fn list_properties(&self, server: &ServerRef) -> Vec<PropertyRecord> {
        match self.fetch(server).await {
            Ok(doc) => doc.records(),
            Err(e) => {
                warn!(server = %server.uuid, node = %server.node, "listing properties failed: {e}");
                Vec::new()
            }
        }
    }

    /// Sets `key` to `value` in `server.properties`.
    ///
    /// Every entry named `key` is rewritten; a missing key is not appended.
    /// The whole file is written back according to the write policy.
    pub async fn update_property(
        &self,
        server: &ServerRef,
        key: &str,
        value: &str,
    ) -> Result<UpdateOutcome, UpdateError> {
        validate(key, value)?;

        let result = async {
            let mut doc = self.fetch(server).await?;
            let updated = doc.set(key, value);
            let content = doc.serialize(self.policy);
            self.bounded(self.store.put_content(server, PROPERTIES_FILE, content)).await?;
            Ok::<_, RemoteError>(UpdateOutcome { updated })
        }
        .await;

        match &result {
            Ok(outcome) => info!(server = %server.uuid, key, updated = outcome.updated, "property updated"),
            Err(e) => warn!(server = %server.uuid, node = %server.node, key, "updating property failed: {e}"),
        }
        result.map_err(UpdateError::from)
    }

    async fn fetch(&self, server: &ServerRef) -> Result<PropertiesDocument, RemoteError> {
        let content = self.bounded(self.store.get_content(server, PROPERTIES_FILE)).await?;
        Ok(PropertiesDocument::parse(&content))
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, RemoteError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    /// In-memory file store keyed by server uuid.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub files: Mutex<HashMap<String, String>>,
        pub writes: AtomicUsize,
        pub fail_reads: bool,
        pub fail_writes: bool,
        pub delay: Option<Duration>,
    }

    impl MemoryStore {
        pub fn with(uuid: &str, content: &str) -> Self {
            let store = Self::default();
            store.files.lock().insert(uuid.to_owned(), content.to_owned());
            store
        }

        pub fn content(&self, uuid: &str) -> Option<String> {
            self.files.lock().get(uuid).cloned()
        }
    }

    impl FileStore for MemoryStore {
        async fn get_content(&self, server: &ServerRef, file: &str) -> Result<String, RemoteError> {
            assert_eq!(file, PROPERTIES_FILE);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_reads {
                return Err(RemoteError::Unavailable("connection refused".into()));
            }
            self.content(&server.uuid).ok_or(RemoteError::Status {
                status: 404,
                message: "file not found".into(),
            })
        }

        async fn put_content(&self, server: &ServerRef, _file: &str, content: String) -> Result<(), RemoteError> {
            if self.fail_writes {
                return Err(RemoteError::Status { status: 500, message: "disk full".into() });
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.files.lock().insert(server.uuid.clone(), content);
            Ok(())
        }
    }

    pub(crate) fn server() -> ServerRef {
        ServerRef { uuid: "uuid-1".into(), node: "node-1".into() }
    }

    fn service(store: MemoryStore) -> PropertiesService<MemoryStore> {
        PropertiesService::new(store)
    }

    #[tokio::test]
    async fn lists_entries_in_order() {
        let svc = service(MemoryStore::with("uuid-1", "a=1\n#comment\n\nb=2"));
        assert_eq!(
            svc.list_properties(&server()).await,
            vec![PropertyRecord::new("a", "1"), PropertyRecord::new("b", "2")],
        );
    }

    #[tokio::test]
    async fn remote_failure_lists_nothing() {
        let svc = service(MemoryStore { fail_reads: true, ..MemoryStore::default() });
        assert!(svc.list_properties(&server()).await.is_empty());

        let missing = service(MemoryStore::default());
        assert!(missing.list_properties(&server()).await.is_empty());
    }

    #[tokio::test]
    async fn update_patches_and_drops_comments() {
        let svc = service(MemoryStore::with("uuid-1", "a=1\n#c\nb=2"));
        let outcome = svc.update_property(&server(), "b", "9").await.unwrap();

        assert_eq!(outcome.updated, 1);
        assert_eq!(svc.store().content("uuid-1").as_deref(), Some("a=1\nb=9"));
    }

    #[tokio::test]
    async fn update_with_preserve_policy_keeps_comments() {
        let svc = service(MemoryStore::with("uuid-1", "a=1\n#c\nb=2"))
            .with_write_policy(WritePolicy::Preserve);
        svc.update_property(&server(), "b", "9").await.unwrap();
        assert_eq!(svc.store().content("uuid-1").as_deref(), Some("a=1\n#c\nb=9"));
    }

    #[tokio::test]
    async fn update_of_missing_key_still_writes_and_succeeds() {
        let svc = service(MemoryStore::with("uuid-1", "a=1\nb=2"));
        let outcome = svc.update_property(&server(), "c", "3").await.unwrap();

        assert_eq!(outcome.updated, 0);
        assert_eq!(svc.store().writes.load(Ordering::SeqCst), 1);
        assert_eq!(svc.store().content("uuid-1").as_deref(), Some("a=1\nb=2"));
    }

    #[tokio::test]
    async fn oversized_input_is_rejected_before_any_remote_call() {
        let svc = service(MemoryStore { fail_reads: true, ..MemoryStore::default() });

        let err = svc.update_property(&server(), &"k".repeat(65), "v").await.unwrap_err();
        assert_eq!(err, UpdateError::Validation(ValidationError::KeyTooLong { len: 65 }));
        assert_eq!(err.kind(), FailureKind::Validation);

        let err = svc.update_property(&server(), "motd", &"v".repeat(192)).await.unwrap_err();
        assert_eq!(err, UpdateError::Validation(ValidationError::ValueTooLong { len: 192 }));
        assert_eq!(svc.store().writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn limits_are_inclusive_and_count_characters() {
        assert!(validate(&"k".repeat(64), &"v".repeat(191)).is_ok());
        assert!(validate("motd", "").is_ok());
        assert!(validate("motd", &"é".repeat(191)).is_ok());
        assert_eq!(validate("", "v"), Err(ValidationError::EmptyKey));
        assert_eq!(validate("a=b", "v"), Err(ValidationError::InvalidKey));
        assert_eq!(validate("motd", "a\nb=c"), Err(ValidationError::InvalidValue));
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let svc = service(MemoryStore { fail_writes: true, ..MemoryStore::with("uuid-1", "a=1") });
        let err = svc.update_property(&server(), "a", "2").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::RemoteUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_daemon_times_out() {
        let store = MemoryStore { delay: Some(Duration::from_secs(30)), ..MemoryStore::with("uuid-1", "a=1") };
        let svc = service(store).with_timeout(Duration::from_secs(2));

        let err = svc.update_property(&server(), "a", "2").await.unwrap_err();
        assert_eq!(err, UpdateError::Remote(RemoteError::Timeout(Duration::from_secs(2))));
        assert_eq!(err.kind(), FailureKind::Timeout);

        assert!(svc.list_properties(&server()).await.is_empty());
    }
}
