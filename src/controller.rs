//! Settings view controller
//!
//! Owns the credentials form: an edit buffer seeded from the store, an explicit
//! save, and the "Refresh model" action. Rendering lives in `cli`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::RefreshBackend;
use crate::core::{CredentialField, CredentialStore, CredentialsDraft, CredentialsRecord};
use crate::notifications::{Notification, Notifier};

/// Whether the refresh action can run, and why not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Ready,
    Busy,
    MissingOpenAiKey,
    MissingCommunity,
}

impl RefreshState {
    pub fn is_ready(&self) -> bool {
        matches!(self, RefreshState::Ready)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            RefreshState::Ready => "ready",
            RefreshState::Busy => "a refresh is already running",
            RefreshState::MissingOpenAiKey => "no OpenAI API key saved",
            RefreshState::MissingCommunity => "no community configured",
        }
    }
}

/// Result of pressing "Refresh model"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The backend accepted the refresh
    Success,
    /// The backend reported a business error
    Rejected(String),
    /// The request or response parsing failed
    Failed,
    /// Preconditions not met; nothing was sent
    Disabled(RefreshState),
}

/// Releases the busy flag when dropped
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SettingsController {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    backend: Arc<dyn RefreshBackend>,
    draft: CredentialsDraft,
    busy: AtomicBool,
}

impl SettingsController {
    /// Create a controller with its buffer seeded from the store
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        backend: Arc<dyn RefreshBackend>,
    ) -> Self {
        let mut controller = Self {
            store,
            notifier,
            backend,
            draft: CredentialsDraft::default(),
            busy: AtomicBool::new(false),
        };
        controller.load_initial_values();
        controller
    }

    /// Seed every buffer field from the persisted record
    pub fn load_initial_values(&mut self) {
        self.draft = CredentialsDraft::from_record(&self.store.read());
    }

    /// Edit one buffer field. The store is untouched until [`Self::save_credentials`].
    pub fn update_field(&mut self, field: CredentialField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn draft(&self) -> &CredentialsDraft {
        &self.draft
    }

    /// The store behind the form
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// The record currently in the store
    pub fn persisted(&self) -> CredentialsRecord {
        self.store.read()
    }

    /// Persist the buffer as the new record, keeping the stored community
    pub fn save_credentials(&mut self) {
        let current = self.store.read();
        let record = self.draft.to_record(&current.community);
        match self.store.write(&record) {
            Ok(()) => tracing::info!("Saved credentials"),
            Err(e) => tracing::error!(error = %e, "Failed to save credentials"),
        }
    }

    /// Throw away unsaved edits
    pub fn discard_changes(&mut self) {
        self.load_initial_values();
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn refresh_state(&self) -> RefreshState {
        if self.is_busy() {
            return RefreshState::Busy;
        }
        let record = self.store.read();
        if !record.has_openai_api_key() {
            RefreshState::MissingOpenAiKey
        } else if !record.has_community() {
            RefreshState::MissingCommunity
        } else {
            RefreshState::Ready
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_state().is_ready()
    }

    /// Send the persisted credentials to the backend and report the result
    pub async fn refresh_model(&self) -> RefreshOutcome {
        let state = self.refresh_state();
        if !state.is_ready() {
            tracing::debug!(reason = state.reason(), "Refresh disabled");
            return RefreshOutcome::Disabled(state);
        }

        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            return RefreshOutcome::Disabled(RefreshState::Busy);
        };

        let credentials = self.store.read();
        match self.backend.refresh(&credentials).await {
            Ok(response) => match response.error {
                Some(error) => {
                    tracing::warn!(error = %error, "Backend rejected refresh");
                    self.notifier
                        .notify(Notification::failure().with_description(error.clone()));
                    RefreshOutcome::Rejected(error)
                }
                None => {
                    tracing::info!("Model refreshed");
                    self.notifier.notify(Notification::success());
                    RefreshOutcome::Success
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Refresh request failed");
                self.notifier.notify(Notification::failure());
                RefreshOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, RefreshResponse};
    use crate::core::MemoryCredentialStore;
    use crate::notifications::{RecordingNotifier, FAILURE_TITLE, SUCCESS_TITLE};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend that replays a scripted answer and records what it was sent
    struct ScriptedBackend {
        answer: fn() -> Result<RefreshResponse, ApiError>,
        seen: Mutex<Vec<CredentialsRecord>>,
    }

    impl ScriptedBackend {
        fn new(answer: fn() -> Result<RefreshResponse, ApiError>) -> Self {
            Self {
                answer,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<CredentialsRecord> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RefreshBackend for ScriptedBackend {
        async fn refresh(
            &self,
            credentials: &CredentialsRecord,
        ) -> Result<RefreshResponse, ApiError> {
            self.seen.lock().unwrap().push(credentials.clone());
            (self.answer)()
        }
    }

    fn ok_empty() -> Result<RefreshResponse, ApiError> {
        Ok(RefreshResponse::default())
    }

    fn ok_bad_key() -> Result<RefreshResponse, ApiError> {
        Ok(RefreshResponse {
            error: Some("bad key".to_string()),
        })
    }

    fn parse_failure() -> Result<RefreshResponse, ApiError> {
        Err(ApiError::Parse("expected value at line 1 column 1".to_string()))
    }

    fn ready_record() -> CredentialsRecord {
        CredentialsRecord {
            openai_api_key: "sk-live".to_string(),
            community: "ouo".to_string(),
            ..Default::default()
        }
    }

    struct Harness {
        store: Arc<MemoryCredentialStore>,
        notifier: Arc<RecordingNotifier>,
        backend: Arc<ScriptedBackend>,
        controller: SettingsController,
    }

    fn harness(record: CredentialsRecord, answer: fn() -> Result<RefreshResponse, ApiError>) -> Harness {
        let store = Arc::new(MemoryCredentialStore::with_record(record));
        let notifier = Arc::new(RecordingNotifier::default());
        let backend = Arc::new(ScriptedBackend::new(answer));
        let controller = SettingsController::new(store.clone(), notifier.clone(), backend.clone());
        Harness {
            store,
            notifier,
            backend,
            controller,
        }
    }

    #[test]
    fn test_initial_values_come_from_store() {
        let record = CredentialsRecord {
            pinecone_index: "book-gpt".to_string(),
            forum_url: "https://meta.discourse.org/".to_string(),
            ..ready_record()
        };
        let h = harness(record, ok_empty);

        assert_eq!(h.controller.draft().openai_api_key, "sk-live");
        assert_eq!(h.controller.draft().pinecone_index, "book-gpt");
        assert_eq!(h.controller.draft().forum_url, "https://meta.discourse.org/");
        assert!(h.controller.draft().discord_api_key.is_empty());
    }

    #[test]
    fn test_discarding_edits_leaves_store_unchanged() {
        let mut h = harness(ready_record(), ok_empty);

        h.controller.update_field(CredentialField::OpenAiApiKey, "sk-edited");
        assert_eq!(h.controller.draft().openai_api_key, "sk-edited");
        assert_eq!(h.controller.persisted(), ready_record());

        h.controller.discard_changes();

        assert_eq!(h.controller.draft().openai_api_key, "sk-live");
        assert_eq!(h.store.read(), ready_record());
        assert_eq!(h.store.writes(), 0);
    }

    #[test]
    fn test_save_persists_fields_and_keeps_community() {
        let mut h = harness(ready_record(), ok_empty);

        h.controller.update_field(CredentialField::OpenAiApiKey, "sk-test");
        h.controller.update_field(CredentialField::PineconeEnvironment, "us-west1-gcp");
        h.controller.update_field(CredentialField::PineconeIndex, "book-gpt");
        h.controller.update_field(CredentialField::PineconeApiKey, "pc-key");
        h.controller.update_field(CredentialField::ForumUrl, "https://forum.example/");
        h.controller.update_field(CredentialField::DiscordApiKey, "discord");
        h.controller.save_credentials();

        assert_eq!(
            h.store.read(),
            CredentialsRecord {
                openai_api_key: "sk-test".to_string(),
                pinecone_environment: "us-west1-gcp".to_string(),
                pinecone_index: "book-gpt".to_string(),
                pinecone_api_key: "pc-key".to_string(),
                forum_url: "https://forum.example/".to_string(),
                community: "ouo".to_string(),
            }
        );
        assert_eq!(h.store.writes(), 1);
    }

    #[tokio::test]
    async fn test_refresh_disabled_without_openai_key() {
        let record = CredentialsRecord {
            openai_api_key: String::new(),
            ..ready_record()
        };
        let mut h = harness(record, ok_empty);
        h.controller.update_field(CredentialField::OpenAiApiKey, "sk-unsaved");

        assert_eq!(h.controller.refresh_state(), RefreshState::MissingOpenAiKey);
        assert_eq!(
            h.controller.refresh_model().await,
            RefreshOutcome::Disabled(RefreshState::MissingOpenAiKey)
        );
        assert!(h.backend.seen().is_empty());
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_disabled_without_community() {
        let record = CredentialsRecord {
            community: String::new(),
            ..ready_record()
        };
        let h = harness(record, ok_empty);

        assert!(!h.controller.can_refresh());
        assert_eq!(
            h.controller.refresh_model().await,
            RefreshOutcome::Disabled(RefreshState::MissingCommunity)
        );
        assert!(h.backend.seen().is_empty());
    }

    #[test]
    fn test_whitespace_key_enables_refresh() {
        let record = CredentialsRecord {
            openai_api_key: " ".to_string(),
            ..ready_record()
        };
        let h = harness(record, ok_empty);

        assert_eq!(h.controller.refresh_state(), RefreshState::Ready);
        assert!(h.controller.can_refresh());
    }

    #[tokio::test]
    async fn test_refresh_success_notifies_and_clears_busy() {
        let h = harness(ready_record(), ok_empty);

        assert_eq!(h.controller.refresh_model().await, RefreshOutcome::Success);

        let sent = h.notifier.sent();
        assert_eq!(sent, vec![Notification::new(SUCCESS_TITLE)]);
        assert!(!h.controller.is_busy());
        assert!(h.controller.can_refresh());
    }

    #[tokio::test]
    async fn test_refresh_business_error_is_shown_verbatim() {
        let h = harness(ready_record(), ok_bad_key);

        assert_eq!(
            h.controller.refresh_model().await,
            RefreshOutcome::Rejected("bad key".to_string())
        );

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, FAILURE_TITLE);
        assert_eq!(sent[0].description.as_deref(), Some("bad key"));
        assert!(!h.controller.is_busy());
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_is_generic() {
        let h = harness(ready_record(), parse_failure);

        assert_eq!(h.controller.refresh_model().await, RefreshOutcome::Failed);

        let sent = h.notifier.sent();
        assert_eq!(sent, vec![Notification::new(FAILURE_TITLE)]);
        assert!(!h.controller.is_busy());
    }

    #[tokio::test]
    async fn test_refresh_sends_persisted_record_not_draft() {
        let mut h = harness(ready_record(), ok_empty);
        h.controller.update_field(CredentialField::OpenAiApiKey, "sk-unsaved");

        h.controller.refresh_model().await;

        assert_eq!(h.backend.seen(), vec![ready_record()]);
    }

    #[tokio::test]
    async fn test_refresh_rejected_while_busy() {
        let h = harness(ready_record(), ok_empty);
        h.controller.busy.store(true, Ordering::SeqCst);

        assert_eq!(
            h.controller.refresh_model().await,
            RefreshOutcome::Disabled(RefreshState::Busy)
        );
        assert!(h.backend.seen().is_empty());
    }

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let guard = BusyGuard::acquire(&flag);
            assert!(guard.is_some());
            assert!(BusyGuard::acquire(&flag).is_none());
        }
        assert!(!flag.load(Ordering::SeqCst));
    }
}
