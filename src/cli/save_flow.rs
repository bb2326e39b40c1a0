//! Saving wizard data with login deferred until it is needed.
//!
//! Without a session the payload is stashed as the pending save and the
//! flow waits in [`SaveState::AuthRequired`]. After a login,
//! [`SaveFlow::resume_after_auth`] replays that payload once.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cli::api_client::{ApiClient, DocumentChanges, DocumentInfo, NewDocument};
use crate::cli::drafts::{DraftPayload, DraftStore};
use crate::cli::error::CliError;

#[derive(Debug, Clone, PartialEq)]
pub enum SaveState {
    Idle,
    Saving,
    Saved(DocumentInfo),
    AuthRequired(DraftPayload),
    Failed(String),
}

impl SaveState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaveState::Saved(_))
    }
}

/// Where a draft ends up once a session exists.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn store(&self, token: &str, payload: &DraftPayload) -> Result<DocumentInfo, CliError>;
}

pub struct HttpDocumentSink {
    client: ApiClient,
}

impl HttpDocumentSink {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentSink for HttpDocumentSink {
    async fn store(&self, token: &str, payload: &DraftPayload) -> Result<DocumentInfo, CliError> {
        let client = self.client.with_token(Some(token.to_string()));
        match payload.document_id {
            Some(id) => {
                let changes = DocumentChanges {
                    title: &payload.title,
                    data: &payload.data,
                };
                client.update_document(id, &changes).await
            }
            None => {
                let document = NewDocument {
                    form_slug: &payload.form_slug,
                    title: &payload.title,
                    data: &payload.data,
                };
                client.create_document(&document).await
            }
        }
    }
}

pub struct SaveFlow<D: DraftStore, K: DocumentSink> {
    drafts: Arc<D>,
    sink: K,
    state: SaveState,
}

impl<D: DraftStore, K: DocumentSink> SaveFlow<D, K> {
    pub fn new(drafts: Arc<D>, sink: K) -> Self {
        Self {
            drafts,
            sink,
            state: SaveState::Idle,
        }
    }

    pub fn state(&self) -> &SaveState {
        &self.state
    }

    /// Store the payload on the server, or keep it as the pending save when
    /// there is no session yet.
    pub async fn save(
        &mut self,
        token: Option<&str>,
        payload: DraftPayload,
    ) -> Result<&SaveState, CliError> {
        self.drafts.save_draft(&payload)?;

        let Some(token) = token else {
            tracing::debug!(form = %payload.form_slug, "no session, deferring save");
            return self.defer(payload);
        };

        self.state = SaveState::Saving;
        match self.sink.store(token, &payload).await {
            Ok(document) => {
                self.drafts.clear_draft(&payload.form_slug)?;
                self.drafts.set_pending(None)?;
                tracing::debug!(document = %document.id, "document saved");
                self.state = SaveState::Saved(document);
            }
            Err(CliError::AuthRequired) => {
                tracing::debug!(form = %payload.form_slug, "session rejected, deferring save");
                return self.defer(payload);
            }
            Err(err) => {
                tracing::warn!(form = %payload.form_slug, error = %err, "saving document failed");
                self.state = SaveState::Failed(err.to_string());
            }
        }
        Ok(&self.state)
    }

    /// Replay the pending save after a login. The pending entry is cleared
    /// before the replay so a second call finds nothing to do.
    pub async fn resume_after_auth(&mut self, token: &str) -> Result<&SaveState, CliError> {
        let pending = match &self.state {
            SaveState::AuthRequired(payload) => Some(payload.clone()),
            _ => self.drafts.load_pending()?,
        };
        let Some(payload) = pending else {
            return Ok(&self.state);
        };

        self.drafts.set_pending(None)?;
        self.save(Some(token), payload).await
    }

    /// Give up on the pending save. The draft itself stays on disk.
    pub fn abandon(self) -> Result<(), CliError> {
        if let SaveState::AuthRequired(payload) = &self.state {
            tracing::debug!(form = %payload.form_slug, "pending save abandoned");
        }
        self.drafts.set_pending(None)
    }

    fn defer(&mut self, payload: DraftPayload) -> Result<&SaveState, CliError> {
        self.drafts.set_pending(Some(&payload))?;
        self.state = SaveState::AuthRequired(payload);
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::drafts::MemoryDraftStore;
    use crate::models::DocumentStatus;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct ScriptedSink {
        results: Mutex<Vec<Result<DocumentInfo, CliError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSink {
        fn new(results: Vec<Result<DocumentInfo, CliError>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentSink for ScriptedSink {
        async fn store(&self, _token: &str, _payload: &DraftPayload) -> Result<DocumentInfo, CliError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results.lock().unwrap().remove(0)
        }
    }

    fn document() -> DocumentInfo {
        DocumentInfo {
            id: Uuid::from_u128(7),
            form_template_id: Uuid::from_u128(1),
            title: "Kündigung".to_string(),
            data: json!({"tenant_name": "Erika"}),
            status: DocumentStatus::Draft,
            rendered_text: None,
        }
    }

    fn payload() -> DraftPayload {
        DraftPayload::new(
            "kuendigung-mieter",
            "Kündigung",
            json!({"tenant_name": "Erika"}).as_object().cloned().unwrap(),
        )
    }

    #[tokio::test]
    async fn without_session_the_payload_waits_for_login() {
        let drafts = Arc::new(MemoryDraftStore::default());
        let sink = ScriptedSink::new(vec![]);
        let mut flow = SaveFlow::new(drafts.clone(), sink);

        let state = flow.save(None, payload()).await.unwrap();
        assert!(matches!(state, SaveState::AuthRequired(_)));
        let pending = drafts.load_pending().unwrap().unwrap();
        assert_eq!(pending.form_slug, "kuendigung-mieter");
        assert_eq!(pending.data["tenant_name"], "Erika");
        assert_eq!(flow.sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_clears_local_copies() {
        let drafts = Arc::new(MemoryDraftStore::default());
        let mut flow = SaveFlow::new(drafts.clone(), ScriptedSink::new(vec![Ok(document())]));

        let state = flow.save(Some("token"), payload()).await.unwrap();
        assert_eq!(state, &SaveState::Saved(document()));
        assert!(drafts.load_draft("kuendigung-mieter").unwrap().is_none());
        assert!(drafts.load_pending().unwrap().is_none());
    }

    #[tokio::test]
    async fn failure_keeps_the_draft() {
        let drafts = Arc::new(MemoryDraftStore::default());
        let failure = CliError::Api {
            status: 500,
            message: "db down".to_string(),
        };
        let mut flow = SaveFlow::new(drafts.clone(), ScriptedSink::new(vec![Err(failure)]));

        let state = flow.save(Some("token"), payload()).await.unwrap();
        assert!(matches!(state, SaveState::Failed(msg) if msg.contains("db down")));
        assert!(drafts.load_draft("kuendigung-mieter").unwrap().is_some());
    }

    #[tokio::test]
    async fn rejected_session_is_treated_as_missing() {
        let drafts = Arc::new(MemoryDraftStore::default());
        let mut flow = SaveFlow::new(
            drafts.clone(),
            ScriptedSink::new(vec![Err(CliError::AuthRequired)]),
        );

        let state = flow.save(Some("expired"), payload()).await.unwrap();
        assert!(matches!(state, SaveState::AuthRequired(_)));
        assert!(drafts.load_pending().unwrap().is_some());
    }

    #[tokio::test]
    async fn resume_replays_exactly_once() {
        let drafts = Arc::new(MemoryDraftStore::default());
        let mut flow = SaveFlow::new(
            drafts.clone(),
            ScriptedSink::new(vec![Ok(document()), Ok(document())]),
        );

        flow.save(None, payload()).await.unwrap();
        let state = flow.resume_after_auth("token").await.unwrap();
        assert!(state.is_terminal());

        flow.resume_after_auth("token").await.unwrap();
        assert_eq!(flow.sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resume_picks_up_a_pending_save_from_an_earlier_run() {
        let drafts = Arc::new(MemoryDraftStore::default());
        drafts.set_pending(Some(&payload())).unwrap();

        let mut flow = SaveFlow::new(drafts.clone(), ScriptedSink::new(vec![Ok(document())]));
        let state = flow.resume_after_auth("token").await.unwrap();
        assert_eq!(state, &SaveState::Saved(document()));
        assert!(drafts.load_pending().unwrap().is_none());
    }

    #[tokio::test]
    async fn abandon_keeps_the_draft() {
        let drafts = Arc::new(MemoryDraftStore::default());
        let mut flow = SaveFlow::new(drafts.clone(), ScriptedSink::new(vec![]));
        flow.save(None, payload()).await.unwrap();

        flow.abandon().unwrap();
        assert!(drafts.load_pending().unwrap().is_none());
        assert!(drafts.load_draft("kuendigung-mieter").unwrap().is_some());
    }
}
