use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Map;
use uuid::Uuid;

use super::{CallableTrait, Context};
use crate::cli::api_client::ApiClient;
use crate::cli::drafts::{DraftPayload, DraftStore, FileDraftStore};
use crate::cli::error::CliError;
use crate::cli::fill::{run_wizard, FillOutcome};
use crate::cli::progress;
use crate::cli::prompt::{DialoguerPrompter, Prompter};
use crate::cli::save_flow::{HttpDocumentSink, SaveFlow, SaveState};

/// Print the outcome of a save. A deferred save is not an error.
fn report(state: &SaveState) -> Result<Option<Uuid>, CliError> {
    match state {
        SaveState::Saved(document) => {
            eprintln!("✓ Gespeichert: {} ({})", document.title, document.id);
            Ok(Some(document.id))
        }
        SaveState::AuthRequired(pending) => {
            eprintln!(
                "Zum Speichern von \"{}\" bitte anmelden: mietrecht-cli login, danach mietrecht-cli resume",
                pending.title
            );
            Ok(None)
        }
        SaveState::Failed(message) => Err(CliError::SaveFailed(message.clone())),
        SaveState::Idle | SaveState::Saving => Ok(None),
    }
}

async fn offer_completion<P: Prompter>(
    client: &ApiClient,
    prompter: &mut P,
    document_id: Uuid,
) -> Result<(), CliError> {
    if !prompter.confirm("Dokument jetzt abschließen?", true)? {
        return Ok(());
    }
    let pb = progress::spinner("Dokument wird erstellt...");
    match client.complete_document(document_id).await {
        Ok(document) => {
            progress::finish_success(&pb, "Dokument abgeschlossen");
            if let Some(text) = document.rendered_text {
                println!("\n{text}");
            }
            Ok(())
        }
        Err(err) => {
            progress::finish_error(&pb, "Abschluss fehlgeschlagen");
            Err(err)
        }
    }
}

/// `mietrecht-cli fill <slug> [--title ..] [--document <id>]`
pub struct FillCommand {
    pub slug: String,
    pub title: Option<String>,
    pub document: Option<Uuid>,
}

#[async_trait]
impl CallableTrait for FillCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let token = ctx.session_token()?;
        let client = ctx.client()?;
        let drafts = Arc::new(FileDraftStore::with_default_path());
        let mut prompter = DialoguerPrompter;

        let form = client.get_form(&self.slug).await?;
        if let Some(access) = form.access.filter(|access| !access.has_access) {
            tracing::debug!(form = %form.slug, reason = ?access.reason, "no access");
            if token.is_none() {
                return Err(CliError::LoginRequired {
                    feature: form.name.clone(),
                });
            }
            return Err(CliError::Api {
                status: 403,
                message: format!("No access to {}", form.name),
            });
        }
        if form.steps.is_none() {
            return Err(CliError::InvalidResponse(format!(
                "form {} came without steps",
                form.slug
            )));
        }
        let template = form.template();

        let mut document_id = self.document;
        let mut title = self.title.clone();
        let data = if let Some(id) = self.document {
            let document = client.get_document(id).await?;
            title = title.or(Some(document.title));
            document.data.as_object().cloned().unwrap_or_default()
        } else {
            match drafts.load_draft(&form.slug)? {
                Some(draft) if prompter.confirm("Gespeicherten Entwurf fortsetzen?", true)? => {
                    document_id = draft.document_id;
                    title = title.or(Some(draft.title));
                    draft.data
                }
                _ => Map::new(),
            }
        };
        let title = title.unwrap_or_else(|| form.name.clone());

        let (data, complete) = match run_wizard(&template, data, &mut prompter)? {
            FillOutcome::Save { data, complete } => (data, complete),
            FillOutcome::Cancelled { data } => {
                let mut draft = DraftPayload::new(&form.slug, &title, data);
                draft.document_id = document_id;
                drafts.save_draft(&draft)?;
                eprintln!("Entwurf lokal gespeichert");
                return Ok(());
            }
        };

        let mut payload = DraftPayload::new(&form.slug, &title, data);
        payload.document_id = document_id;

        let mut flow = SaveFlow::new(drafts, HttpDocumentSink::new(client.clone()));
        let saved = report(flow.save(token.as_deref(), payload).await?)?;

        if let (Some(id), true) = (saved, complete) {
            offer_completion(&client, &mut prompter, id).await?;
        }
        Ok(())
    }
}

/// `mietrecht-cli resume [--abandon]`
///
/// Replays the save that was waiting for a login.
pub struct ResumeCommand {
    pub abandon: bool,
}

#[async_trait]
impl CallableTrait for ResumeCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let drafts = Arc::new(FileDraftStore::with_default_path());
        let client = ctx.client()?;
        let mut flow = SaveFlow::new(drafts, HttpDocumentSink::new(client));

        if self.abandon {
            flow.abandon()?;
            eprintln!("Ausstehende Speicherung verworfen, der Entwurf bleibt lokal erhalten");
            return Ok(());
        }

        let creds = ctx.credentials().require_valid_token("saving documents")?;
        let state = flow.resume_after_auth(&creds.access_token).await?;
        if matches!(state, SaveState::Idle) {
            eprintln!("Nichts zu speichern");
            return Ok(());
        }
        report(state).map(|_| ())
    }
}
