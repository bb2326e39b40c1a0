use async_trait::async_trait;
use uuid::Uuid;

use super::{CallableTrait, Context};
use crate::cli::error::CliError;
use crate::cli::progress;
use crate::models::DocumentStatus;

#[derive(Debug, Clone)]
pub enum DocumentAction {
    List,
    Show(Uuid),
    Complete(Uuid),
    Render(Uuid),
    Delete(Uuid),
}

/// `mietrecht-cli documents <list|show|complete|render|delete>`
pub struct DocumentsCommand {
    pub action: DocumentAction,
}

fn status_label(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Draft => "draft",
        DocumentStatus::Completed => "completed",
    }
}

#[async_trait]
impl CallableTrait for DocumentsCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let client = ctx.signed_in_client("documents")?;

        match &self.action {
            DocumentAction::List => {
                let documents = client.list_documents().await?;
                if ctx.json {
                    return ctx.print_json(&documents);
                }
                if documents.is_empty() {
                    println!("Noch keine Dokumente");
                }
                for document in &documents {
                    let status = status_label(document.status);
                    println!(
                        "{} {}  {}",
                        progress::status_icon(status),
                        document.id,
                        document.title
                    );
                }
            }
            DocumentAction::Show(id) => {
                let document = client.get_document(*id).await?;
                if ctx.json {
                    return ctx.print_json(&document);
                }
                println!("{} [{}]", document.title, status_label(document.status));
                if let Some(fields) = document.data.as_object() {
                    for (name, value) in fields {
                        println!("  {name}: {value}");
                    }
                }
            }
            DocumentAction::Complete(id) => {
                let pb = progress::spinner("Dokument wird erstellt...");
                match client.complete_document(*id).await {
                    Ok(document) => {
                        progress::finish_success(&pb, &format!("{} abgeschlossen", document.title));
                        if ctx.json {
                            return ctx.print_json(&document);
                        }
                        if let Some(text) = &document.rendered_text {
                            println!("\n{text}");
                        }
                    }
                    Err(err) => {
                        progress::finish_error(&pb, "Abschluss fehlgeschlagen");
                        return Err(err);
                    }
                }
            }
            DocumentAction::Render(id) => {
                let rendered = client.render_document(*id).await?;
                if ctx.json {
                    return ctx.print_json(&rendered);
                }
                println!("{}", rendered.text);
            }
            DocumentAction::Delete(id) => {
                client.delete_document(*id).await?;
                println!("✓ Dokument {id} gelöscht");
            }
        }
        Ok(())
    }
}
