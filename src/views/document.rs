use crate::models;
use crate::wizard::WizardSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Serialize, Clone)]
pub struct DocumentView {
    pub id: Uuid,
    pub form_template_id: Uuid,
    pub title: String,
    pub data: Value,
    pub status: models::DocumentStatus,
    pub pdf_url: Option<String>,
    pub rendered_text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<models::GeneratedDocument> for DocumentView {
    fn from(document: models::GeneratedDocument) -> Self {
        Self {
            id: document.id,
            form_template_id: document.form_template_id,
            title: document.title,
            data: document.data,
            status: document.status,
            pdf_url: document.pdf_url,
            rendered_text: document.rendered_text,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Review state of filled data: summary per step and field messages.
#[derive(Debug, Serialize, Clone)]
pub struct CompletionView {
    pub summary: WizardSummary,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct RenderedView {
    pub id: Uuid,
    pub title: String,
    pub status: models::DocumentStatus,
    pub text: String,
}
