use crate::models;
use crate::services::FormAccess;
use serde::Serialize;
use uuid::Uuid;

/// Catalog entry without the step definitions.
#[derive(Debug, Serialize, Clone)]
pub struct FormSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub persona: models::Persona,
    pub tier: models::Tier,
    pub price: f64,
    pub step_count: usize,
    pub field_count: usize,
}

impl From<&models::FormTemplate> for FormSummary {
    fn from(form: &models::FormTemplate) -> Self {
        Self {
            id: form.id,
            slug: form.slug.clone(),
            name: form.name.clone(),
            description: form.description.clone(),
            category: form.category.clone(),
            persona: form.persona,
            tier: form.tier,
            price: form.price,
            step_count: form.steps().len(),
            field_count: form.field_count(),
        }
    }
}

/// Full template plus the caller's access to it. Steps are only included
/// when access is granted.
#[derive(Debug, Serialize, Clone)]
pub struct FormDetail {
    #[serde(flatten)]
    pub summary: FormSummary,
    pub access: FormAccess,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<models::FormStep>>,
}

impl FormDetail {
    pub fn new(form: &models::FormTemplate, access: FormAccess) -> Self {
        Self {
            summary: form.into(),
            access,
            steps: access.has_access.then(|| form.steps().to_vec()),
        }
    }
}
