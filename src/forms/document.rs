use crate::models;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_valid::Validate;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct DocumentForm {
    /// Slug of the form template the document is based on
    #[validate(min_length = 1)]
    #[validate(max_length = 128)]
    pub form_slug: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub title: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl DocumentForm {
    pub fn into_document(self, user_id: &str, form_template_id: Uuid) -> models::GeneratedDocument {
        models::GeneratedDocument {
            user_id: user_id.to_string(),
            form_template_id,
            title: self.title,
            data: Value::Object(self.data),
            status: models::DocumentStatus::Draft,
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct DocumentUpdateForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub title: Option<String>,
    pub data: Option<Map<String, Value>>,
}

impl DocumentUpdateForm {
    pub fn update(self, document: &mut models::GeneratedDocument) {
        if let Some(title) = self.title {
            document.title = title;
        }

        if let Some(data) = self.data {
            document.data = Value::Object(data);
        }
    }
}

/// Data to check against a template without storing it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ValidateDataForm {
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Limit the check to one step
    #[serde(default)]
    pub step: Option<usize>,
}
