use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pricing classification of a form.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(rename_all = "lowercase", type_name = "varchar")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Paid,
}

impl Tier {
    pub fn is_free(&self) -> bool {
        matches!(self, Tier::Free)
    }
}

/// Intended audience of a form.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(rename_all = "lowercase", type_name = "varchar")]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Landlord,
    Tenant,
    #[default]
    Both,
}

impl Persona {
    /// `Both` matches any requested persona.
    pub fn matches(&self, wanted: Persona) -> bool {
        *self == Persona::Both || wanted == Persona::Both || *self == wanted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct FormTemplate {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub persona: Persona,
    pub tier: Tier,
    pub price: f64,
    pub steps: sqlx::types::Json<Vec<FormStep>>,
    pub body_template: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FormTemplate {
    pub fn steps(&self) -> &[FormStep] {
        &self.steps.0
    }

    pub fn field_count(&self) -> usize {
        self.steps().iter().map(|step| step.fields.len()).sum()
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.steps()
            .iter()
            .flat_map(|step| step.fields.iter())
            .find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormStep {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
}

/// Select options come either as plain strings or as `{value, label}` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectOption {
    Plain(String),
    Labeled { value: String, label: String },
}

impl SelectOption {
    pub fn value(&self) -> &str {
        match self {
            SelectOption::Plain(value) => value,
            SelectOption::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SelectOption::Plain(value) => value,
            SelectOption::Labeled { label, .. } => label,
        }
    }
}

/// Field types understood by the wizard. Anything else is kept verbatim in
/// `Other` and rendered as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Date,
    Number,
    Currency,
    Select,
    Checkbox,
    Address,
    Iban,
    Other(String),
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "date" => FieldType::Date,
            "number" => FieldType::Number,
            "currency" => FieldType::Currency,
            "select" => FieldType::Select,
            "checkbox" => FieldType::Checkbox,
            "address" => FieldType::Address,
            "iban" => FieldType::Iban,
            _ => FieldType::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Textarea => write!(f, "textarea"),
            FieldType::Date => write!(f, "date"),
            FieldType::Number => write!(f, "number"),
            FieldType::Currency => write!(f, "currency"),
            FieldType::Select => write!(f, "select"),
            FieldType::Checkbox => write!(f, "checkbox"),
            FieldType::Address => write!(f, "address"),
            FieldType::Iban => write!(f, "iban"),
            FieldType::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_keeps_unknown_names() {
        let field: FieldDescriptor = serde_json::from_value(serde_json::json!({
            "name": "signature",
            "label": "Unterschrift",
            "type": "signature_pad"
        }))
        .unwrap();
        assert_eq!(field.field_type, FieldType::Other("signature_pad".to_string()));
        assert!(!field.required);
        assert_eq!(serde_json::to_value(&field.field_type).unwrap(), "signature_pad");
    }

    #[test]
    fn select_options_accept_both_shapes() {
        let options: Vec<SelectOption> = serde_json::from_value(serde_json::json!([
            "monatlich",
            {"value": "yearly", "label": "jährlich"}
        ]))
        .unwrap();
        assert_eq!(options[0].value(), "monatlich");
        assert_eq!(options[1].value(), "yearly");
        assert_eq!(options[1].label(), "jährlich");
    }

    #[test]
    fn persona_both_matches_everyone() {
        assert!(Persona::Both.matches(Persona::Tenant));
        assert!(Persona::Landlord.matches(Persona::Both));
        assert!(!Persona::Landlord.matches(Persona::Tenant));
    }
}
