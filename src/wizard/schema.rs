//! Glue between form templates and the wizard: emptiness rules, field
//! validation and the review summary.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::field::{render_field, value_as_text, RenderedField};
use super::summary::{SummaryItem, SummarySection, WizardSummary};
use crate::helpers::{format, validation};
use crate::models::{FieldDescriptor, FieldType, FormTemplate};

/// Missing, null, blank strings and unchecked checkboxes count as empty.
pub fn is_empty_value(field: &FieldDescriptor, value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Bool(flag)) => field.field_type == FieldType::Checkbox && !flag,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Number(_)) => false,
    }
}

/// Validation message for a single field, `None` when the value is acceptable.
pub fn validate_field(field: &FieldDescriptor, value: Option<&Value>) -> Option<String> {
    if is_empty_value(field, value) {
        return field
            .required
            .then(|| format!("{} ist ein Pflichtfeld", field.label));
    }

    let text = value_as_text(value);
    let is_number = matches!(value, Some(Value::Number(_)));
    match &field.field_type {
        FieldType::Date if format::parse_date(&text).is_none() => {
            Some(format!("{}: ungültiges Datum", field.label))
        }
        FieldType::Number | FieldType::Currency
            if !is_number && format::parse_amount(&text).is_none() =>
        {
            Some(format!("{}: ungültige Zahl", field.label))
        }
        FieldType::Iban if !validation::is_valid_german_iban(&text) => {
            Some(format!("{}: ungültige IBAN", field.label))
        }
        FieldType::Select
            if !field.options.is_empty()
                && !field.options.iter().any(|option| option.value() == text) =>
        {
            Some(format!("{}: ungültige Auswahl", field.label))
        }
        _ if is_plz_field(field) && !validation::is_valid_plz(&text) => {
            Some(format!("{}: ungültige Postleitzahl", field.label))
        }
        _ => None,
    }
}

fn is_plz_field(field: &FieldDescriptor) -> bool {
    let name = field.name.to_lowercase();
    name == "plz" || name.ends_with("_plz") || name.ends_with("postal_code")
}

/// All validation messages of a template keyed by field name.
pub fn validate(template: &FormTemplate, data: &Map<String, Value>) -> BTreeMap<String, String> {
    template
        .steps()
        .iter()
        .flat_map(|step| step.fields.iter())
        .filter_map(|field| {
            validate_field(field, data.get(&field.name)).map(|message| (field.name.clone(), message))
        })
        .collect()
}

/// Messages for the fields of one step only.
pub fn validate_step(
    template: &FormTemplate,
    step_index: usize,
    data: &Map<String, Value>,
) -> BTreeMap<String, String> {
    template
        .steps()
        .get(step_index)
        .map(|step| {
            step.fields
                .iter()
                .filter_map(|field| {
                    validate_field(field, data.get(&field.name))
                        .map(|message| (field.name.clone(), message))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Human-readable value for the review page.
pub fn display_value(field: &FieldDescriptor, value: Option<&Value>) -> String {
    if is_empty_value(field, value) && field.field_type != FieldType::Checkbox {
        return String::new();
    }
    let text = value_as_text(value);
    match &field.field_type {
        FieldType::Checkbox => {
            if is_empty_value(field, value) {
                "Nein".to_string()
            } else {
                "Ja".to_string()
            }
        }
        FieldType::Currency => match value {
            Some(Value::Number(number)) => number.as_f64(),
            _ => format::parse_amount(&text),
        }
        .map(format::format_currency)
        .unwrap_or(text),
        FieldType::Date => format::parse_date(&text)
            .map(format::format_date)
            .unwrap_or(text),
        FieldType::Select => field
            .options
            .iter()
            .find(|option| option.value() == text)
            .map(|option| option.label().to_string())
            .unwrap_or(text),
        FieldType::Iban => validation::format_iban(&text),
        _ => text,
    }
}

/// Build the review summary of a template for the given data.
pub fn build_summary(template: &FormTemplate, data: &Map<String, Value>) -> WizardSummary {
    let sections = template
        .steps()
        .iter()
        .enumerate()
        .map(|(step_index, step)| SummarySection {
            step_index,
            title: step.title.clone(),
            items: step
                .fields
                .iter()
                .map(|field| {
                    let value = data.get(&field.name);
                    SummaryItem {
                        label: field.label.clone(),
                        value: display_value(field, value),
                        required: field.required,
                        empty: is_empty_value(field, value),
                    }
                })
                .collect(),
        })
        .collect();

    WizardSummary::compute(sections)
}

/// Render every field of a step, attaching the messages in `errors`.
pub fn render_step(
    template: &FormTemplate,
    step_index: usize,
    data: &Map<String, Value>,
    errors: &BTreeMap<String, String>,
) -> Vec<RenderedField> {
    let Some(step) = template.steps().get(step_index) else {
        return vec![];
    };
    step.fields
        .iter()
        .map(|field| {
            render_field(
                field,
                data.get(&field.name),
                errors.get(&field.name).map(String::as_str),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormStep;
    use serde_json::json;

    fn template() -> FormTemplate {
        let steps: Vec<FormStep> = serde_json::from_value(json!([
            {
                "title": "Mieter",
                "fields": [
                    {"name": "tenant_name", "label": "Name", "type": "text", "required": true},
                    {"name": "phone", "label": "Telefon", "type": "text"}
                ]
            },
            {
                "title": "Mietobjekt",
                "fields": [
                    {"name": "street", "label": "Straße", "type": "address", "required": true},
                    {"name": "plz", "label": "PLZ", "type": "text", "required": true},
                    {"name": "rent", "label": "Kaltmiete", "type": "currency", "required": true},
                    {"name": "start", "label": "Mietbeginn", "type": "date", "required": true}
                ]
            },
            {
                "title": "Zahlung",
                "fields": [
                    {"name": "iban", "label": "IBAN", "type": "iban"},
                    {"name": "consent", "label": "Einverstanden", "type": "checkbox", "required": true}
                ]
            }
        ]))
        .unwrap();
        FormTemplate {
            slug: "mietvertrag-wohnung".to_string(),
            name: "Mietvertrag".to_string(),
            steps: sqlx::types::Json(steps),
            ..Default::default()
        }
    }

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn emptiness_rules() {
        let text = template().find_field("tenant_name").cloned().unwrap();
        let checkbox = template().find_field("consent").cloned().unwrap();

        assert!(is_empty_value(&text, None));
        assert!(is_empty_value(&text, Some(&Value::Null)));
        assert!(is_empty_value(&text, Some(&json!("   "))));
        assert!(!is_empty_value(&text, Some(&json!("Erika"))));
        assert!(is_empty_value(&checkbox, Some(&json!(false))));
        assert!(!is_empty_value(&checkbox, Some(&json!(true))));
    }

    #[test]
    fn required_messages_use_the_label() {
        let errors = validate(&template(), &Map::new());
        assert_eq!(errors["tenant_name"], "Name ist ein Pflichtfeld");
        assert_eq!(errors["consent"], "Einverstanden ist ein Pflichtfeld");
        assert!(!errors.contains_key("phone"));
        assert!(!errors.contains_key("iban"));
    }

    #[test]
    fn typed_values_are_checked() {
        let errors = validate(
            &template(),
            &data(json!({
                "tenant_name": "Erika",
                "street": "Hauptstraße 1",
                "plz": "1234",
                "rent": "viel",
                "start": "31.02.2024",
                "iban": "DE00370400440532013000",
                "consent": true
            })),
        );
        assert_eq!(errors.len(), 4);
        assert!(errors["plz"].contains("Postleitzahl"));
        assert!(errors["rent"].contains("Zahl"));
        assert!(errors["start"].contains("Datum"));
        assert!(errors["iban"].contains("IBAN"));
    }

    #[test]
    fn summary_reflects_missing_required_fields() {
        let summary = build_summary(
            &template(),
            &data(json!({
                "tenant_name": "Erika",
                "street": "Hauptstraße 1",
                "plz": "10115",
                "rent": 850,
                "start": "2024-03-01"
            })),
        );
        assert!(!summary.all_complete);
        assert_eq!(summary.incomplete_count, 1);
        assert!(summary.sections[0].complete);
        assert!(summary.sections[1].complete);
        assert_eq!(summary.sections[2].missing, vec!["Einverstanden"]);
        assert_eq!(summary.sections[1].items[2].value, "850,00 €");
        assert_eq!(summary.sections[1].items[3].value, "01.03.2024");
        assert_eq!(summary.edit_target(2), Some(2));
    }

    #[test]
    fn render_step_attaches_messages() {
        let template = template();
        let errors = validate_step(&template, 0, &Map::new());
        let fields = render_step(&template, 0, &Map::new(), &errors);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].error.as_deref(), Some("Name ist ein Pflichtfeld"));
        assert!(fields[1].error.is_none());
        assert!(render_step(&template, 9, &Map::new(), &errors).is_empty());
    }
}
