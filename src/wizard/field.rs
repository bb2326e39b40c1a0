use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::helpers::{format, validation};
use crate::models::{FieldDescriptor, FieldType, SelectOption};

/// Input control chosen for a field, with the current value normalised for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    TextInput {
        value: String,
    },
    TextArea {
        value: String,
    },
    DateInput {
        value: Option<NaiveDate>,
        raw: String,
    },
    NumberInput {
        value: Option<f64>,
        raw: String,
    },
    CurrencyInput {
        value: Option<f64>,
        formatted: Option<String>,
    },
    Select {
        options: Vec<SelectOption>,
        selected: Option<String>,
    },
    Checkbox {
        checked: bool,
    },
    AddressInput {
        value: String,
        autocomplete: bool,
    },
    IbanInput {
        value: String,
        formatted: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub control: Control,
    /// Message supplied by the caller; shown as is.
    pub error: Option<String>,
}

/// A value change reported by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub name: String,
    pub value: Value,
}

/// Plain-text view of a JSON value as typed by a user.
pub fn value_as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}

fn value_as_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => format::parse_amount(text),
        _ => None,
    }
}

fn value_as_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => matches!(text.as_str(), "true" | "1" | "on" | "ja"),
        Some(Value::Number(number)) => number.as_f64().map_or(false, |n| n != 0.0),
        _ => false,
    }
}

/// Pick the control for a field descriptor. Unknown types render as plain text.
pub fn render_field(
    field: &FieldDescriptor,
    value: Option<&Value>,
    validation_message: Option<&str>,
) -> RenderedField {
    let text = value_as_text(value);

    let control = match &field.field_type {
        FieldType::Text => Control::TextInput { value: text },
        FieldType::Textarea => Control::TextArea { value: text },
        FieldType::Date => Control::DateInput {
            value: format::parse_date(&text),
            raw: text,
        },
        FieldType::Number => Control::NumberInput {
            value: value_as_number(value),
            raw: text,
        },
        FieldType::Currency => {
            let amount = value_as_number(value);
            Control::CurrencyInput {
                value: amount,
                formatted: amount.map(format::format_currency),
            }
        }
        FieldType::Select => {
            let selected = field
                .options
                .iter()
                .find(|option| option.value() == text)
                .map(|option| option.value().to_string());
            Control::Select {
                options: field.options.clone(),
                selected,
            }
        }
        FieldType::Checkbox => Control::Checkbox {
            checked: value_as_bool(value),
        },
        FieldType::Address => Control::AddressInput {
            value: text,
            autocomplete: true,
        },
        FieldType::Iban => Control::IbanInput {
            formatted: validation::format_iban(&text),
            value: validation::normalize_iban(&text),
        },
        FieldType::Other(kind) => {
            tracing::debug!(field = %field.name, kind = %kind, "unknown field type, using text input");
            Control::TextInput { value: text }
        }
    };

    RenderedField {
        name: field.name.clone(),
        label: field.label.clone(),
        required: field.required,
        placeholder: field.placeholder.clone(),
        help_text: field.help_text.clone(),
        control,
        error: validation_message.map(|message| message.to_string()),
    }
}

/// Apply a change to the form data; last write wins.
pub fn apply_change(data: &mut Map<String, Value>, change: FieldChange) {
    data.insert(change.name, change.value);
}
