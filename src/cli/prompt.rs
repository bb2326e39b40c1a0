//! Terminal prompts for wizard fields.
//!
//! Each [`Control`] maps to one dialoguer widget: text-like controls to
//! `Input`, text areas to `Editor`, selects to `FuzzySelect` and
//! checkboxes to `Confirm`.

use dialoguer::{Confirm, Editor, FuzzySelect, Input, Password};
use serde_json::Value;

use crate::cli::error::CliError;
use crate::helpers::{format, validation};
use crate::wizard::{Control, RenderedField, WizardSummary};

/// What to do from the review page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Save,
    /// Edit the section with this index
    Edit(usize),
    Cancel,
}

pub trait Prompter {
    /// Ask for one field and return the new value.
    fn ask(&mut self, field: &RenderedField) -> Result<Value, CliError>;

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool, CliError>;

    fn review(&mut self, summary: &WizardSummary) -> Result<ReviewAction, CliError>;

    fn show(&mut self, message: &str);
}

/// Turn typed text into the JSON value stored for a control.
pub fn parse_answer(control: &Control, answer: &str) -> Result<Value, String> {
    let answer = answer.trim();
    match control {
        Control::DateInput { .. } => {
            if answer.is_empty() {
                return Ok(Value::Null);
            }
            format::parse_date(answer)
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .ok_or_else(|| "Datum als TT.MM.JJJJ eingeben".to_string())
        }
        Control::NumberInput { .. } | Control::CurrencyInput { .. } => {
            if answer.is_empty() {
                return Ok(Value::Null);
            }
            format::parse_amount(answer)
                .map(Value::from)
                .ok_or_else(|| "Bitte eine Zahl eingeben".to_string())
        }
        Control::IbanInput { .. } => Ok(Value::String(validation::normalize_iban(answer))),
        Control::Checkbox { .. } => Ok(Value::Bool(matches!(
            answer.to_lowercase().as_str(),
            "j" | "ja" | "y" | "yes" | "true" | "1"
        ))),
        Control::Select { options, .. } => options
            .iter()
            .find(|option| option.value() == answer || option.label() == answer)
            .map(|option| Value::String(option.value().to_string()))
            .ok_or_else(|| format!("Unbekannte Auswahl: {answer}")),
        Control::TextInput { .. } | Control::TextArea { .. } | Control::AddressInput { .. } => {
            Ok(Value::String(answer.to_string()))
        }
    }
}

fn initial_text(control: &Control) -> String {
    match control {
        Control::TextInput { value }
        | Control::TextArea { value }
        | Control::AddressInput { value, .. } => value.clone(),
        Control::DateInput { value, raw } => value.map(format::format_date).unwrap_or_else(|| raw.clone()),
        Control::NumberInput { raw, .. } => raw.clone(),
        Control::CurrencyInput { value, .. } => value.map(|v| v.to_string()).unwrap_or_default(),
        Control::IbanInput { formatted, .. } => formatted.clone(),
        Control::Select { selected, .. } => selected.clone().unwrap_or_default(),
        Control::Checkbox { checked } => checked.to_string(),
    }
}

fn label(field: &RenderedField) -> String {
    let mut label = field.label.clone();
    if field.required {
        label.push_str(" *");
    }
    if let Some(hint) = field.help_text.as_deref().or(field.placeholder.as_deref()) {
        label.push_str(&format!(" ({hint})"));
    }
    label
}

/// Interactive prompts on the controlling terminal.
#[derive(Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn password(&mut self, prompt: &str) -> Result<String, CliError> {
        Ok(Password::new().with_prompt(prompt).interact()?)
    }

    pub fn text(&mut self, prompt: &str, initial: &str) -> Result<String, CliError> {
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .with_initial_text(initial)
            .interact_text()?)
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&mut self, field: &RenderedField) -> Result<Value, CliError> {
        if let Some(error) = &field.error {
            eprintln!("  ! {error}");
        }
        let prompt = label(field);

        match &field.control {
            Control::Checkbox { checked } => Ok(Value::Bool(
                Confirm::new().with_prompt(prompt).default(*checked).interact()?,
            )),
            Control::Select { options, selected } => {
                let labels: Vec<&str> = options.iter().map(|option| option.label()).collect();
                let default = selected
                    .as_deref()
                    .and_then(|value| options.iter().position(|option| option.value() == value))
                    .unwrap_or(0);
                let index = FuzzySelect::new()
                    .with_prompt(prompt)
                    .items(&labels)
                    .default(default)
                    .interact()?;
                Ok(options
                    .get(index)
                    .map(|option| Value::String(option.value().to_string()))
                    .unwrap_or(Value::Null))
            }
            Control::TextArea { value } => {
                eprintln!("{prompt}");
                let edited = Editor::new().edit(value)?;
                Ok(Value::String(edited.unwrap_or_else(|| value.clone())))
            }
            control => {
                let required = field.required;
                let answer = Input::<String>::new()
                    .with_prompt(prompt)
                    .with_initial_text(initial_text(control))
                    .allow_empty(!required)
                    .validate_with(|input: &String| parse_answer(control, input).map(|_| ()))
                    .interact_text()?;
                parse_answer(control, &answer).map_err(CliError::InvalidInput)
            }
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool, CliError> {
        Ok(Confirm::new().with_prompt(question).default(default).interact()?)
    }

    fn review(&mut self, summary: &WizardSummary) -> Result<ReviewAction, CliError> {
        for (index, section) in summary.sections.iter().enumerate() {
            let mark = if section.complete { "✓" } else { "✗" };
            eprintln!("\n{mark} {}. {}", index + 1, section.title);
            for item in &section.items {
                let value = if item.is_missing() { "<fehlt>" } else { item.value.as_str() };
                eprintln!("    {}: {}", item.label, value);
            }
        }
        if !summary.all_complete {
            eprintln!("\n{} Abschnitt(e) unvollständig", summary.incomplete_count);
        }

        let mut items = vec!["Speichern".to_string()];
        items.extend(
            summary
                .sections
                .iter()
                .map(|section| format!("Bearbeiten: {}", section.title)),
        );
        items.push("Abbrechen".to_string());

        let choice = FuzzySelect::new()
            .with_prompt("Wie weiter?")
            .items(&items)
            .default(0)
            .interact()?;
        Ok(match choice {
            0 => ReviewAction::Save,
            n if n == items.len() - 1 => ReviewAction::Cancel,
            n => ReviewAction::Edit(n - 1),
        })
    }

    fn show(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectOption;
    use serde_json::json;

    #[test]
    fn dates_are_stored_as_iso() {
        let control = Control::DateInput {
            value: None,
            raw: String::new(),
        };
        assert_eq!(parse_answer(&control, "30.09.2024"), Ok(json!("2024-09-30")));
        assert_eq!(parse_answer(&control, ""), Ok(Value::Null));
        assert!(parse_answer(&control, "morgen").is_err());
    }

    #[test]
    fn amounts_accept_german_notation() {
        let control = Control::CurrencyInput {
            value: None,
            formatted: None,
        };
        assert_eq!(parse_answer(&control, "1.234,56 €"), Ok(json!(1234.56)));
        assert!(parse_answer(&control, "viel").is_err());
    }

    #[test]
    fn selects_match_value_or_label() {
        let control = Control::Select {
            options: vec![
                SelectOption::Labeled {
                    value: "move_out".to_string(),
                    label: "Auszug".to_string(),
                },
                SelectOption::Plain("other".to_string()),
            ],
            selected: None,
        };
        assert_eq!(parse_answer(&control, "Auszug"), Ok(json!("move_out")));
        assert_eq!(parse_answer(&control, "other"), Ok(json!("other")));
        assert!(parse_answer(&control, "nope").is_err());
    }

    #[test]
    fn checkbox_and_iban_answers() {
        assert_eq!(
            parse_answer(&Control::Checkbox { checked: false }, "ja"),
            Ok(json!(true))
        );
        let iban = Control::IbanInput {
            value: String::new(),
            formatted: String::new(),
        };
        assert_eq!(
            parse_answer(&iban, "de89 3704 0044 0532 0130 00"),
            Ok(json!("DE89370400440532013000"))
        );
    }
}
