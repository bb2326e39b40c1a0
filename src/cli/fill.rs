//! Step-by-step form filling in the terminal.

use serde_json::{Map, Value};

use crate::cli::error::CliError;
use crate::cli::prompt::{Prompter, ReviewAction};
use crate::models::FormTemplate;
use crate::wizard::schema::validate_step;
use crate::wizard::{apply_change, build_summary, render_step, FieldChange, WizardState};

#[derive(Debug, Clone, PartialEq)]
pub enum FillOutcome {
    /// The user chose to save; `complete` when every required field is set.
    Save {
        data: Map<String, Value>,
        complete: bool,
    },
    Cancelled {
        data: Map<String, Value>,
    },
}

/// Walk through every step, then loop on the review page until the user
/// saves or cancels.
pub fn run_wizard<P: Prompter>(
    template: &FormTemplate,
    mut data: Map<String, Value>,
    prompter: &mut P,
) -> Result<FillOutcome, CliError> {
    let mut state = WizardState::new(template.steps().len());

    loop {
        if state.is_review() {
            let summary = build_summary(template, &data);
            match prompter.review(&summary)? {
                ReviewAction::Save => {
                    return Ok(FillOutcome::Save {
                        data,
                        complete: summary.all_complete,
                    })
                }
                ReviewAction::Cancel => return Ok(FillOutcome::Cancelled { data }),
                ReviewAction::Edit(section) => {
                    let Some(step) = summary.edit_target(section) else {
                        prompter.show("Unbekannter Abschnitt");
                        continue;
                    };
                    state
                        .go_to(step)
                        .map_err(CliError::InvalidInput)?;
                    run_step(template, &mut state, &mut data, prompter)?;
                    state.go_to(state.step_count()).map_err(CliError::InvalidInput)?;
                }
            }
            continue;
        }

        run_step(template, &mut state, &mut data, prompter)?;
        state.next();
    }
}

/// Ask every field of the current step. Validation messages are shown and
/// the step is repeated unless the user chooses to continue anyway.
fn run_step<P: Prompter>(
    template: &FormTemplate,
    state: &mut WizardState,
    data: &mut Map<String, Value>,
    prompter: &mut P,
) -> Result<(), CliError> {
    let step = state.current();
    let title = template
        .steps()
        .get(step)
        .map(|step| step.title.as_str())
        .unwrap_or_default();

    let mut errors = Default::default();
    loop {
        prompter.show(&format!(
            "\n[{}/{}] {} ({}%)",
            step + 1,
            state.step_count(),
            title,
            state.progress_percent()
        ));
        for field in render_step(template, step, data, &errors) {
            let value = prompter.ask(&field)?;
            apply_change(
                data,
                FieldChange {
                    name: field.name,
                    value,
                },
            );
        }

        errors = validate_step(template, step, data);
        if errors.is_empty() {
            return Ok(());
        }
        for message in errors.values() {
            prompter.show(message);
        }
        if prompter.confirm("Trotzdem weiter?", false)? {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormStep;
    use crate::wizard::{RenderedField, WizardSummary};
    use serde_json::json;
    use std::collections::VecDeque;

    /// Answers by field name, in order of appearance.
    struct ScriptedPrompter {
        answers: VecDeque<(String, Value)>,
        confirms: VecDeque<bool>,
        reviews: VecDeque<ReviewAction>,
        shown: Vec<String>,
        seen_errors: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: Vec<(&str, Value)>, confirms: Vec<bool>, reviews: Vec<ReviewAction>) -> Self {
            Self {
                answers: answers
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
                confirms: confirms.into(),
                reviews: reviews.into(),
                shown: vec![],
                seen_errors: vec![],
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, field: &RenderedField) -> Result<Value, CliError> {
            if let Some(error) = &field.error {
                self.seen_errors.push(error.clone());
            }
            let (name, value) = self
                .answers
                .pop_front()
                .ok_or_else(|| CliError::Prompt(format!("no answer for {}", field.name)))?;
            assert_eq!(name, field.name);
            Ok(value)
        }

        fn confirm(&mut self, _question: &str, default: bool) -> Result<bool, CliError> {
            Ok(self.confirms.pop_front().unwrap_or(default))
        }

        fn review(&mut self, _summary: &WizardSummary) -> Result<ReviewAction, CliError> {
            self.reviews
                .pop_front()
                .ok_or_else(|| CliError::Prompt("no review answer".to_string()))
        }

        fn show(&mut self, message: &str) {
            self.shown.push(message.to_string());
        }
    }

    fn template() -> FormTemplate {
        let steps: Vec<FormStep> = serde_json::from_value(json!([
            {
                "title": "Mieter",
                "fields": [
                    {"name": "tenant_name", "label": "Name", "type": "text", "required": true}
                ]
            },
            {
                "title": "Kaution",
                "fields": [
                    {"name": "deposit", "label": "Kaution", "type": "currency", "required": true},
                    {"name": "note", "label": "Notiz", "type": "text"}
                ]
            }
        ]))
        .unwrap();
        FormTemplate {
            slug: "kaution-rueckforderung".to_string(),
            steps: sqlx::types::Json(steps),
            ..Default::default()
        }
    }

    #[test]
    fn fills_every_step_and_saves() {
        let mut prompter = ScriptedPrompter::new(
            vec![
                ("tenant_name", json!("Erika Muster")),
                ("deposit", json!(2550.0)),
                ("note", json!("")),
            ],
            vec![],
            vec![ReviewAction::Save],
        );

        let outcome = run_wizard(&template(), Map::new(), &mut prompter).unwrap();
        let FillOutcome::Save { data, complete } = outcome else {
            panic!("expected save");
        };
        assert!(complete);
        assert_eq!(data["tenant_name"], "Erika Muster");
        assert_eq!(data["deposit"], 2550.0);
    }

    #[test]
    fn missing_required_field_repeats_the_step_with_the_message() {
        let mut prompter = ScriptedPrompter::new(
            vec![
                ("tenant_name", json!("")),
                ("tenant_name", json!("Erika")),
                ("deposit", json!(100)),
                ("note", json!(null)),
            ],
            vec![false],
            vec![ReviewAction::Save],
        );

        run_wizard(&template(), Map::new(), &mut prompter).unwrap();
        assert_eq!(prompter.seen_errors, vec!["Name ist ein Pflichtfeld".to_string()]);
        assert!(prompter.shown.iter().any(|m| m == "Name ist ein Pflichtfeld"));
    }

    #[test]
    fn continuing_anyway_saves_an_incomplete_draft() {
        let mut prompter = ScriptedPrompter::new(
            vec![
                ("tenant_name", json!("Erika")),
                ("deposit", json!(null)),
                ("note", json!(null)),
            ],
            vec![true],
            vec![ReviewAction::Save],
        );

        let outcome = run_wizard(&template(), Map::new(), &mut prompter).unwrap();
        assert!(matches!(outcome, FillOutcome::Save { complete: false, .. }));
    }

    #[test]
    fn edit_from_review_returns_to_that_step_only() {
        let mut prompter = ScriptedPrompter::new(
            vec![
                ("tenant_name", json!("Erika")),
                ("deposit", json!(100)),
                ("note", json!(null)),
                ("deposit", json!(300)),
                ("note", json!("bar")),
            ],
            vec![],
            vec![ReviewAction::Edit(1), ReviewAction::Save],
        );

        let outcome = run_wizard(&template(), Map::new(), &mut prompter).unwrap();
        let FillOutcome::Save { data, .. } = outcome else {
            panic!("expected save");
        };
        assert_eq!(data["deposit"], 300);
        assert_eq!(data["note"], "bar");
    }

    #[test]
    fn cancel_hands_back_the_data() {
        let existing = json!({"tenant_name": "Erika", "deposit": 1}).as_object().cloned().unwrap();
        let mut prompter = ScriptedPrompter::new(
            vec![
                ("tenant_name", json!("Erika")),
                ("deposit", json!(1)),
                ("note", json!(null)),
            ],
            vec![],
            vec![ReviewAction::Cancel],
        );

        let outcome = run_wizard(&template(), existing, &mut prompter).unwrap();
        assert!(matches!(outcome, FillOutcome::Cancelled { data } if data["tenant_name"] == "Erika"));
    }
}
