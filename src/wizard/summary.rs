use serde::Serialize;

/// One row of the review page. `empty` is computed by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryItem {
    pub label: String,
    pub value: String,
    pub required: bool,
    pub empty: bool,
}

impl SummaryItem {
    pub fn is_missing(&self) -> bool {
        self.required && self.empty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySection {
    pub step_index: usize,
    pub title: String,
    pub items: Vec<SummaryItem>,
}

impl SummarySection {
    pub fn is_complete(&self) -> bool {
        !self.items.iter().any(SummaryItem::is_missing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionStatus {
    pub step_index: usize,
    pub title: String,
    pub complete: bool,
    pub items: Vec<SummaryItem>,
    /// Labels of required items without a value.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardSummary {
    pub sections: Vec<SectionStatus>,
    pub all_complete: bool,
    pub incomplete_count: usize,
}

impl WizardSummary {
    pub fn compute(sections: Vec<SummarySection>) -> Self {
        let sections: Vec<SectionStatus> = sections
            .into_iter()
            .map(|section| {
                let complete = section.is_complete();
                let missing = section
                    .items
                    .iter()
                    .filter(|item| item.is_missing())
                    .map(|item| item.label.clone())
                    .collect();
                SectionStatus {
                    step_index: section.step_index,
                    title: section.title,
                    complete,
                    items: section.items,
                    missing,
                }
            })
            .collect();

        let incomplete_count = sections.iter().filter(|section| !section.complete).count();

        WizardSummary {
            all_complete: incomplete_count == 0,
            incomplete_count,
            sections,
        }
    }

    /// Step to jump back to when the user edits the given section.
    pub fn edit_target(&self, section: usize) -> Option<usize> {
        self.sections.get(section).map(|status| status.step_index)
    }

    /// First section that still needs input.
    pub fn first_incomplete(&self) -> Option<&SectionStatus> {
        self.sections.iter().find(|section| !section.complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, required: bool, empty: bool) -> SummaryItem {
        SummaryItem {
            label: label.to_string(),
            value: if empty { String::new() } else { "x".to_string() },
            required,
            empty,
        }
    }

    fn section(step_index: usize, items: Vec<SummaryItem>) -> SummarySection {
        SummarySection {
            step_index,
            title: format!("Schritt {}", step_index + 1),
            items,
        }
    }

    #[test]
    fn optional_empty_items_do_not_block_completion() {
        let summary = WizardSummary::compute(vec![section(
            0,
            vec![item("Name", true, false), item("Telefon", false, true)],
        )]);
        assert!(summary.all_complete);
        assert_eq!(summary.incomplete_count, 0);
    }

    #[test]
    fn required_empty_items_mark_the_section_incomplete() {
        let summary = WizardSummary::compute(vec![
            section(0, vec![item("Name", true, false)]),
            section(1, vec![item("Mietbeginn", true, true), item("Kaltmiete", true, true)]),
            section(2, vec![item("IBAN", true, true)]),
        ]);
        assert!(!summary.all_complete);
        assert_eq!(summary.incomplete_count, 2);
        assert_eq!(summary.sections[1].missing, vec!["Mietbeginn", "Kaltmiete"]);
        assert_eq!(summary.first_incomplete().map(|s| s.step_index), Some(1));
    }

    #[test]
    fn no_sections_means_complete() {
        let summary = WizardSummary::compute(vec![]);
        assert!(summary.all_complete);
        assert_eq!(summary.incomplete_count, 0);
    }

    #[test]
    fn edit_targets_the_section_step() {
        let summary = WizardSummary::compute(vec![section(0, vec![]), section(3, vec![])]);
        assert_eq!(summary.edit_target(1), Some(3));
        assert_eq!(summary.edit_target(5), None);
    }
}
