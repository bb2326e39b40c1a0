use serde::{Deserialize, Serialize};

/// Position of a user inside a multi-step wizard. The last position
/// (`step_count`) is the review page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    step_count: usize,
    current: usize,
}

impl WizardState {
    pub fn new(step_count: usize) -> Self {
        Self {
            step_count,
            current: 0,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_review(&self) -> bool {
        self.current == self.step_count
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    /// Advance one step. Returns false when already on the review page.
    pub fn next(&mut self) -> bool {
        if self.current < self.step_count {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn back(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a step, e.g. from the summary's edit link.
    pub fn go_to(&mut self, step: usize) -> Result<(), String> {
        if step > self.step_count {
            return Err(format!(
                "step {} out of range (0..={})",
                step, self.step_count
            ));
        }
        self.current = step;
        Ok(())
    }

    /// Progress in percent, the review page counts as 100.
    pub fn progress_percent(&self) -> u8 {
        if self.step_count == 0 {
            return 100;
        }
        ((self.current * 100) / self.step_count) as u8
    }
}
