//! Data-driven form wizard: field rendering, validation and completion summary.

pub mod field;
pub mod schema;
pub mod state;
pub mod summary;

pub use field::{apply_change, render_field, Control, FieldChange, RenderedField};
pub use schema::{build_summary, is_empty_value, render_step, validate};
pub use state::WizardState;
pub use summary::{SectionStatus, SummaryItem, SummarySection, WizardSummary};
