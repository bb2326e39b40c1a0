pub mod calculator;
pub mod document;
pub mod form;

pub use document::{CompletionView, DocumentView, RenderedView};
pub use form::{FormDetail, FormSummary};
