pub mod format;
pub(crate) mod json;
pub mod validation;

pub use json::*;
