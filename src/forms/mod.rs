pub mod calculator;
pub mod catalog;
pub mod document;
pub mod user;

pub use calculator::*;
pub use catalog::*;
pub use document::*;
pub use user::{PasswordCheckForm, UserForm};
