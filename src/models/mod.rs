mod bundle;
mod cross_sell;
mod document;
mod form_template;
mod product;
mod purchase;
mod subscription;
pub mod user;

pub use bundle::*;
pub use cross_sell::*;
pub use document::*;
pub use form_template::*;
pub use product::*;
pub use purchase::*;
pub use subscription::*;
pub use user::*;
