pub mod bundle;
pub mod calculator;
pub mod cross_sell;
pub mod document;
pub mod form;
pub mod health_checks;
pub mod maps;
pub mod purchase;
pub mod subscription;
pub mod validate;

pub use health_checks::*;
