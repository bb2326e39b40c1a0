pub mod bundle;
pub mod cross_sell;
pub mod document;
pub mod entitlement;
pub mod form_template;
pub mod product;
pub mod purchase;
pub mod subscription;
