use crate::db::form_template::CatalogFilter;
use crate::models::{Persona, Tier};
use serde::Deserialize;

/// Query string of the catalog listing.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub persona: Option<Persona>,
    pub tier: Option<Tier>,
}

impl From<CatalogQuery> for CatalogFilter {
    fn from(query: CatalogQuery) -> Self {
        CatalogFilter {
            category: query.category.filter(|category| !category.trim().is_empty()),
            persona: query.persona,
            tier: query.tier,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AutocompleteQuery {
    pub input: String,
    pub session: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SessionQuery {
    pub session: Option<String>,
}
