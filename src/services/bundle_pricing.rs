use async_trait::async_trait;
use futures::future::try_join_all;
use uuid::Uuid;

use crate::helpers::format::round_cents;
use crate::models::{Bundle, BundlePricing, FormTemplate};

/// Source of the forms contained in a bundle.
#[async_trait]
pub trait BundleFormsSource: Send + Sync {
    async fn forms_of(&self, bundle_id: Uuid) -> Result<Vec<FormTemplate>, String>;
}

/// Savings of a bundle against buying its forms one by one.
pub fn price_bundle(bundle: Bundle, forms: Vec<FormTemplate>) -> BundlePricing {
    let individual_cents: i64 = forms
        .iter()
        .map(|form| (form.price * 100.0).round() as i64)
        .sum();
    let bundle_cents = (bundle.price * 100.0).round() as i64;
    let savings_cents = individual_cents - bundle_cents;

    let savings_percent = if individual_cents > 0 {
        ((savings_cents as f64 / individual_cents as f64) * 1000.0).round() / 10.0
    } else {
        0.0
    };

    BundlePricing {
        bundle,
        forms,
        individual_total: individual_cents as f64 / 100.0,
        savings: round_cents(savings_cents as f64 / 100.0),
        savings_percent,
    }
}

/// Fetch the forms of every bundle concurrently and price them.
/// One failing fetch fails the whole result.
#[tracing::instrument(name = "Price bundles", skip_all, fields(count = bundles.len()))]
pub async fn price_bundles<S: BundleFormsSource + ?Sized>(
    source: &S,
    bundles: Vec<Bundle>,
) -> Result<Vec<BundlePricing>, String> {
    let fetches = bundles.iter().map(|bundle| source.forms_of(bundle.id));
    let forms = try_join_all(fetches).await?;

    Ok(bundles
        .into_iter()
        .zip(forms)
        .map(|(bundle, forms)| price_bundle(bundle, forms))
        .collect())
}
