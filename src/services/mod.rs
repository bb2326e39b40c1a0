pub mod bundle_pricing;
pub mod cross_sell;
pub mod document_renderer;
pub mod entitlement;
pub mod subscription_poller;

pub use bundle_pricing::{price_bundle, price_bundles, BundleFormsSource};
pub use cross_sell::{select_trigger, CrossSellPolicy, DismissalStore, MemoryDismissalStore};
pub use document_renderer::render_document;
pub use entitlement::{
    AccessReason, BundleScope, EntitlementResolver, EntitlementStore, FormAccess,
};
pub use subscription_poller::{SubscriptionPoller, SubscriptionSource, DEFAULT_POLL_INTERVAL};
