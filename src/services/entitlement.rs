//! Form access decisions.
//!
//! Anonymous callers only get free-tier forms. Authenticated callers are
//! checked against the `user_available_forms` view first; for paid forms the
//! reason is found by running the probes in [`PROBES`] order until one
//! reports a match.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{FormPurchase, FormTemplate, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessReason {
    Free,
    Purchased,
    Bundle,
    Subscription,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAccess {
    pub has_access: bool,
    pub reason: AccessReason,
}

impl FormAccess {
    pub fn granted(reason: AccessReason) -> Self {
        Self {
            has_access: true,
            reason,
        }
    }

    pub fn denied() -> Self {
        Self {
            has_access: false,
            reason: AccessReason::None,
        }
    }
}

/// Which bundle purchases count for the last probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BundleScope {
    /// Any completed bundle purchase.
    #[default]
    Any,
    /// Only bundles that contain the requested form.
    ContainingForm,
}

/// Lookups the resolver needs. Implemented over Postgres in `db::entitlement`.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn is_available(&self, user_id: &str, form_id: Uuid) -> Result<bool, String>;

    async fn completed_form_purchase(
        &self,
        user_id: &str,
        form_id: Uuid,
    ) -> Result<Option<FormPurchase>, String>;

    async fn has_active_subscription(&self, user_id: &str) -> Result<bool, String>;

    /// `containing` restricts the lookup to bundles holding that form.
    async fn has_completed_bundle_purchase(
        &self,
        user_id: &str,
        containing: Option<Uuid>,
    ) -> Result<bool, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    DirectPurchase,
    ActiveSubscription,
    BundlePurchase,
}

/// Precedence: explicit purchase, then subscription, then bundle.
pub const PROBES: [Probe; 3] = [
    Probe::DirectPurchase,
    Probe::ActiveSubscription,
    Probe::BundlePurchase,
];

impl Probe {
    pub async fn check<S: EntitlementStore + ?Sized>(
        &self,
        store: &S,
        scope: BundleScope,
        user_id: &str,
        form_id: Uuid,
    ) -> Result<Option<AccessReason>, String> {
        match self {
            Probe::DirectPurchase => Ok(store
                .completed_form_purchase(user_id, form_id)
                .await?
                .map(|purchase| {
                    if purchase.from_bundle() {
                        AccessReason::Bundle
                    } else {
                        AccessReason::Purchased
                    }
                })),
            Probe::ActiveSubscription => Ok(store
                .has_active_subscription(user_id)
                .await?
                .then_some(AccessReason::Subscription)),
            Probe::BundlePurchase => {
                let containing = match scope {
                    BundleScope::Any => None,
                    BundleScope::ContainingForm => Some(form_id),
                };
                Ok(store
                    .has_completed_bundle_purchase(user_id, containing)
                    .await?
                    .then_some(AccessReason::Bundle))
            }
        }
    }
}

pub struct EntitlementResolver<S: ?Sized> {
    store: std::sync::Arc<S>,
    scope: BundleScope,
}

impl<S: EntitlementStore + ?Sized> EntitlementResolver<S> {
    pub fn new(store: std::sync::Arc<S>, scope: BundleScope) -> Self {
        Self { store, scope }
    }

    /// Decide access of `user` (None when anonymous) to `form`.
    /// Store failures fall back to the anonymous policy.
    #[tracing::instrument(name = "Resolve form access", skip_all, fields(form = %form.slug))]
    pub async fn resolve(&self, user: Option<&User>, form: &FormTemplate) -> FormAccess {
        let Some(user) = user else {
            return anonymous_access(form);
        };

        match self.resolve_for(&user.id, form).await {
            Ok(access) => access,
            Err(err) => {
                tracing::error!(user = %user.id, "entitlement lookup failed: {}", err);
                anonymous_access(form)
            }
        }
    }

    async fn resolve_for(&self, user_id: &str, form: &FormTemplate) -> Result<FormAccess, String> {
        if !self.store.is_available(user_id, form.id).await? {
            return Ok(FormAccess::denied());
        }
        if form.tier.is_free() {
            return Ok(FormAccess::granted(AccessReason::Free));
        }

        for probe in PROBES.iter() {
            if let Some(reason) = probe
                .check(self.store.as_ref(), self.scope, user_id, form.id)
                .await?
            {
                tracing::debug!(?probe, ?reason, "access probe matched");
                return Ok(FormAccess::granted(reason));
            }
        }

        Ok(FormAccess::granted(AccessReason::None))
    }
}

pub fn anonymous_access(form: &FormTemplate) -> FormAccess {
    if form.tier.is_free() {
        FormAccess::granted(AccessReason::Free)
    } else {
        FormAccess::denied()
    }
}

pub mod memory {
    //! In-memory store used by tests.
    use super::*;
    use crate::models::PurchaseStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryEntitlementStore {
        pub purchases: Mutex<Vec<FormPurchase>>,
        pub bundle_forms: Mutex<HashMap<Uuid, Vec<Uuid>>>,
        pub subscribers: Mutex<Vec<String>>,
        pub free_forms: Mutex<Vec<Uuid>>,
        pub failing: bool,
    }

    impl MemoryEntitlementStore {
        fn fail(&self) -> Result<(), String> {
            if self.failing {
                Err("store unavailable".to_string())
            } else {
                Ok(())
            }
        }

        fn completed(&self, user_id: &str) -> Vec<FormPurchase> {
            self.purchases
                .lock()
                .map(|purchases| {
                    purchases
                        .iter()
                        .filter(|p| p.user_id == user_id && p.status == PurchaseStatus::Completed)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl EntitlementStore for MemoryEntitlementStore {
        async fn is_available(&self, user_id: &str, form_id: Uuid) -> Result<bool, String> {
            self.fail()?;
            let free = self
                .free_forms
                .lock()
                .map_err(|err| err.to_string())?
                .contains(&form_id);
            let purchased = self
                .completed(user_id)
                .iter()
                .any(|p| p.form_template_id == Some(form_id));
            let in_bundle = {
                let bundles = self.bundle_forms.lock().map_err(|err| err.to_string())?;
                self.completed(user_id).iter().any(|p| {
                    p.form_template_id.is_none()
                        && p.bundle_id
                            .and_then(|id| bundles.get(&id))
                            .map_or(false, |forms| forms.contains(&form_id))
                })
            };
            let subscribed = self.has_active_subscription(user_id).await?;
            Ok(free || purchased || in_bundle || subscribed)
        }

        async fn completed_form_purchase(
            &self,
            user_id: &str,
            form_id: Uuid,
        ) -> Result<Option<FormPurchase>, String> {
            self.fail()?;
            Ok(self
                .completed(user_id)
                .into_iter()
                .find(|p| p.form_template_id == Some(form_id)))
        }

        async fn has_active_subscription(&self, user_id: &str) -> Result<bool, String> {
            self.fail()?;
            Ok(self
                .subscribers
                .lock()
                .map_err(|err| err.to_string())?
                .iter()
                .any(|id| id == user_id))
        }

        async fn has_completed_bundle_purchase(
            &self,
            user_id: &str,
            containing: Option<Uuid>,
        ) -> Result<bool, String> {
            self.fail()?;
            let bundles = self.bundle_forms.lock().map_err(|err| err.to_string())?;
            Ok(self.completed(user_id).iter().any(|p| {
                p.form_template_id.is_none()
                    && match (p.bundle_id, containing) {
                        (Some(_), None) => true,
                        (Some(bundle), Some(form)) => bundles
                            .get(&bundle)
                            .map_or(false, |forms| forms.contains(&form)),
                        (None, _) => false,
                    }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryEntitlementStore;
    use super::*;
    use crate::models::{PurchaseStatus, Tier};
    use std::sync::Arc;

    fn form(tier: Tier) -> FormTemplate {
        FormTemplate {
            id: Uuid::new_v4(),
            slug: "mietvertrag-wohnung".to_string(),
            tier,
            ..Default::default()
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn purchase(user_id: &str, form_id: Option<Uuid>, bundle_id: Option<Uuid>) -> FormPurchase {
        FormPurchase {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            form_template_id: form_id,
            bundle_id,
            status: PurchaseStatus::Completed,
            ..Default::default()
        }
    }

    fn resolver(store: MemoryEntitlementStore, scope: BundleScope) -> EntitlementResolver<MemoryEntitlementStore> {
        EntitlementResolver::new(Arc::new(store), scope)
    }

    #[tokio::test]
    async fn anonymous_users_only_get_free_forms() {
        let resolver = resolver(MemoryEntitlementStore::default(), BundleScope::Any);
        assert_eq!(
            resolver.resolve(None, &form(Tier::Free)).await,
            FormAccess::granted(AccessReason::Free)
        );
        assert_eq!(resolver.resolve(None, &form(Tier::Paid)).await, FormAccess::denied());
    }

    #[tokio::test]
    async fn unavailable_forms_are_denied() {
        let resolver = resolver(MemoryEntitlementStore::default(), BundleScope::Any);
        let access = resolver.resolve(Some(&user("u1")), &form(Tier::Paid)).await;
        assert_eq!(access, FormAccess::denied());
    }

    #[tokio::test]
    async fn free_forms_report_free_for_members() {
        let free = form(Tier::Free);
        let store = MemoryEntitlementStore::default();
        store.free_forms.lock().unwrap().push(free.id);
        let access = resolver(store, BundleScope::Any).resolve(Some(&user("u1")), &free).await;
        assert_eq!(access, FormAccess::granted(AccessReason::Free));
    }

    #[tokio::test]
    async fn direct_purchase_wins_over_subscription() {
        let paid = form(Tier::Paid);
        let store = MemoryEntitlementStore::default();
        store.purchases.lock().unwrap().push(purchase("u1", Some(paid.id), None));
        store.subscribers.lock().unwrap().push("u1".to_string());

        let access = resolver(store, BundleScope::Any).resolve(Some(&user("u1")), &paid).await;
        assert_eq!(access, FormAccess::granted(AccessReason::Purchased));
    }

    #[tokio::test]
    async fn bundle_origin_purchase_reports_bundle() {
        let paid = form(Tier::Paid);
        let store = MemoryEntitlementStore::default();
        store
            .purchases
            .lock()
            .unwrap()
            .push(purchase("u1", Some(paid.id), Some(Uuid::new_v4())));
        store.subscribers.lock().unwrap().push("u1".to_string());

        let access = resolver(store, BundleScope::Any).resolve(Some(&user("u1")), &paid).await;
        assert_eq!(access, FormAccess::granted(AccessReason::Bundle));
    }

    #[tokio::test]
    async fn subscription_wins_over_bundle() {
        let paid = form(Tier::Paid);
        let bundle = Uuid::new_v4();
        let store = MemoryEntitlementStore::default();
        store.bundle_forms.lock().unwrap().insert(bundle, vec![paid.id]);
        store.purchases.lock().unwrap().push(purchase("u1", None, Some(bundle)));
        store.subscribers.lock().unwrap().push("u1".to_string());

        let access = resolver(store, BundleScope::Any).resolve(Some(&user("u1")), &paid).await;
        assert_eq!(access, FormAccess::granted(AccessReason::Subscription));
    }

    #[tokio::test]
    async fn bundle_scope_controls_unrelated_bundles() {
        let paid = form(Tier::Paid);
        let other = Uuid::new_v4();
        let unrelated_bundle = Uuid::new_v4();

        let make_store = || {
            let store = MemoryEntitlementStore::default();
            store.bundle_forms.lock().unwrap().insert(unrelated_bundle, vec![other]);
            store
                .purchases
                .lock()
                .unwrap()
                .push(purchase("u1", None, Some(unrelated_bundle)));
            // the view grants access through a second route
            store.free_forms.lock().unwrap().push(paid.id);
            store
        };

        let lenient = resolver(make_store(), BundleScope::Any)
            .resolve(Some(&user("u1")), &paid)
            .await;
        assert_eq!(lenient, FormAccess::granted(AccessReason::Bundle));

        let strict = resolver(make_store(), BundleScope::ContainingForm)
            .resolve(Some(&user("u1")), &paid)
            .await;
        assert_eq!(strict, FormAccess::granted(AccessReason::None));
    }

    #[tokio::test]
    async fn store_failure_falls_back_to_free_tier_policy() {
        let store = MemoryEntitlementStore {
            failing: true,
            ..Default::default()
        };
        let resolver = resolver(store, BundleScope::Any);
        assert_eq!(
            resolver.resolve(Some(&user("u1")), &form(Tier::Free)).await,
            FormAccess::granted(AccessReason::Free)
        );
        assert_eq!(
            resolver.resolve(Some(&user("u1")), &form(Tier::Paid)).await,
            FormAccess::denied()
        );
    }

    #[test]
    fn probes_run_in_precedence_order() {
        assert_eq!(
            PROBES,
            [
                Probe::DirectPurchase,
                Probe::ActiveSubscription,
                Probe::BundlePurchase
            ]
        );
    }
}
