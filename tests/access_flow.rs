//! Anonymous visitor picks a paid form, is asked to log in, buys the bundle
//! and saves; afterwards the cross-sell hides the app they now own.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use mietrecht::cli::api_client::DocumentInfo;
use mietrecht::cli::drafts::{DraftPayload, DraftStore, MemoryDraftStore};
use mietrecht::cli::save_flow::{DocumentSink, SaveFlow, SaveState};
use mietrecht::cli::CliError;
use mietrecht::models::{
    CrossSellTrigger, Dismissal, DocumentStatus, FormPurchase, FormTemplate, PurchaseStatus,
    SubscriptionStatus, SubscriptionStatusView, Tier, User, UserSubscription,
};
use mietrecht::services::entitlement::memory::MemoryEntitlementStore;
use mietrecht::services::{
    AccessReason, BundleScope, CrossSellPolicy, DismissalStore, EntitlementResolver,
    MemoryDismissalStore,
};

fn paid_form() -> FormTemplate {
    FormTemplate {
        id: Uuid::from_u128(10),
        slug: "mietvertrag-wohnung".to_string(),
        name: "Mietvertrag Wohnung".to_string(),
        tier: Tier::Paid,
        price: 14.9,
        ..Default::default()
    }
}

/// Stands in for the documents endpoint: tokens map to users and the
/// entitlement check runs before anything is stored.
struct EntitledSink {
    resolver: EntitlementResolver<MemoryEntitlementStore>,
    sessions: HashMap<String, User>,
    form: FormTemplate,
    stored: Mutex<Vec<DraftPayload>>,
}

#[async_trait]
impl DocumentSink for EntitledSink {
    async fn store(&self, token: &str, payload: &DraftPayload) -> Result<DocumentInfo, CliError> {
        let user = self.sessions.get(token).ok_or(CliError::AuthRequired)?;
        let access = self.resolver.resolve(Some(user), &self.form).await;
        if !access.has_access {
            return Err(CliError::Api {
                status: 403,
                message: "No access to this form".to_string(),
            });
        }
        self.stored.lock().unwrap().push(payload.clone());
        Ok(DocumentInfo {
            id: Uuid::from_u128(99),
            form_template_id: self.form.id,
            title: payload.title.clone(),
            data: json!(payload.data),
            status: DocumentStatus::Draft,
            rendered_text: None,
        })
    }
}

fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        role: "group_user".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn deferred_save_goes_through_once_the_bundle_is_bought() {
    let form = paid_form();
    let bundle_id = Uuid::from_u128(500);
    let store = Arc::new(MemoryEntitlementStore::default());
    store.bundle_forms.lock().unwrap().insert(bundle_id, vec![form.id]);

    let resolver = EntitlementResolver::new(store.clone(), BundleScope::ContainingForm);
    assert!(!resolver.resolve(None, &form).await.has_access);

    let sink = EntitledSink {
        resolver: EntitlementResolver::new(store.clone(), BundleScope::ContainingForm),
        sessions: HashMap::from([("token-erika".to_string(), user("erika"))]),
        form: form.clone(),
        stored: Mutex::new(vec![]),
    };
    let drafts = Arc::new(MemoryDraftStore::default());
    let mut flow = SaveFlow::new(drafts.clone(), sink);

    let payload = DraftPayload::new(
        &form.slug,
        "Mietvertrag Musterstraße",
        json!({"landlord_name": "Max Vermieter"}).as_object().cloned().unwrap(),
    );

    // anonymous: parked until login
    let state = flow.save(None, payload.clone()).await.unwrap();
    assert!(matches!(state, SaveState::AuthRequired(_)));
    assert!(drafts.load_pending().unwrap().is_some());

    // logged in but nothing bought yet: the server refuses, the draft stays
    let state = flow.resume_after_auth("token-erika").await.unwrap();
    assert!(matches!(state, SaveState::Failed(msg) if msg.contains("No access")));
    assert!(drafts.load_draft(&form.slug).unwrap().is_some());

    store.purchases.lock().unwrap().push(FormPurchase {
        id: Uuid::new_v4(),
        user_id: "erika".to_string(),
        form_template_id: None,
        bundle_id: Some(bundle_id),
        status: PurchaseStatus::Completed,
        ..Default::default()
    });
    assert_eq!(
        resolver.resolve(Some(&user("erika")), &form).await.reason,
        AccessReason::Bundle
    );

    let state = flow.save(Some("token-erika"), payload).await.unwrap();
    assert!(matches!(state, SaveState::Saved(doc) if doc.id == Uuid::from_u128(99)));
    assert!(drafts.load_draft(&form.slug).unwrap().is_none());
    assert!(drafts.load_pending().unwrap().is_none());
}

#[tokio::test]
async fn cross_sell_skips_owned_and_dismissed_apps() {
    let now = Utc::now();
    let subscriptions = vec![UserSubscription {
        user_id: "erika".to_string(),
        product_code: "nebenkosten".to_string(),
        plan_code: "nebenkosten-yearly".to_string(),
        status: SubscriptionStatus::Active,
        current_period_end: Some(now + Duration::days(30)),
        ..Default::default()
    }];
    let status = SubscriptionStatusView::from_subscriptions(&subscriptions, now);
    let owned: HashSet<String> = status.owned_apps.into_iter().collect();

    let trigger = |id: u128, target: &str, priority: i32| CrossSellTrigger {
        id: Uuid::from_u128(id),
        source_app: "mietrecht".to_string(),
        target_app: target.to_string(),
        priority,
        is_active: true,
        ..Default::default()
    };
    let triggers = vec![
        trigger(1, "nebenkosten", 50),
        trigger(2, "kaution", 20),
        trigger(3, "umzug", 10),
    ];

    let dismissals = MemoryDismissalStore::default();
    let policy = CrossSellPolicy::default();

    let active = dismissals.load_active(&policy, now).unwrap();
    let first = policy.select(&triggers, &owned, &active, now).unwrap();
    assert_eq!(first.target_app, "kaution");

    dismissals.dismiss(first.id, now).unwrap();
    let active = dismissals.load_active(&policy, now).unwrap();
    let second = policy.select(&triggers, &owned, &active, now).unwrap();
    assert_eq!(second.target_app, "umzug");

    // a week later the dismissal has expired and is purged
    let later = now + Duration::days(7);
    let active: Vec<Dismissal> = dismissals.load_active(&policy, later).unwrap();
    assert!(active.is_empty());
    let again = policy.select(&triggers, &owned, &active, later).unwrap();
    assert_eq!(again.target_app, "kaution");
}
