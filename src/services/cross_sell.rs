use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{CrossSellTrigger, Dismissal, Product};

pub const DEFAULT_DISMISSAL_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy)]
pub struct CrossSellPolicy {
    pub dismissal_ttl: Duration,
}

impl Default for CrossSellPolicy {
    fn default() -> Self {
        Self::with_ttl_days(DEFAULT_DISMISSAL_TTL_DAYS)
    }
}

impl CrossSellPolicy {
    pub fn with_ttl_days(days: i64) -> Self {
        Self {
            dismissal_ttl: Duration::days(days.max(0)),
        }
    }

    pub fn is_expired(&self, dismissal: &Dismissal, now: DateTime<Utc>) -> bool {
        now - dismissal.dismissed_at >= self.dismissal_ttl
    }

    /// Highest priority trigger that is neither owned nor recently dismissed.
    /// Equal priorities resolve to the lowest id.
    pub fn select<'a>(
        &self,
        triggers: &'a [CrossSellTrigger],
        owned_apps: &HashSet<String>,
        dismissals: &[Dismissal],
        now: DateTime<Utc>,
    ) -> Option<&'a CrossSellTrigger> {
        let dismissed: HashSet<Uuid> = dismissals
            .iter()
            .filter(|dismissal| !self.is_expired(dismissal, now))
            .map(|dismissal| dismissal.trigger_id)
            .collect();

        triggers
            .iter()
            .filter(|trigger| trigger.is_active)
            .filter(|trigger| !owned_apps.contains(&trigger.target_app))
            .filter(|trigger| !dismissed.contains(&trigger.id))
            .min_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)))
    }
}

/// [`CrossSellPolicy::select`] with the default seven day dismissal window.
pub fn select_trigger<'a>(
    triggers: &'a [CrossSellTrigger],
    owned_apps: &HashSet<String>,
    dismissals: &[Dismissal],
    now: DateTime<Utc>,
) -> Option<&'a CrossSellTrigger> {
    CrossSellPolicy::default().select(triggers, owned_apps, dismissals, now)
}

/// Drop triggers pointing at apps the user already owns.
pub fn without_owned(
    triggers: Vec<CrossSellTrigger>,
    owned_apps: &HashSet<String>,
) -> Vec<CrossSellTrigger> {
    triggers
        .into_iter()
        .filter(|trigger| !owned_apps.contains(&trigger.target_app))
        .collect()
}

/// Triggers without their own link point at the landing page of the target app.
pub fn with_product_links(
    mut triggers: Vec<CrossSellTrigger>,
    products: &[Product],
) -> Vec<CrossSellTrigger> {
    for trigger in triggers.iter_mut().filter(|trigger| trigger.cta_url.is_none()) {
        trigger.cta_url = products
            .iter()
            .find(|product| product.code == trigger.target_app)
            .and_then(|product| product.url.clone());
    }
    triggers
}

/// Persistent set of dismissals, last write wins.
pub trait DismissalStore {
    fn load(&self) -> Result<Vec<Dismissal>, String>;

    fn store(&self, dismissals: &[Dismissal]) -> Result<(), String>;

    /// Dismissals still in effect. Expired entries are purged and written back.
    fn load_active(
        &self,
        policy: &CrossSellPolicy,
        now: DateTime<Utc>,
    ) -> Result<Vec<Dismissal>, String> {
        let all = self.load()?;
        let total = all.len();
        let active: Vec<Dismissal> = all
            .into_iter()
            .filter(|dismissal| !policy.is_expired(dismissal, now))
            .collect();
        if active.len() != total {
            tracing::debug!(purged = total - active.len(), "purging expired dismissals");
            self.store(&active)?;
        }
        Ok(active)
    }

    fn dismiss(&self, trigger_id: Uuid, now: DateTime<Utc>) -> Result<(), String> {
        let mut dismissals = self.load()?;
        dismissals.retain(|dismissal| dismissal.trigger_id != trigger_id);
        dismissals.push(Dismissal {
            trigger_id,
            dismissed_at: now,
        });
        self.store(&dismissals)
    }
}

#[derive(Default)]
pub struct MemoryDismissalStore {
    entries: std::sync::Mutex<Vec<Dismissal>>,
}

impl DismissalStore for MemoryDismissalStore {
    fn load(&self) -> Result<Vec<Dismissal>, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| err.to_string())
    }

    fn store(&self, dismissals: &[Dismissal]) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|err| err.to_string())?;
        *entries = dismissals.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn trigger(id: u128, target: &str, priority: i32) -> CrossSellTrigger {
        CrossSellTrigger {
            id: Uuid::from_u128(id),
            source_app: "mietrecht".to_string(),
            target_app: target.to_string(),
            priority,
            is_active: true,
            ..Default::default()
        }
    }

    fn owned(apps: &[&str]) -> HashSet<String> {
        apps.iter().map(|app| app.to_string()).collect()
    }

    #[test]
    fn highest_priority_wins() {
        let triggers = vec![trigger(1, "kaution", 5), trigger(2, "nebenkosten", 10)];
        let selected = select_trigger(&triggers, &owned(&[]), &[], now());
        assert_eq!(selected.map(|t| t.id), Some(Uuid::from_u128(2)));
    }

    #[test]
    fn ties_resolve_to_lowest_id() {
        let triggers = vec![trigger(9, "kaution", 5), trigger(3, "nebenkosten", 5)];
        let selected = select_trigger(&triggers, &owned(&[]), &[], now());
        assert_eq!(selected.map(|t| t.id), Some(Uuid::from_u128(3)));
    }

    #[test]
    fn owned_targets_are_suppressed() {
        let triggers = vec![trigger(1, "kaution", 5), trigger(2, "nebenkosten", 10)];
        let selected = select_trigger(&triggers, &owned(&["nebenkosten"]), &[], now());
        assert_eq!(selected.map(|t| t.id), Some(Uuid::from_u128(1)));

        let selected = select_trigger(&triggers, &owned(&["nebenkosten", "kaution"]), &[], now());
        assert!(selected.is_none());
    }

    #[test]
    fn recent_dismissals_suppress_and_old_ones_expire() {
        let triggers = vec![trigger(1, "kaution", 5), trigger(2, "nebenkosten", 10)];
        let recent = Dismissal {
            trigger_id: Uuid::from_u128(2),
            dismissed_at: now() - Duration::days(6),
        };
        let selected = select_trigger(&triggers, &owned(&[]), &[recent], now());
        assert_eq!(selected.map(|t| t.id), Some(Uuid::from_u128(1)));

        let old = Dismissal {
            trigger_id: Uuid::from_u128(2),
            dismissed_at: now() - Duration::days(8),
        };
        let selected = select_trigger(&triggers, &owned(&[]), &[old], now());
        assert_eq!(selected.map(|t| t.id), Some(Uuid::from_u128(2)));
    }

    #[test]
    fn inactive_triggers_are_ignored() {
        let mut inactive = trigger(1, "kaution", 50);
        inactive.is_active = false;
        let triggers = vec![inactive, trigger(2, "nebenkosten", 1)];
        let selected = select_trigger(&triggers, &owned(&[]), &[], now());
        assert_eq!(selected.map(|t| t.id), Some(Uuid::from_u128(2)));
    }

    #[test]
    fn load_active_purges_expired_entries() {
        let store = MemoryDismissalStore::default();
        store
            .store(&[
                Dismissal {
                    trigger_id: Uuid::from_u128(1),
                    dismissed_at: now() - Duration::days(10),
                },
                Dismissal {
                    trigger_id: Uuid::from_u128(2),
                    dismissed_at: now() - Duration::days(1),
                },
            ])
            .unwrap();

        let active = store.load_active(&CrossSellPolicy::default(), now()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(store.load().unwrap().len(), 1);
        assert_eq!(store.load().unwrap()[0].trigger_id, Uuid::from_u128(2));
    }

    #[test]
    fn dismiss_is_last_write_wins() {
        let store = MemoryDismissalStore::default();
        store.dismiss(Uuid::from_u128(1), now() - Duration::days(3)).unwrap();
        store.dismiss(Uuid::from_u128(1), now()).unwrap();
        let all = store.load().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].dismissed_at, now());
    }

    #[test]
    fn missing_links_point_at_the_product_page() {
        let mut linked = trigger(1, "kaution", 5);
        linked.cta_url = Some("https://kaution.example.de/aktion".to_string());
        let triggers = vec![linked, trigger(2, "nebenkosten", 10), trigger(3, "umzug", 1)];
        let products = vec![
            Product {
                code: "kaution".to_string(),
                url: Some("https://kaution.example.de".to_string()),
                ..Default::default()
            },
            Product {
                code: "nebenkosten".to_string(),
                url: Some("https://nebenkosten.example.de".to_string()),
                ..Default::default()
            },
        ];

        let triggers = with_product_links(triggers, &products);
        assert_eq!(triggers[0].cta_url.as_deref(), Some("https://kaution.example.de/aktion"));
        assert_eq!(triggers[1].cta_url.as_deref(), Some("https://nebenkosten.example.de"));
        assert_eq!(triggers[2].cta_url, None);
    }
}
