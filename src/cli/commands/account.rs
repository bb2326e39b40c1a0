use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CallableTrait, Context};
use crate::cli::credentials::{login, HttpOAuthClient, LoginRequest};
use crate::cli::dismissals::FileDismissalStore;
use crate::cli::drafts::{DraftStore, FileDraftStore};
use crate::cli::error::CliError;
use crate::cli::prompt::DialoguerPrompter;
use crate::cli::subscription_watch::HttpSubscriptionSource;
use crate::models::SubscriptionStatusView;
use crate::services::{CrossSellPolicy, DismissalStore, SubscriptionPoller};

/// `mietrecht-cli login [--email ..]`
///
/// Prompts for the password on the terminal and stores the session in
/// `<config_dir>/credentials.json`.
pub struct LoginCommand {
    pub email: Option<String>,
}

#[async_trait]
impl CallableTrait for LoginCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let mut prompter = DialoguerPrompter;
        let email = match &self.email {
            Some(email) => email.clone(),
            None => prompter.text("E-Mail", "")?,
        };
        if email.trim().is_empty() {
            return Err(CliError::InvalidInput("email cannot be empty".to_string()));
        }
        let password = prompter.password("Passwort")?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password,
            auth_url: ctx.auth_url.clone(),
        };
        let creds = login(&ctx.credentials(), &HttpOAuthClient::new()?, &request).await?;
        eprintln!("✓ {creds}");

        if let Some(pending) = FileDraftStore::with_default_path().load_pending()? {
            eprintln!(
                "  Ungespeichertes Dokument \"{}\" wartet. Weiter mit: mietrecht-cli resume",
                pending.title
            );
        }
        Ok(())
    }
}

pub struct LogoutCommand;

#[async_trait]
impl CallableTrait for LogoutCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        ctx.credentials().logout()?;
        eprintln!("✓ Abgemeldet");
        Ok(())
    }
}

pub struct WhoamiCommand;

#[async_trait]
impl CallableTrait for WhoamiCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        match ctx.credentials().load()? {
            Some(creds) => println!("{creds}"),
            None => println!("Nicht angemeldet"),
        }
        Ok(())
    }
}

fn print_status(status: &SubscriptionStatusView) {
    if !status.active {
        println!("Kein aktives Abo");
        return;
    }
    let until = status
        .current_period_end
        .map(|end| format!(" bis {}", end.format("%d.%m.%Y")))
        .unwrap_or_default();
    println!(
        "✓ Abo {}{} ({})",
        status.plan_code.as_deref().unwrap_or("aktiv"),
        until,
        status.owned_apps.join(", ")
    );
}

/// `mietrecht-cli subscription [--watch]`
pub struct SubscriptionCommand {
    pub watch: bool,
    pub interval: Duration,
}

#[async_trait]
impl CallableTrait for SubscriptionCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let client = ctx.signed_in_client("subscription")?;

        if !self.watch {
            let status = client.subscription_status().await?;
            if ctx.json {
                return ctx.print_json(&status);
            }
            print_status(&status);
            return Ok(());
        }

        let mut poller =
            SubscriptionPoller::spawn(Arc::new(HttpSubscriptionSource::new(client)), self.interval);
        let mut updates = poller.subscribe();
        eprintln!("Abo wird beobachtet, Ende mit Strg+C");
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = updates.borrow_and_update().clone();
                    if let Some(status) = latest {
                        print_status(&status);
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        poller.stop();
        Ok(())
    }
}

/// `mietrecht-cli cross-sell [--app ..] [--dismiss <id>]`
pub struct CrossSellCommand {
    pub source_app: String,
    pub dismiss: Option<Uuid>,
}

#[async_trait]
impl CallableTrait for CrossSellCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let store = FileDismissalStore::with_default_path();
        let now = Utc::now();

        if let Some(trigger_id) = self.dismiss {
            store.dismiss(trigger_id, now).map_err(CliError::Storage)?;
            eprintln!("✓ Empfehlung ausgeblendet");
            return Ok(());
        }

        let client = ctx.client()?;
        let offers = client.cross_sell(&self.source_app).await?;
        let owned: HashSet<String> = if client.has_token() {
            client
                .subscription_status()
                .await
                .map(|status| status.owned_apps.into_iter().collect())
                .unwrap_or_else(|err| {
                    tracing::debug!(error = %err, "owned apps unavailable");
                    HashSet::new()
                })
        } else {
            HashSet::new()
        };

        let policy = offers
            .dismissal_ttl_days
            .map(CrossSellPolicy::with_ttl_days)
            .unwrap_or_default();
        let dismissals = store.load_active(&policy, now).map_err(CliError::Storage)?;
        let selected = policy.select(&offers.triggers, &owned, &dismissals, now);

        if ctx.json {
            return ctx.print_json(&selected);
        }
        match selected {
            Some(trigger) => {
                println!("{}", trigger.headline);
                println!("{}", trigger.message);
                if let (Some(text), Some(url)) = (&trigger.cta_text, &trigger.cta_url) {
                    println!("→ {text}: {url}");
                }
                println!("(ausblenden: mietrecht-cli cross-sell --dismiss {})", trigger.id);
            }
            None => println!("Keine Empfehlung"),
        }
        Ok(())
    }
}
