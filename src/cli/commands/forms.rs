use async_trait::async_trait;

use super::{CallableTrait, Context};
use crate::cli::api_client::FormInfo;
use crate::cli::error::CliError;
use crate::cli::progress;
use crate::helpers::format::format_currency;
use crate::models::Tier;
use crate::services::AccessReason;

fn price_label(form: &FormInfo) -> String {
    match form.tier {
        Tier::Free => "kostenlos".to_string(),
        Tier::Paid => format_currency(form.price),
    }
}

fn reason_label(reason: AccessReason) -> &'static str {
    match reason {
        AccessReason::Free => "kostenlos",
        AccessReason::Purchased => "gekauft",
        AccessReason::Bundle => "über ein Paket",
        AccessReason::Subscription => "im Abo enthalten",
        AccessReason::None => "kein Zugriff",
    }
}

/// `mietrecht-cli forms list [--category ..] [--persona ..] [--tier ..] [--available]`
pub struct ListFormsCommand {
    pub category: Option<String>,
    pub persona: Option<String>,
    pub tier: Option<String>,
    pub available: bool,
}

#[async_trait]
impl CallableTrait for ListFormsCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let forms = if self.available {
            ctx.signed_in_client("available forms")?.available_forms().await?
        } else {
            let query: Vec<(&str, String)> = [
                ("category", &self.category),
                ("persona", &self.persona),
                ("tier", &self.tier),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|value| (key, value)))
            .collect();
            ctx.client()?.list_forms(&query).await?
        };

        if ctx.json {
            return ctx.print_json(&forms);
        }
        if forms.is_empty() {
            println!("Keine Formulare gefunden");
        }
        for form in &forms {
            println!(
                "{:<32} {:<40} {:<12} {}",
                form.slug,
                form.name,
                form.category,
                price_label(form)
            );
        }
        Ok(())
    }
}

/// `mietrecht-cli forms show <slug>`
pub struct ShowFormCommand {
    pub slug: String,
}

#[async_trait]
impl CallableTrait for ShowFormCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let form = ctx.client()?.get_form(&self.slug).await?;
        if ctx.json {
            return ctx.print_json(&form);
        }

        println!("{} ({})", form.name, price_label(&form));
        if let Some(description) = &form.description {
            println!("{description}");
        }
        println!("{} Schritte, {} Felder", form.step_count, form.field_count);
        if let Some(access) = form.access {
            println!("Zugriff: {}", reason_label(access.reason));
        }
        for (index, step) in form.steps.iter().flatten().enumerate() {
            println!("  {}. {}", index + 1, step.title);
            for field in &step.fields {
                let required = if field.required { " *" } else { "" };
                println!("       {}{} [{}]", field.label, required, field.field_type);
            }
        }
        Ok(())
    }
}

/// `mietrecht-cli access <slug>`
pub struct AccessCommand {
    pub slug: String,
}

#[async_trait]
impl CallableTrait for AccessCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let access = ctx.client()?.form_access(&self.slug).await?;
        if ctx.json {
            return ctx.print_json(&access);
        }
        let mark = if access.has_access { "✓" } else { "✗" };
        println!("{mark} {} ({})", self.slug, reason_label(access.reason));
        Ok(())
    }
}

/// `mietrecht-cli bundles`
pub struct BundlesCommand;

#[async_trait]
impl CallableTrait for BundlesCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let pb = progress::spinner("Pakete werden geladen...");
        let bundles = match ctx.client()?.list_bundles().await {
            Ok(bundles) => {
                progress::finish_success(&pb, &format!("{} Pakete", bundles.len()));
                bundles
            }
            Err(err) => {
                progress::finish_error(&pb, "Pakete konnten nicht geladen werden");
                return Err(err);
            }
        };
        if ctx.json {
            return ctx.print_json(&bundles);
        }
        for pricing in &bundles {
            println!(
                "{:<28} {:<36} {} statt {} (spart {}, {} %)",
                pricing.bundle.slug,
                pricing.bundle.name,
                format_currency(pricing.bundle.price),
                format_currency(pricing.individual_total),
                format_currency(pricing.savings),
                pricing.savings_percent
            );
            for form in &pricing.forms {
                println!("    - {}", form.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reason_has_a_label() {
        for reason in [
            AccessReason::Free,
            AccessReason::Purchased,
            AccessReason::Bundle,
            AccessReason::Subscription,
            AccessReason::None,
        ] {
            assert!(!reason_label(reason).is_empty());
        }
    }
}
