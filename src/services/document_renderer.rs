//! Renders the body of a completed document.
//!
//! Templates see every field twice: `fields.<name>` holds the display value
//! (dates as dd.mm.yyyy, amounts as `1.234,56 €`, select labels) and
//! `raw.<name>` the stored JSON value. `title` and `sections` (the review
//! summary) are available as well.

use crate::models::FormTemplate;
use crate::wizard::{build_summary, schema::display_value};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tera::{Context as TeraContext, Tera};

const DOCUMENT_TEMPLATE: &str = "document.tera";

/// Used for templates without their own body.
const DEFAULT_BODY_TEMPLATE: &str = r#"{{ title }}
{% for section in sections %}
{{ section.title }}
{% for item in section.items %}{% if not item.empty %}{{ item.label }}: {{ item.value }}
{% endif %}{% endfor %}{% endfor %}"#;

pub fn render_document(
    template: &FormTemplate,
    title: &str,
    data: &Map<String, Value>,
) -> Result<String> {
    let body = template
        .body_template
        .as_deref()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or(DEFAULT_BODY_TEMPLATE);

    let mut tera = Tera::default();
    tera.add_raw_template(DOCUMENT_TEMPLATE, body)
        .with_context(|| format!("Failed to parse body template of {}", template.slug))?;

    let fields: BTreeMap<&str, String> = template
        .steps()
        .iter()
        .flat_map(|step| step.fields.iter())
        .map(|field| (field.name.as_str(), display_value(field, data.get(&field.name))))
        .collect();

    let mut context = TeraContext::new();
    context.insert("title", title);
    context.insert("form_name", &template.name);
    context.insert("fields", &fields);
    context.insert("raw", data);
    context.insert("sections", &build_summary(template, data).sections);

    tera.render(DOCUMENT_TEMPLATE, &context)
        .with_context(|| format!("Failed to render document for {}", template.slug))
}
