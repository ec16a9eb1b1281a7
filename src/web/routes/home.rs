use anyhow::Context;
use axum::{extract::State, response::Html};

use crate::{
    store::SubscriptionStore,
    web::{routes::SUBSCRIBE_PATH, types::FormField, WebResult},
    AppState,
};

/// Renders the landing page with an empty subscription form.
#[tracing::instrument(name = "landing_page", skip_all)]
pub async fn home<S: SubscriptionStore>(
    State(app_state): State<AppState<S>>,
) -> WebResult<Html<String>> {
    let mut ctx = tera::Context::new();
    ctx.insert("email_field", &FormField::email());
    ctx.insert("subscribe_url", SUBSCRIBE_PATH);

    let body = app_state
        .templ_mgr
        .render_html_to_string(&ctx, "landing.html")
        .context("tera failed to render 'html/landing.html' template")?;

    Ok(Html(body))
}
