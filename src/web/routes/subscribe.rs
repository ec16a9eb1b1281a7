use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{field, info, Span};

use crate::{
    store::SubscriptionStore,
    web::{
        extract::SubmittedForm,
        types::FieldErrors,
        Error, WebResult,
    },
    AppState,
};

// ###################################
// ->   OUTCOME
// ###################################
/// Result of a handled subscription request.
/// A duplicate email is reported the same way as a new one.
#[derive(Debug, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    ValidationFailure(FieldErrors),
}

impl IntoResponse for SubscribeOutcome {
    fn into_response(self) -> Response {
        let body = match self {
            SubscribeOutcome::Subscribed => json!({ "success": true }),
            SubscribeOutcome::ValidationFailure(errors) => json!({
                "success": false,
                "errors": errors,
            }),
        };

        Json(body).into_response()
    }
}

// ###################################
// ->   API
// ###################################
#[tracing::instrument(
    name = "Subscribing an email",
    skip_all,
    fields(subscriber_email = field::Empty)
)]
pub async fn subscribe<S: SubscriptionStore>(
    State(app_state): State<AppState<S>>,
    SubmittedForm(form): SubmittedForm,
) -> WebResult<SubscribeOutcome> {
    let email = match form.validate() {
        Ok(email) => email,
        Err(errors) => {
            info!(?errors, "rejected invalid subscription form");
            return Ok(SubscribeOutcome::ValidationFailure(errors));
        }
    };
    Span::current().record("subscriber_email", email.as_ref());

    let (subscription, created) = app_state.store.get_or_create(&email).await?;
    info!(subscription_id = %subscription.id, created, "SUCCESS");

    Ok(SubscribeOutcome::Subscribed)
}

/// Fallback for every method other than POST on the subscribe route.
pub async fn invalid_method(method: Method) -> WebResult<()> {
    Err(Error::MethodNotAllowed(method))
}
