use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use tracing::instrument;

use crate::web::{
    types::{SubscriptionForm, EMAIL_FIELD},
    Error,
};

/// The subscription form, posted either url-encoded or as `multipart/form-data`.
#[derive(Debug)]
pub struct SubmittedForm(pub SubscriptionForm);

impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = Error;

    #[instrument(skip_all, name = "SubmittedForm from_request")]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(form) = Form::<SubscriptionForm>::from_request(req, state).await?;
            return Ok(Self(form));
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut form = SubscriptionForm::default();

        while let Some(field) = multipart.next_field().await? {
            // The first email field wins, like a form with a repeated key.
            if field.name() != Some(EMAIL_FIELD) || form.email.is_some() {
                continue;
            }
            form.email = Some(field.text().await?);
        }

        Ok(Self(form))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|val| val.to_str().ok())
        .is_some_and(|val| val.to_ascii_lowercase().starts_with("multipart/form-data"))
}
