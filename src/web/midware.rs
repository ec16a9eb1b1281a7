use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::web::{log, types::NON_FIELD_ERRORS, Error, REQUEST_ID_HEADER};

/// Turns a `web::Error` stored in the response extensions into the JSON body the client expects,
/// and logs every request.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    let req_id = request_id(&resp);

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error
        .as_ref()
        .map(|(status, client_error)| {
            let mut client_error_body = json!({
                "success": false,
                "errors": {
                    NON_FIELD_ERRORS: client_error.to_string(),
                }
            });
            // Server errors carry the request id so they can be found in the logs.
            if status.is_server_error() {
                client_error_body["req_id"] = json!(req_id.to_string());
            }

            let mut err_resp = (*status, Json(client_error_body)).into_response();
            if let Some(header_req_id) = resp.headers().get(REQUEST_ID_HEADER) {
                err_resp
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER, header_req_id.clone());
            }
            err_resp
        });

    log::log_request(
        req_id,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}

/// Reads the request id propagated to the response, the `PropagateRequestIdLayer` has to run first.
fn request_id(resp: &Response) -> Uuid {
    let parsed = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| Uuid::parse_str(val).ok());

    parsed.unwrap_or_else(|| {
        debug!("{:<12} - '{REQUEST_ID_HEADER}' missing from the response", "RES_MAPPER");
        Uuid::new_v4()
    })
}
