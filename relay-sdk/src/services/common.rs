//! Common utilities for service clients

use reqwest::Response;

use crate::error::{mapping::map_http_error, ErrorContext, RelayError};
use crate::util::truncate_string;

/// Create error context for HTTP requests
pub fn create_error_context(
    service_name: &str,
    endpoint: &str,
    status: Option<reqwest::StatusCode>,
    request_id: Option<&str>,
) -> ErrorContext {
    let mut context = ErrorContext::for_service(service_name).endpoint(endpoint);

    if let Some(id) = request_id {
        context = context.request_id(id);
    }

    if let Some(status_code) = status {
        context = context.status_code(status_code.as_u16());
    }

    context
}

/// Turn a non-2xx response into an error carrying the truncated body
pub async fn parse_error_response(
    service_name: &str,
    endpoint: &str,
    response: Response,
    request_id: Option<&str>,
    detail_limit: usize,
) -> RelayError {
    let status = response.status();
    let mut context = create_error_context(service_name, endpoint, Some(status), request_id);

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("Failed to read error response: {}", e),
    };

    let error = map_http_error(status, &body, &mut context, detail_limit);
    error.with_context(context)
}

/// Read a response body as a truncated excerpt, `None` when empty
pub async fn body_excerpt(response: Response, detail_limit: usize) -> Option<String> {
    match response.text().await {
        Ok(body) => {
            let body = body.trim();
            if body.is_empty() {
                None
            } else {
                Some(truncate_string(body, detail_limit))
            }
        }
        Err(e) => {
            log::debug!("Failed to read response body: {}", e);
            None
        }
    }
}
