//! Status classification and server error bodies.

use serde_json::Value;

use crate::app::{PulpitError, Result};
use crate::transport::ApiResponse;

/// Human-readable message from an error body: `error`, then `errors[0].msg`,
/// then `HTTP <status>`.
pub(crate) fn error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(Value::as_str)
                .or_else(|| {
                    json.get("errors")
                        .and_then(|errors| errors.get(0))
                        .and_then(|first| first.get("msg"))
                        .and_then(Value::as_str)
                })
                .map(String::from)
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Parses a 2xx body. An empty body is `null`.
pub(crate) fn parse_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(body).map_err(|e| PulpitError::InvalidResponse {
        message: format!("response is not JSON: {}", e),
    })
}

pub(crate) fn classify(response: ApiResponse) -> Result<Value> {
    if response.is_success() {
        return parse_body(&response.body);
    }

    let status = response.status;
    match status {
        401 | 403 => Err(PulpitError::Authentication {
            status,
            message: error_message(status, &response.body),
        }),
        429 => Err(PulpitError::RateLimited {
            message: error_message(status, &response.body),
        }),
        _ => Err(PulpitError::Server {
            status,
            message: error_message(status, &response.body),
        }),
    }
}
