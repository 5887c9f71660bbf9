use tracing::{debug, error};

use crate::server::api::{self, ApiError};
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn ok(content_type: &'static str, body: String) -> Self {
        HttpResponse {
            status_code: 200,
            content_type,
            body,
        }
    }
}

const JSON: &str = "application/json";
const CSV: &str = "text/csv; charset=utf-8";

pub fn route_request(state: &AppState, method: &str, path: &str, body: &str) -> HttpResponse {
    debug!(method, path, "request");
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::ok(JSON, payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("GET", "/api/roster") => api_response(JSON, api::roster_payload(state)),
        ("POST", "/api/roster/reload") => api_response(JSON, api::roster_reload_payload(state)),
        ("POST", "/api/scenario") => api_response(JSON, api::scenario_payload(state, body)),
        ("GET", "/api/scenario/export") => {
            api_response(CSV, api::scenario_export_payload(state, path))
        }
        ("GET", "/api/scenario/curve") => api_response(JSON, api::scenario_curve_payload(state, path)),
        _ => error_response(404, "Route not found"),
    }
}

fn api_response(content_type: &'static str, result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::ok(content_type, payload),
        Err(ApiError::Parse(err)) => {
            error_response(400, &format!("Invalid request body: {err}"))
        }
        Err(ApiError::Validation(validation)) => {
            validation_error_response(400, validation)
        }
        Err(err @ ApiError::Load(_)) => {
            error!(%err, "roster unavailable");
            error_response(500, &err.to_string())
        }
        Err(err) => error_response(500, &err.to_string()),
    }
}

fn validation_error_response(
    status_code: u16,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        content_type: JSON,
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: JSON,
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
