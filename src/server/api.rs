use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::roster::{EmployeeRecord, LoadError, LoadReport};
use crate::scenario::{
    clamp_headcount, cost_curve, evaluate, format_usd, selected_csv_string, CurvePoint,
    ExportError, ScenarioResult, SelectionDirection,
};
use crate::server::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioRequest {
    /// Clamped into `[0, total_employees]`; omitted means the configured default.
    pub target_headcount: Option<i64>,
    /// `lowest` / `highest` or one of the full option labels.
    pub priority: Option<String>,
    /// Boolean form of `priority`. If both are given they must agree.
    pub ascending: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationErrorResponse {
    fn new(errors: Vec<ValidationIssue>) -> Self {
        ValidationErrorResponse {
            status: "error",
            message: "Validation failed",
            errors,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Parse(serde_json::Error),
    #[error("invalid scenario request")]
    Validation(ValidationErrorResponse),
    #[error("Could not load roster: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to serialize response: {0}")]
    Serialize(serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub requested_headcount: Option<i64>,
    pub target_headcount: usize,
    pub priority: SelectionDirection,
    pub priority_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResponse {
    pub status: &'static str,
    pub scenario: ScenarioSummary,
    pub headcount: String,
    pub selected_headcount: usize,
    pub total_employees: usize,
    pub total_compensation: i128,
    pub average_compensation: i64,
    pub total_compensation_display: String,
    pub average_compensation_display: String,
    pub selected: Vec<EmployeeRecord>,
}

impl ScenarioResponse {
    fn new(requested_headcount: Option<i64>, target_headcount: usize, result: ScenarioResult) -> Self {
        ScenarioResponse {
            status: "ok",
            scenario: ScenarioSummary {
                requested_headcount,
                target_headcount,
                priority: result.direction,
                priority_label: result.direction.label(),
            },
            headcount: result.headcount_label(),
            selected_headcount: result.selected_headcount(),
            total_employees: result.total_employees,
            total_compensation: result.total_compensation,
            average_compensation: result.average_compensation,
            total_compensation_display: format_usd(result.total_compensation),
            average_compensation_display: format_usd(i128::from(result.average_compensation)),
            selected: result.selected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct RosterResponse<'a> {
    status: &'static str,
    source: String,
    loaded_at: String,
    total_employees: usize,
    report: &'a LoadReport,
    employees: &'a [EmployeeRecord],
}

#[derive(Debug, Clone, Serialize)]
struct CurveResponse {
    status: &'static str,
    priority: SelectionDirection,
    total_employees: usize,
    points: Vec<CurvePoint>,
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "headcount-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn roster_payload(state: &AppState) -> Result<String, ApiError> {
    let cached = state.roster()?;
    render_roster(&cached)
}

pub fn roster_reload_payload(state: &AppState) -> Result<String, ApiError> {
    let cached = state.reload_roster()?;
    render_roster(&cached)
}

fn render_roster(cached: &crate::data::CachedRoster) -> Result<String, ApiError> {
    serde_json::to_string_pretty(&RosterResponse {
        status: "ok",
        source: cached.source.display().to_string(),
        loaded_at: cached.loaded_at.to_rfc3339(),
        total_employees: cached.roster.len(),
        report: &cached.report,
        employees: cached.roster.records(),
    })
    .map_err(ApiError::Serialize)
}

pub fn scenario_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let request: ScenarioRequest = if body.trim().is_empty() {
        ScenarioRequest::default()
    } else {
        serde_json::from_str(body).map_err(ApiError::Parse)?
    };
    let direction = resolve_direction(&request).map_err(ApiError::Validation)?;

    let cached = state.roster()?;
    let target_headcount = resolve_headcount(state, request.target_headcount, cached.roster.len());
    let result = evaluate(&cached.roster, target_headcount, direction);

    serde_json::to_string_pretty(&ScenarioResponse::new(
        request.target_headcount,
        target_headcount,
        result,
    ))
    .map_err(ApiError::Serialize)
}

/// CSV of the selected employees for `?headcount=N&priority=P`.
pub fn scenario_export_payload(state: &AppState, path: &str) -> Result<String, ApiError> {
    let request = request_from_query(path).map_err(ApiError::Validation)?;
    let direction = resolve_direction(&request).map_err(ApiError::Validation)?;

    let cached = state.roster()?;
    let target_headcount = resolve_headcount(state, request.target_headcount, cached.roster.len());
    let result = evaluate(&cached.roster, target_headcount, direction);
    Ok(selected_csv_string(&result.selected)?)
}

pub fn scenario_curve_payload(state: &AppState, path: &str) -> Result<String, ApiError> {
    let request = request_from_query(path).map_err(ApiError::Validation)?;
    let direction = resolve_direction(&request).map_err(ApiError::Validation)?;

    let cached = state.roster()?;
    serde_json::to_string_pretty(&CurveResponse {
        status: "ok",
        priority: direction,
        total_employees: cached.roster.len(),
        points: cost_curve(&cached.roster, direction),
    })
    .map_err(ApiError::Serialize)
}

fn resolve_headcount(state: &AppState, requested: Option<i64>, total: usize) -> usize {
    match requested {
        Some(value) => clamp_headcount(value, total),
        None => state.config.default_headcount.min(total),
    }
}

fn resolve_direction(request: &ScenarioRequest) -> Result<SelectionDirection, ValidationErrorResponse> {
    let mut errors = Vec::new();

    let from_priority = match request.priority.as_deref() {
        Some(raw) => match raw.parse::<SelectionDirection>() {
            Ok(direction) => Some(direction),
            Err(err) => {
                errors.push(ValidationIssue {
                    field: "priority",
                    messages: vec![err.to_string()],
                });
                None
            }
        },
        None => None,
    };
    let from_flag = request.ascending.map(SelectionDirection::from);

    if let (Some(priority), Some(flag)) = (from_priority, from_flag) {
        if priority != flag {
            errors.push(ValidationIssue {
                field: "ascending",
                messages: vec![format!(
                    "ascending={} contradicts priority '{}'",
                    flag.is_ascending(),
                    priority
                )],
            });
        }
    }

    if !errors.is_empty() {
        return Err(ValidationErrorResponse::new(errors));
    }
    Ok(from_priority.or(from_flag).unwrap_or_default())
}

fn query_param<'a>(path: &'a str, key: &str) -> Option<&'a str> {
    let query = path.split_once('?').map(|(_, q)| q).unwrap_or("");
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
}

fn request_from_query(path: &str) -> Result<ScenarioRequest, ValidationErrorResponse> {
    let target_headcount = match query_param(path, "headcount").filter(|v| !v.is_empty()) {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
            ValidationErrorResponse::new(vec![ValidationIssue {
                field: "headcount",
                messages: vec![format!("headcount must be an integer, got '{raw}'")],
            }])
        })?),
        None => None,
    };
    Ok(ScenarioRequest {
        target_headcount,
        priority: query_param(path, "priority").map(str::to_string),
        ascending: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_reads_named_values() {
        let path = "/api/scenario/export?headcount=3&priority=highest";
        assert_eq!(query_param(path, "headcount"), Some("3"));
        assert_eq!(query_param(path, "priority"), Some("highest"));
        assert_eq!(query_param(path, "missing"), None);
        assert_eq!(query_param("/api/scenario/curve", "priority"), None);
    }

    #[test]
    fn direction_defaults_to_lowest_first() {
        let direction = resolve_direction(&ScenarioRequest::default()).expect("valid");
        assert_eq!(direction, SelectionDirection::LowestFirst);
    }

    #[test]
    fn ascending_flag_alone_sets_direction() {
        let request = ScenarioRequest {
            ascending: Some(false),
            ..ScenarioRequest::default()
        };
        assert_eq!(
            resolve_direction(&request).expect("valid"),
            SelectionDirection::HighestFirst
        );
    }

    #[test]
    fn conflicting_priority_and_flag_is_rejected() {
        let request = ScenarioRequest {
            priority: Some("highest".to_string()),
            ascending: Some(true),
            ..ScenarioRequest::default()
        };
        let err = resolve_direction(&request).expect_err("should conflict");
        assert_eq!(err.errors[0].field, "ascending");
    }

    #[test]
    fn non_numeric_headcount_query_is_rejected() {
        let err = request_from_query("/api/scenario/export?headcount=ten").expect_err("invalid");
        assert_eq!(err.errors[0].field, "headcount");
    }
}
