//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    services::{Alert, AlertId},
    state::{AppState, TimerDraft, TimerId, TimerRecord, TimerUpdate},
    validation::{check_timer_form, TimerForm},
};
use super::responses::{ApiError, ErrorResponse, HealthResponse, StatusResponse};

/// Partial edit; any field left out keeps its current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

impl TimerPatch {
    /// Full form for validation, filled in from the current timer
    fn merged_with(&self, timer: &TimerRecord) -> TimerForm {
        let duration = timer.duration as i64;
        TimerForm {
            title: self.title.clone().unwrap_or_else(|| timer.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| timer.description.clone()),
            hours: self.hours.unwrap_or(duration / 3600),
            minutes: self.minutes.unwrap_or((duration % 3600) / 60),
            seconds: self.seconds.unwrap_or(duration % 60),
        }
    }

    fn touches_time(&self) -> bool {
        self.hours.is_some() || self.minutes.is_some() || self.seconds.is_some()
    }
}

fn rejected(message: String) -> ApiError {
    warn!("Rejected timer form: {}", message);
    ErrorResponse::reply(StatusCode::BAD_REQUEST, message)
}

/// Handle GET /timers - All timers in creation order
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TimerRecord>> {
    Json(state.timers())
}

/// Handle GET /timers/:id
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerRecord>, ApiError> {
    let id = TimerId::from(id);
    state
        .timer(&id)
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("timer", &id))
}

/// Handle POST /timers - Validate the form and add a stopped timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<TimerForm>,
) -> Result<(StatusCode, Json<TimerRecord>), ApiError> {
    let duration = check_timer_form(&form).map_err(|e| rejected(e.to_string()))?;

    let timer = state.add_timer(TimerDraft {
        title: form.title.trim().to_string(),
        description: form.description,
        duration,
    });
    info!("Timer {} created via API", timer.id);
    Ok((StatusCode::CREATED, Json(timer)))
}

/// Handle PATCH /timers/:id - Edit fields, which restarts the countdown
pub async fn edit_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<TimerPatch>,
) -> Result<Json<TimerRecord>, ApiError> {
    let id = TimerId::from(id);
    let current = state
        .timer(&id)
        .ok_or_else(|| ErrorResponse::not_found("timer", &id))?;

    let form = patch.merged_with(&current);
    let duration = check_timer_form(&form).map_err(|e| rejected(e.to_string()))?;

    let update = TimerUpdate {
        title: patch.title.as_ref().map(|_| form.title.trim().to_string()),
        description: patch.description.clone(),
        duration: patch.touches_time().then_some(duration),
    };
    state
        .edit_timer(&id, update)
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("timer", &id))
}

/// Handle DELETE /timers/:id - Dismiss any alert, then delete
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TimerId::from(id);
    if state.delete_timer(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ErrorResponse::not_found("timer", &id))
    }
}

/// Handle POST /timers/:id/toggle - Start or pause
pub async fn toggle_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerRecord>, ApiError> {
    let id = TimerId::from(id);
    state
        .toggle_timer(&id)
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("timer", &id))
}

/// Handle POST /timers/:id/restart - Dismiss any alert and reset
pub async fn restart_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerRecord>, ApiError> {
    let id = TimerId::from(id);
    state
        .restart_timer(&id)
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("timer", &id))
}

/// Handle POST /timers/:id/dismiss - Dismiss the timer's expiry alert
pub async fn dismiss_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TimerId::from(id);
    if state.timer(&id).is_none() {
        return Err(ErrorResponse::not_found("timer", &id));
    }
    // Already dismissed is fine
    state.dismiss_timer(&id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handle GET /alerts - Outstanding expiry alerts
pub async fn list_alerts_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Alert>> {
    Json(state.alerts.list())
}

/// Handle POST /alerts/:alert_id/dismiss
pub async fn dismiss_alert_handler(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<AlertId>,
) -> Result<StatusCode, ApiError> {
    if state.dismiss_alert(alert_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ErrorResponse::not_found("alert", alert_id))
    }
}

/// Handle GET /status - Return current board status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timers = state.timers();
    Json(StatusResponse {
        timers: timers.len(),
        running: timers.iter().filter(|t| t.is_counting_down()).count(),
        expired: state.notifier.expired_count(),
        alarm_active: state.notifier.is_alarm_active(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
