use axum::{Json, extract::State};
use http::StatusCode;
use tokio::sync::watch;
use user_sync::SyncStatus;

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum HealthState {
    /// At least one user list fetch succeeded.
    Healthy,

    /// No user list was ever installed, every authentication is rejected.
    Unhealthy,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct HealthReport {
    status: HealthState,
    users: usize,
    last_sync: Option<String>,
    consecutive_failures: u32,
    last_error: Option<String>,
}

impl From<&SyncStatus> for HealthReport {
    fn from(status: &SyncStatus) -> Self {
        let state = if status.last_success.is_some() {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };

        Self {
            status: state,
            users: status.users,
            last_sync: status.last_success.map(|at| at.to_string()),
            consecutive_failures: status.consecutive_failures,
            last_error: status.last_error.clone(),
        }
    }
}

/// Reports whether the user list has been synchronized.
pub(crate) async fn health(State(status): State<watch::Receiver<SyncStatus>>) -> (StatusCode, Json<HealthReport>) {
    let report = HealthReport::from(&*status.borrow());

    let code = match report.status {
        HealthState::Healthy => StatusCode::OK,
        HealthState::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (code, Json(report))
}
