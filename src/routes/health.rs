use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub spreadsheet: ComponentHealth,
    pub email: ComponentHealth,
    pub client_logos: ComponentHealth,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentHealth {
    Configured,
    Missing,
}

impl ComponentHealth {
    fn from_flag(configured: bool) -> Self {
        if configured {
            ComponentHealth::Configured
        } else {
            ComponentHealth::Missing
        }
    }
}

/// GET /health: liveness plus which upstream integrations are configured.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = &state.config;
    let spreadsheet = state.sheets.is_some() && config.google_sheet_id.is_some();
    let email = config
        .resend_api_key
        .as_deref()
        .is_some_and(|k| !k.is_empty());

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            spreadsheet: ComponentHealth::from_flag(spreadsheet),
            email: ComponentHealth::from_flag(email),
            client_logos: ComponentHealth::from_flag(config.client_logos_csv_url.is_some()),
        },
    })
}
