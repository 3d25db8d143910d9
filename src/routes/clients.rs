use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::client_logo::ClientLogo;

/// GET /api/clients: client logos from the public CSV feed.
pub async fn list_client_logos(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientLogo>>, ApiError> {
    let logos = state
        .client_logos
        .fetch()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(logos))
}
