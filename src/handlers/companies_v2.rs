// handlers/companies_v2.rs - company resource, version 2

use axum::{extract::State, response::Json};

use crate::error::ApiError;
use crate::models::Company;
use crate::state::AppState;

/// GET /api/v2/companies - raw companies without DTO mapping
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Company>>, ApiError> {
    let companies = state.repository.company.get_all_companies().await?;
    Ok(Json(companies))
}
