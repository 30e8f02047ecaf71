use axum::{Json, extract::State};

use crate::{api::v1::dto::countries::CountryResponse, error::AppError, state::AppState};

pub async fn list_countries(
    State(state): State<AppState>,
) -> Result<Json<Vec<CountryResponse>>, AppError> {
    let rows = state.countries.list().await?;
    Ok(Json(rows.into_iter().map(CountryResponse::from).collect()))
}
