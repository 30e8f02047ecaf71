/*
 * Responsibility
 * - /travellers handlers: parse → TravellerService → DTO
 * - access control already happened in the policy layer; handlers only
 *   read the principal for audit logging
 */
use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use crate::{
    api::v1::{
        dto::{
            countries::CountryIdsRequest,
            travellers::{MessageResponse, TravellerInsertRequest, TravellerResponse},
        },
        extractors::{CountryId, CurrentPrincipal, JsonBody, OptionalJsonBody, TravellerId},
    },
    error::AppError,
    services::{query::PaginatedResult, traveller::filters::TravellerFilters},
    state::AppState,
};

pub async fn register_traveller(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TravellerInsertRequest>,
) -> Result<Json<TravellerResponse>, AppError> {
    let registration = req.into_registration()?;
    let traveller = state.travellers.register(registration).await?;
    Ok(Json(traveller.into()))
}

pub async fn list_travellers(
    State(state): State<AppState>,
) -> Result<Json<Vec<TravellerResponse>>, AppError> {
    let rows = state.travellers.list_all().await?;
    Ok(Json(rows.into_iter().map(TravellerResponse::from).collect()))
}

pub async fn list_travellers_paginated(
    State(state): State<AppState>,
    OptionalJsonBody(filters): OptionalJsonBody<TravellerFilters>,
) -> Result<Json<PaginatedResult<TravellerResponse>>, AppError> {
    let filters = filters.unwrap_or_default();
    let page = state.travellers.list_filtered_paginated(&filters).await?;
    Ok(Json(page.map(TravellerResponse::from)))
}

pub async fn get_traveller(
    State(state): State<AppState>,
    traveller_id: TravellerId,
) -> Result<Json<TravellerResponse>, AppError> {
    let traveller = state.travellers.get(traveller_id.id).await?;
    Ok(Json(traveller.into()))
}

pub async fn add_countries(
    State(state): State<AppState>,
    traveller_id: TravellerId,
    JsonBody(req): JsonBody<CountryIdsRequest>,
) -> Result<Json<TravellerResponse>, AppError> {
    let traveller = state
        .travellers
        .add_countries(traveller_id.id, &req.country_ids)
        .await?;
    Ok(Json(traveller.into()))
}

pub async fn remove_country(
    State(state): State<AppState>,
    traveller_id: TravellerId,
    country_id: CountryId,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .travellers
        .remove_country(traveller_id.id, country_id.id)
        .await?;
    Ok(Json(MessageResponse::new("Country removed successfully")))
}

pub async fn total_travelled_countries(
    State(state): State<AppState>,
    traveller_id: TravellerId,
) -> Result<Json<i64>, AppError> {
    Ok(Json(state.travellers.total_travelled(traveller_id.id).await?))
}

pub async fn total_untravelled_countries(
    State(state): State<AppState>,
    traveller_id: TravellerId,
) -> Result<Json<i64>, AppError> {
    Ok(Json(state.travellers.total_untravelled(traveller_id.id).await?))
}

pub async fn deactivate_traveller(
    State(state): State<AppState>,
    CurrentPrincipal(admin): CurrentPrincipal,
    traveller_id: TravellerId,
) -> Result<Json<MessageResponse>, AppError> {
    state.travellers.deactivate(traveller_id.id).await?;
    info!(actor = %admin.subject, traveller_id = traveller_id.id, "traveller deactivated");
    Ok(Json(MessageResponse::new("Traveller deactivated successfully")))
}

pub async fn restore_traveller(
    State(state): State<AppState>,
    CurrentPrincipal(admin): CurrentPrincipal,
    traveller_id: TravellerId,
) -> Result<Json<MessageResponse>, AppError> {
    state.travellers.restore(traveller_id.id).await?;
    info!(actor = %admin.subject, traveller_id = traveller_id.id, "traveller restored");
    Ok(Json(MessageResponse::new("Traveller restored successfully")))
}

pub async fn delete_traveller(
    State(state): State<AppState>,
    CurrentPrincipal(admin): CurrentPrincipal,
    traveller_id: TravellerId,
) -> Result<StatusCode, AppError> {
    state.travellers.delete(traveller_id.id).await?;
    info!(actor = %admin.subject, traveller_id = traveller_id.id, "traveller deleted");
    Ok(StatusCode::NO_CONTENT)
}
