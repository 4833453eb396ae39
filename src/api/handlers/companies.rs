//! Company Handlers

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::{
    api::{error::ApiError, state::AppState},
    domain::{Company, CompanyId, CompanyPatch, NewCompany},
};

pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<Company>>, ApiError> {
    Ok(Json(state.companies().list().await?))
}

pub async fn get_company(
    State(state): State<AppState>,
    path: Result<Path<CompanyId>, PathRejection>,
) -> Result<Json<Company>, ApiError> {
    let Path(company_id) = path?;
    Ok(Json(state.companies().get(company_id).await?))
}

pub async fn create_company(
    State(state): State<AppState>,
    payload: Result<Json<NewCompany>, JsonRejection>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let Json(input) = payload?;
    let company = state.companies().create(input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn update_company(
    State(state): State<AppState>,
    path: Result<Path<CompanyId>, PathRejection>,
    payload: Result<Json<CompanyPatch>, JsonRejection>,
) -> Result<Json<Company>, ApiError> {
    let Path(company_id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.companies().update(company_id, patch).await?))
}

pub async fn delete_company(
    State(state): State<AppState>,
    path: Result<Path<CompanyId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(company_id) = path?;
    state.companies().delete(company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
