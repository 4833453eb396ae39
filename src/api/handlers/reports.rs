//! Report Handlers

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    api::{error::ApiError, state::AppState},
    application::{AppError, parse_report_date},
    domain::EntityId,
    io::export::export_entity_summary_csv,
};

/// Query string of the entity summary. Every field is optional here so
/// that a missing one is reported by name.
#[derive(Debug, Deserialize)]
pub struct EntitySummaryParams {
    pub entity_id: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub format: Option<String>,
}

pub async fn entity_summary(
    State(state): State<AppState>,
    query: Result<Query<EntitySummaryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;

    let entity_id_raw = params
        .entity_id
        .ok_or(AppError::MissingField("entity_id"))?;
    let entity_id: EntityId = entity_id_raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid entity_id: '{}'", entity_id_raw)))?;
    let from_date = parse_report_date(
        "from_date",
        &params.from_date.ok_or(AppError::MissingField("from_date"))?,
    )?;
    let to_date = parse_report_date(
        "to_date",
        &params.to_date.ok_or(AppError::MissingField("to_date"))?,
    )?;

    let entries = state
        .reports()
        .entity_summary(entity_id, from_date, to_date)
        .await?;

    match params.format.as_deref().unwrap_or("json") {
        "json" => Ok(Json(entries).into_response()),
        "csv" => {
            let mut body = Vec::new();
            export_entity_summary_csv(&entries, &mut body)?;
            let disposition = format!(
                "attachment; filename=\"entity-{}-{}-{}.csv\"",
                entity_id, from_date, to_date
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
        other => Err(ApiError::BadRequest(format!(
            "Unsupported format: '{}' (expected json or csv)",
            other
        ))),
    }
}
