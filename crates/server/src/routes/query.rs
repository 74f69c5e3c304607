//! Natural-language query endpoints

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Map, json};

use crate::AppState;
use crate::error::AppError;
use crate::summary;

/// Request body for query submission
#[derive(Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    query: String,
}

/// POST /query — Process a natural-language query end to end
///
/// Dispatches the query into a records-API request, executes it, and
/// returns the flattened result set with summary statistics.
pub async fn run(
    State(state): State<AppState>,
    Json(body): Json<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let query = validated(&body)?;
    tracing::info!(query = query, "Received query");

    let request = state
        .dispatcher
        .dispatch(query, &state.fhir_base_url)
        .await?;

    let data = state.fhir.execute(&request).await?;

    let empty = Map::new();
    let params = request.parameters.as_ref().unwrap_or(&empty);
    let results = summary::simplify(&data, params);

    Ok(Json(json!({ "results": results })))
}

/// POST /query/preview — Generate the records-API request without
/// executing it
pub async fn preview(
    State(state): State<AppState>,
    Json(body): Json<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let query = validated(&body)?;
    tracing::info!(query = query, "Received preview query");

    let request = state
        .dispatcher
        .dispatch(query, &state.fhir_base_url)
        .await?;

    Ok(Json(request))
}

fn validated(body: &QueryRequest) -> Result<&str, AppError> {
    let query = body.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Query parameter is required.".to_string(),
        ));
    }
    Ok(query)
}
