use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use std::sync::Arc;
use crate::{errors::ApiError, services::track_service::TrackResponse, AppState};

#[derive(Deserialize)]
pub struct QueryParams {
  q: Option<String>,
}

pub async fn route(
  Query(params): Query<QueryParams>,
  State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TrackResponse>>, ApiError> {
  let tracks = state.tracks.search(params.q.as_deref())?;

  tracing::info!(message = "searched tracks", q = params.q.as_deref().unwrap_or_default(), count = tracks.len());

  Ok(Json(tracks))
}
