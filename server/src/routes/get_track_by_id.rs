use axum::{extract::{rejection::PathRejection, Path, State}, Json};
use std::sync::Arc;
use crate::{errors::ApiError, services::track_service::TrackResponse, AppState};

pub async fn route(
  track_id: Result<Path<i64>, PathRejection>,
  State(state): State<Arc<AppState>>,
) -> Result<Json<TrackResponse>, ApiError> {
  let Path(track_id) = track_id?;
  Ok(Json(state.tracks.get_by_id(track_id)?))
}
