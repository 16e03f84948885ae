use axum::{extract::{rejection::PathRejection, Path, State}, http::StatusCode};
use std::sync::Arc;
use crate::{errors::ApiError, AppState};

pub async fn route(
  track_id: Result<Path<i64>, PathRejection>,
  State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
  let Path(track_id) = track_id?;
  state.tracks.delete(track_id).await?;

  Ok(StatusCode::NO_CONTENT)
}
