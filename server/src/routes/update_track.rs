use axum::{
  extract::{rejection::PathRejection, Multipart, Path, State},
  Json,
};
use axum_macros::debug_handler;
use std::sync::Arc;
use crate::{
  errors::ApiError,
  routes::track_form::read_track_upload,
  services::track_service::TrackResponse,
  AppState,
};

#[debug_handler]
pub async fn route(
  track_id: Result<Path<i64>, PathRejection>,
  State(state): State<Arc<AppState>>,
  multipart: Multipart,
) -> Result<Json<TrackResponse>, ApiError> {
  let Path(track_id) = track_id?;
  let upload = read_track_upload(multipart).await?;
  let track = state.tracks.update(track_id, upload).await?;

  Ok(Json(track))
}
