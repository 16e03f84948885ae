use axum::{
  extract::{Multipart, State},
  http::StatusCode,
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
  State(state): State<Arc<AppState>>,
  multipart: Multipart,
) -> Result<(StatusCode, Json<TrackResponse>), ApiError> {
  let upload = read_track_upload(multipart).await?;
  let track = state.tracks.create(upload).await?;

  Ok((StatusCode::CREATED, Json(track)))
}
