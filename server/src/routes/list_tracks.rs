use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use std::sync::Arc;
use crate::{
  errors::ApiError,
  services::track_service::TrackResponse,
  utils::process_param,
  AppState,
};

#[derive(Deserialize)]
pub struct QueryParams {
  category: Option<String>,
}

pub async fn route(
  Query(params): Query<QueryParams>,
  State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TrackResponse>>, ApiError> {
  let tracks = match process_param(params.category.as_deref()) {
    Some(category) => state.tracks.list_by_category(&category)?,
    None => state.tracks.list_all()?,
  };

  tracing::info!(message = "listed tracks", count = tracks.len());

  Ok(Json(tracks))
}
