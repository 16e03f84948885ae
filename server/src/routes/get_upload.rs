use axum::{
  extract::{Path, State},
  http::header::CONTENT_TYPE,
  response::{IntoResponse, Response},
};
use std::sync::Arc;
use crate::{errors::ApiError, storage::UPLOADS_PREFIX, utils::content_type_for, AppState};

pub async fn route(
  Path(path): Path<String>,
  State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
  let logical_path = format!("{}{}", UPLOADS_PREFIX, path.trim_start_matches('/'));
  let data = state.tracks.store().load(&logical_path).await?;

  Ok(([(CONTENT_TYPE, content_type_for(&logical_path))], data).into_response())
}
