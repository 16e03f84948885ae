use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::{
  db::DbPool,
  entities::track::{NewTrack, Track},
  errors::ServiceError,
  repositories::track_repository,
  storage::{FileStore, StorageCategory, Upload},
};

type Result<T> = std::result::Result<T, ServiceError>;

/// Text and numeric metadata of a create or update request. Every field is
/// optional here; `create` decides which ones are required.
#[derive(Debug, Clone, Default, Validate)]
pub struct TrackFields {
  #[validate(length(max = 50, message = "Track title must be at most 50 characters"))]
  pub title: Option<String>,
  #[validate(length(max = 50, message = "Artist name must be at most 50 characters"))]
  pub artist: Option<String>,
  #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
  pub description: Option<String>,
  pub category: Option<String>,
  pub duration: Option<i64>,
}

impl TrackFields {
  fn trimmed(self) -> Self {
    let trim = |value: Option<String>| value.map(|s| s.trim().to_owned());
    Self {
      title: trim(self.title),
      artist: trim(self.artist),
      description: trim(self.description),
      category: trim(self.category),
      duration: self.duration,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct TrackUpload {
  pub fields: TrackFields,
  pub audio_file: Option<Upload>,
  pub cover_file: Option<Upload>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
  pub id: i64,
  pub title: String,
  pub artist: String,
  pub description: String,
  pub category: String,
  pub duration: i64,
  pub audio_url: Option<String>,
  pub cover_url: Option<String>,
  pub added_date: Option<DateTime<Utc>>,
}

fn create_response(track: Track) -> TrackResponse {
  TrackResponse {
    id: track.id,
    title: track.title,
    artist: track.artist,
    description: track.description.unwrap_or_default(),
    category: track.category,
    duration: track.duration,
    audio_url: track.audio_url,
    cover_url: track.cover_url,
    added_date: track.added_date,
  }
}

fn required(value: Option<String>, message: &str) -> Result<String> {
  value
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ServiceError::Validation(message.to_owned()))
}

fn non_empty(upload: Option<Upload>) -> Option<Upload> {
  upload.filter(|u| !u.is_empty())
}

/// Applies the fields of an update request. Blank text and non-positive
/// durations leave the stored value alone; a present description always wins.
fn apply_fields(track: &mut Track, fields: TrackFields) {
  if let Some(title) = fields.title.filter(|s| !s.is_empty()) {
    track.title = title;
  }
  if let Some(artist) = fields.artist.filter(|s| !s.is_empty()) {
    track.artist = artist;
  }
  if let Some(description) = fields.description {
    track.description = Some(description);
  }
  if let Some(category) = fields.category.filter(|s| !s.is_empty()) {
    track.category = category;
  }
  if let Some(duration) = fields.duration.filter(|d| *d > 0) {
    track.duration = duration;
  }
}

/// Validates requests and keeps track rows and stored files in step.
#[derive(Clone)]
pub struct TrackService {
  pool: DbPool,
  store: FileStore,
}

impl TrackService {
  pub fn new(pool: DbPool, store: FileStore) -> Self {
    Self { pool, store }
  }

  pub fn store(&self) -> &FileStore {
    &self.store
  }

  pub fn list_all(&self) -> Result<Vec<TrackResponse>> {
    let conn = self.pool.get()?;
    let tracks = track_repository::get_all(&conn)?;
    Ok(tracks.into_iter().map(create_response).collect())
  }

  pub fn list_by_category(&self, category: &str) -> Result<Vec<TrackResponse>> {
    let conn = self.pool.get()?;
    let tracks = track_repository::get_tracks_by_category(category, &conn)?;
    Ok(tracks.into_iter().map(create_response).collect())
  }

  pub fn get_by_id(&self, track_id: i64) -> Result<TrackResponse> {
    self.find(track_id).map(create_response)
  }

  /// Blank or missing queries list everything.
  pub fn search(&self, query: Option<&str>) -> Result<Vec<TrackResponse>> {
    let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
      return self.list_all();
    };

    let conn = self.pool.get()?;
    let tracks = track_repository::search(query, &conn)?;
    Ok(tracks.into_iter().map(create_response).collect())
  }

  pub async fn create(&self, upload: TrackUpload) -> Result<TrackResponse> {
    let TrackUpload { fields, audio_file, cover_file } = upload;
    let fields = fields.trimmed();

    let title = required(fields.title.clone(), "Track title is required")?;
    let artist = required(fields.artist.clone(), "Artist name is required")?;
    let category = required(fields.category.clone(), "Category is required")?;
    let duration = fields
      .duration
      .filter(|d| *d > 0)
      .ok_or_else(|| ServiceError::Validation("Duration must be greater than 0".to_owned()))?;
    let audio_file = non_empty(audio_file)
      .ok_or_else(|| ServiceError::Validation("Audio file is required".to_owned()))?;
    fields.validate().map_err(|e| ServiceError::Validation(e.to_string()))?;

    let cover_file = non_empty(cover_file);
    self.check_uploads(Some(&audio_file), cover_file.as_ref())?;

    tracing::info!(
      message = "creating track",
      title = title.as_str(),
      artist = artist.as_str(),
      audio_file = audio_file.file_name.as_deref().unwrap_or_default(),
    );

    let audio_url = self.store.store_audio(&audio_file).await?;

    // A failure past this point leaves the stored files orphaned.
    let cover_url = match cover_file {
      Some(cover_file) => Some(self.store.store_image(&cover_file).await?),
      None => None,
    };

    let new_track = NewTrack {
      title,
      artist,
      description: fields.description.unwrap_or_default(),
      category,
      duration,
      audio_url,
      cover_url,
      added_date: Utc::now(),
    };

    let track = self.insert(&new_track)?;
    tracing::info!(message = "track created", track_id = track.id);

    Ok(create_response(track))
  }

  /// Replacement files are written before the row is saved; the files they
  /// supersede are removed only once the new row is committed.
  pub async fn update(&self, track_id: i64, upload: TrackUpload) -> Result<TrackResponse> {
    let mut track = self.find(track_id)?;

    let TrackUpload { fields, audio_file, cover_file } = upload;
    let fields = fields.trimmed();
    fields.validate().map_err(|e| ServiceError::Validation(e.to_string()))?;

    let audio_file = non_empty(audio_file);
    let cover_file = non_empty(cover_file);
    self.check_uploads(audio_file.as_ref(), cover_file.as_ref())?;

    tracing::info!(message = "updating track", track_id);

    apply_fields(&mut track, fields);

    let mut superseded = Vec::new();

    if let Some(audio_file) = audio_file {
      let audio_url = self.store.store_audio(&audio_file).await?;
      superseded.extend(track.audio_url.replace(audio_url));
    }

    if let Some(cover_file) = cover_file {
      let cover_url = self.store.store_image(&cover_file).await?;
      superseded.extend(track.cover_url.replace(cover_url));
    }

    let track = self.save(&track)?;

    for logical_path in superseded {
      self.store.delete(Some(&logical_path)).await;
    }

    tracing::info!(message = "track updated", track_id);

    Ok(create_response(track))
  }

  pub async fn delete(&self, track_id: i64) -> Result<()> {
    let track = self.remove(track_id)?;

    if let Some(audio_url) = track.audio_url.as_deref() {
      self.store.delete(Some(audio_url)).await;
    }

    if let Some(cover_url) = track.cover_url.as_deref() {
      self.store.delete(Some(cover_url)).await;
    }

    tracing::info!(message = "track deleted", track_id);

    Ok(())
  }

  /// Rejects the request before anything is written if either file would
  /// be refused by the store.
  fn check_uploads(&self, audio_file: Option<&Upload>, cover_file: Option<&Upload>) -> Result<()> {
    if let Some(audio_file) = audio_file {
      self.store.prepare(audio_file, StorageCategory::Audio)?;
    }
    if let Some(cover_file) = cover_file {
      self.store.prepare(cover_file, StorageCategory::Images)?;
    }
    Ok(())
  }

  fn find(&self, track_id: i64) -> Result<Track> {
    let conn = self.pool.get()?;
    track_repository::get_track_by_id(track_id, &conn)?
      .ok_or_else(|| ServiceError::track_not_found(track_id))
  }

  fn insert(&self, new_track: &NewTrack) -> Result<Track> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction()?;

    let track_id = track_repository::add_one(new_track, &tx)?;
    let track = track_repository::get_track_by_id(track_id, &tx)?
      .ok_or_else(|| ServiceError::track_not_found(track_id))?;

    tx.commit()?;
    Ok(track)
  }

  fn save(&self, track: &Track) -> Result<Track> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction()?;

    if track_repository::update_one(track, &tx)? == 0 {
      return Err(ServiceError::track_not_found(track.id));
    }
    let saved = track_repository::get_track_by_id(track.id, &tx)?
      .ok_or_else(|| ServiceError::track_not_found(track.id))?;

    tx.commit()?;
    Ok(saved)
  }

  fn remove(&self, track_id: i64) -> Result<Track> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction()?;

    let track = track_repository::get_track_by_id(track_id, &tx)?
      .ok_or_else(|| ServiceError::track_not_found(track_id))?;
    track_repository::delete_one(track_id, &tx)?;

    tx.commit()?;
    Ok(track)
  }
}
