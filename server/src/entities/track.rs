use chrono::prelude::*;

/// A track row as persisted in the `tracks` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
  pub id: i64,
  pub title: String,
  pub artist: String,
  pub description: Option<String>,
  pub category: String,
  pub duration: i64,
  pub audio_url: Option<String>,
  pub cover_url: Option<String>,
  pub added_date: Option<DateTime<Utc>>,
}

/// Column values for a track that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewTrack {
  pub title: String,
  pub artist: String,
  pub description: String,
  pub category: String,
  pub duration: i64,
  pub audio_url: String,
  pub cover_url: Option<String>,
  pub added_date: DateTime<Utc>,
}
