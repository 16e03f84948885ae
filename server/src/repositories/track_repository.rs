use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use indoc::{formatdoc, indoc};
use crate::entities::track::{NewTrack, Track};

const TRACK_COLUMNS: &str = indoc! {"
  tracks.id,
  tracks.title,
  tracks.artist,
  tracks.description,
  tracks.category,
  tracks.duration,
  tracks.audio_url,
  tracks.cover_url,
  tracks.added_date
"};

fn map_track(row: &Row) -> rusqlite::Result<Track> {
  Ok(Track {
    id: row.get("id")?,
    title: row.get("title")?,
    artist: row.get("artist")?,
    description: row.get("description")?,
    category: row.get("category")?,
    duration: row.get("duration")?,
    audio_url: row.get("audio_url")?,
    cover_url: row.get("cover_url")?,
    added_date: row.get("added_date")?,
  })
}

pub fn get_all(conn: &Connection) -> Result<Vec<Track>> {
  let query = format!("SELECT {} FROM tracks ORDER BY tracks.id", TRACK_COLUMNS);
  let mut statement = conn.prepare(&query)?;
  let tracks = statement
    .query_map([], map_track)?
    .collect::<rusqlite::Result<Vec<Track>>>()?;
  Ok(tracks)
}

pub fn get_track_by_id(track_id: i64, conn: &Connection) -> Result<Option<Track>> {
  let query = format!("SELECT {} FROM tracks WHERE tracks.id = ?", TRACK_COLUMNS);
  let mut statement = conn.prepare(&query)?;
  let row = statement.query_row([track_id], map_track).optional()?;
  Ok(row)
}

pub fn get_tracks_by_category(category: &str, conn: &Connection) -> Result<Vec<Track>> {
  let query = format!(
    "SELECT {} FROM tracks WHERE tracks.category = ? ORDER BY tracks.id",
    TRACK_COLUMNS,
  );
  let mut statement = conn.prepare(&query)?;
  let tracks = statement
    .query_map([category], map_track)?
    .collect::<rusqlite::Result<Vec<Track>>>()?;
  Ok(tracks)
}

/// Case-insensitive substring match on title or artist.
///
/// `instr` is used instead of `LIKE` so that `%` and `_` in the keyword are
/// matched literally.
pub fn search(keyword: &str, conn: &Connection) -> Result<Vec<Track>> {
  let query = formatdoc! {"
      SELECT {}
      FROM
        tracks
      WHERE
        instr(lower(tracks.title), lower(?1)) > 0
        OR instr(lower(tracks.artist), lower(?1)) > 0
      ORDER BY
        tracks.id
    ",
    TRACK_COLUMNS,
  };
  let mut statement = conn.prepare(&query)?;
  let tracks = statement
    .query_map([keyword], map_track)?
    .collect::<rusqlite::Result<Vec<Track>>>()?;

  tracing::debug!(message = "searched tracks", keyword, results = tracks.len());

  Ok(tracks)
}

pub fn add_one(track: &NewTrack, conn: &Connection) -> Result<i64> {
  let query = indoc! {"
    INSERT INTO tracks (
      title,
      artist,
      description,
      category,
      duration,
      audio_url,
      cover_url,
      added_date
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
  "};
  let mut statement = conn.prepare(query)?;
  let row_id = statement.insert(
    (
      &track.title,
      &track.artist,
      &track.description,
      &track.category,
      track.duration,
      &track.audio_url,
      &track.cover_url,
      track.added_date,
    )
  )?;
  Ok(row_id)
}

/// Overwrites every mutable column of an existing row. `added_date` is never
/// touched. Returns the number of affected rows.
pub fn update_one(track: &Track, conn: &Connection) -> Result<usize> {
  let query = indoc! {"
    UPDATE tracks
    SET
      title = ?,
      artist = ?,
      description = ?,
      category = ?,
      duration = ?,
      audio_url = ?,
      cover_url = ?
    WHERE
      id = ?
  "};
  let mut statement = conn.prepare(query)?;
  let affected = statement.execute(
    (
      &track.title,
      &track.artist,
      &track.description,
      &track.category,
      track.duration,
      &track.audio_url,
      &track.cover_url,
      track.id,
    )
  )?;
  Ok(affected)
}

pub fn delete_one(track_id: i64, conn: &Connection) -> Result<usize> {
  let mut statement = conn.prepare("DELETE FROM tracks WHERE id = ?")?;
  let affected = statement.execute([track_id])?;
  Ok(affected)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::init_memory_db;
  use chrono::Utc;

  fn new_track(title: &str, artist: &str, category: &str) -> NewTrack {
    NewTrack {
      title: title.to_owned(),
      artist: artist.to_owned(),
      description: String::new(),
      category: category.to_owned(),
      duration: 180,
      audio_url: format!("/uploads/audio/{}.mp3", title),
      cover_url: None,
      added_date: Utc::now(),
    }
  }

  #[test]
  fn add_and_get_track() {
    let pool = init_memory_db().unwrap();
    let conn = pool.get().unwrap();

    let id = add_one(&new_track("Sun", "Rae", "pop"), &conn).unwrap();
    let track = get_track_by_id(id, &conn).unwrap().unwrap();

    assert_eq!(track.id, id);
    assert_eq!(track.title, "Sun");
    assert_eq!(track.artist, "Rae");
    assert_eq!(track.description.as_deref(), Some(""));
    assert_eq!(track.audio_url.as_deref(), Some("/uploads/audio/Sun.mp3"));
    assert_eq!(track.cover_url, None);
    assert!(track.added_date.is_some());
  }

  #[test]
  fn missing_track_is_none() {
    let pool = init_memory_db().unwrap();
    let conn = pool.get().unwrap();
    assert!(get_track_by_id(99, &conn).unwrap().is_none());
  }

  #[test]
  fn search_matches_title_or_artist_ignoring_case() {
    let pool = init_memory_db().unwrap();
    let conn = pool.get().unwrap();

    add_one(&new_track("Heartbeat", "Nova", "pop"), &conn).unwrap();
    add_one(&new_track("Quiet", "The BEATniks", "jazz"), &conn).unwrap();
    add_one(&new_track("Rain", "Cloud", "ambient"), &conn).unwrap();

    let titles: Vec<String> = search("beat", &conn).unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Heartbeat", "Quiet"]);
  }

  #[test]
  fn search_treats_wildcards_literally() {
    let pool = init_memory_db().unwrap();
    let conn = pool.get().unwrap();

    add_one(&new_track("100% Pure", "Nova", "pop"), &conn).unwrap();
    add_one(&new_track("Plain", "Nova", "pop"), &conn).unwrap();

    assert_eq!(search("%", &conn).unwrap().len(), 1);
    assert_eq!(search("_", &conn).unwrap().len(), 0);
  }

  #[test]
  fn update_keeps_added_date() {
    let pool = init_memory_db().unwrap();
    let conn = pool.get().unwrap();

    let id = add_one(&new_track("Sun", "Rae", "pop"), &conn).unwrap();
    let original = get_track_by_id(id, &conn).unwrap().unwrap();

    let mut changed = original.clone();
    changed.title = "Moon".to_owned();
    changed.duration = 200;
    changed.added_date = None;
    assert_eq!(update_one(&changed, &conn).unwrap(), 1);

    let stored = get_track_by_id(id, &conn).unwrap().unwrap();
    assert_eq!(stored.title, "Moon");
    assert_eq!(stored.duration, 200);
    assert_eq!(stored.added_date, original.added_date);
  }

  #[test]
  fn filter_by_category_and_delete() {
    let pool = init_memory_db().unwrap();
    let conn = pool.get().unwrap();

    let a = add_one(&new_track("A", "X", "pop"), &conn).unwrap();
    add_one(&new_track("B", "Y", "rock"), &conn).unwrap();

    let pop = get_tracks_by_category("pop", &conn).unwrap();
    assert_eq!(pop.len(), 1);
    assert_eq!(pop[0].id, a);

    assert_eq!(delete_one(a, &conn).unwrap(), 1);
    assert_eq!(delete_one(a, &conn).unwrap(), 0);
    assert_eq!(get_all(&conn).unwrap().len(), 1);
  }
}
