use axum::extract::{multipart::Field, Multipart};
use crate::{
  errors::ApiError,
  services::track_service::TrackUpload,
  storage::Upload,
};

/// Reads the multipart body shared by track creation and update.
///
/// Text parts: `title`, `artist`, `description`, `category`, `duration`.
/// File parts: `audioFile`, `coverFile`. Unknown parts are skipped.
pub async fn read_track_upload(mut multipart: Multipart) -> Result<TrackUpload, ApiError> {
  let mut upload = TrackUpload::default();

  while let Some(field) = multipart.next_field().await? {
    let name = field.name().unwrap_or_default().to_owned();

    match name.as_str() {
      "title" => upload.fields.title = Some(field.text().await?),
      "artist" => upload.fields.artist = Some(field.text().await?),
      "description" => upload.fields.description = Some(field.text().await?),
      "category" => upload.fields.category = Some(field.text().await?),
      "duration" => upload.fields.duration = parse_duration(&field.text().await?)?,
      "audioFile" => upload.audio_file = Some(read_file(field).await?),
      "coverFile" => upload.cover_file = Some(read_file(field).await?),
      _ => tracing::debug!(message = "ignoring multipart field", name = name.as_str()),
    }
  }

  Ok(upload)
}

async fn read_file(field: Field<'_>) -> Result<Upload, ApiError> {
  let file_name = field.file_name().map(|s| s.to_owned());
  let content_type = field.content_type().map(|s| s.to_owned());
  let data = field.bytes().await?;

  Ok(Upload { file_name, content_type, data })
}

/// Blank values count as absent.
pub fn parse_duration(value: &str) -> Result<Option<i64>, ApiError> {
  let value = value.trim();
  if value.is_empty() {
    return Ok(None);
  }

  value
    .parse::<i64>()
    .map(Some)
    .map_err(|_| ApiError::ValidationError("Duration must be a whole number of seconds".to_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{body::Body, extract::FromRequest, http::Request};

  async fn multipart(body: &'static str) -> Multipart {
    let request = Request::builder()
      .header("content-type", "multipart/form-data; boundary=X")
      .body(Body::from(body.replace('\n', "\r\n")))
      .unwrap();
    Multipart::from_request(request, &()).await.unwrap()
  }

  #[tokio::test]
  async fn reads_fields_and_file_metadata() {
    let body = "--X\n\
      Content-Disposition: form-data; name=\"title\"\n\n\
      Sun\n\
      --X\n\
      Content-Disposition: form-data; name=\"duration\"\n\n\
      180\n\
      --X\n\
      Content-Disposition: form-data; name=\"audioFile\"; filename=\"song.mp3\"\n\
      Content-Type: audio/mpeg\n\n\
      ID3\n\
      --X--\n";

    let upload = read_track_upload(multipart(body).await).await.unwrap();

    assert_eq!(upload.fields.title.as_deref(), Some("Sun"));
    assert_eq!(upload.fields.duration, Some(180));
    let audio = upload.audio_file.unwrap();
    assert_eq!(audio.file_name.as_deref(), Some("song.mp3"));
    assert_eq!(audio.content_type.as_deref(), Some("audio/mpeg"));
    assert_eq!(&audio.data[..], b"ID3");
    assert!(upload.cover_file.is_none());
  }

  #[test]
  fn parse_duration_values() {
    assert_eq!(parse_duration("180").unwrap(), Some(180));
    assert_eq!(parse_duration(" 42 ").unwrap(), Some(42));
    assert_eq!(parse_duration("").unwrap(), None);
    assert_eq!(parse_duration("-5").unwrap(), Some(-5));
    assert!(matches!(parse_duration("3:00"), Err(ApiError::ValidationError(_))));
  }
}
