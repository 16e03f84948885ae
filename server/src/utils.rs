use crate::storage::file_extension;

/// Trims a query parameter and drops it when nothing is left.
pub fn process_param(param: Option<&str>) -> Option<String> {
  param
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(|s| s.to_owned())
}

pub fn content_type_for(file_name: &str) -> &'static str {
  match file_extension(file_name).as_str() {
    "mp3" => "audio/mpeg",
    "wav" => "audio/wav",
    "ogg" => "audio/ogg",
    "jpg" | "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "webp" => "image/webp",
    _ => "application/octet-stream",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn process_param_trims_and_drops_blank() {
    assert_eq!(process_param(Some("  beat ")), Some("beat".to_owned()));
    assert_eq!(process_param(Some("   ")), None);
    assert_eq!(process_param(None), None);
  }

  #[test]
  fn content_types() {
    assert_eq!(content_type_for("/uploads/audio/x_song.MP3"), "audio/mpeg");
    assert_eq!(content_type_for("cover.jpeg"), "image/jpeg");
    assert_eq!(content_type_for("README"), "application/octet-stream");
  }
}
