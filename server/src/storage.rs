use std::path::{Component, Path, PathBuf};
use axum::body::Bytes;
use tokio::fs;
use uuid::Uuid;
use crate::errors::ServiceError;

type Result<T> = std::result::Result<T, ServiceError>;

pub const UPLOADS_PREFIX: &str = "/uploads/";

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// The fixed subdirectories of the upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCategory {
  Audio,
  Images,
}

impl StorageCategory {
  pub const ALL: [StorageCategory; 2] = [StorageCategory::Audio, StorageCategory::Images];

  pub fn dir_name(&self) -> &'static str {
    match self {
      StorageCategory::Audio => "audio",
      StorageCategory::Images => "images",
    }
  }

  fn allowed_extensions(&self) -> &'static [&'static str] {
    match self {
      StorageCategory::Audio => AUDIO_EXTENSIONS,
      StorageCategory::Images => IMAGE_EXTENSIONS,
    }
  }

  fn invalid_format_message(&self) -> &'static str {
    match self {
      StorageCategory::Audio => "Invalid audio format. Allowed: MP3, WAV, OGG",
      StorageCategory::Images => "Invalid image format. Allowed: JPG, JPEG, PNG, GIF, WEBP",
    }
  }
}

/// A file received from a client, before it is written anywhere.
#[derive(Debug, Clone, Default)]
pub struct Upload {
  pub file_name: Option<String>,
  pub content_type: Option<String>,
  pub data: Bytes,
}

impl Upload {
  pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
    Self {
      file_name: Some(file_name.into()),
      content_type: None,
      data: data.into(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }
}

/// Upload storage rooted at a fixed directory:
///
/// ```text
/// <root>/
///   audio/<uuid>_<original name>
///   images/<uuid>_<original name>
/// ```
///
/// Stored files are addressed by logical paths of the form
/// `/uploads/<category>/<generated name>`.
#[derive(Debug, Clone)]
pub struct FileStore {
  root: PathBuf,
}

impl FileStore {
  /// Builds a store over `root`. Relative roots are resolved against the
  /// current working directory once, here.
  pub fn new(root: impl AsRef<Path>) -> Result<Self> {
    let root = std::path::absolute(root.as_ref()).map_err(|e| {
      ServiceError::Storage(format!("Could not resolve storage location: {}", e))
    })?;

    Ok(Self { root: normalize(&root) })
  }

  /// Creates the root and the category directories if they are missing.
  pub fn init(&self) -> Result<()> {
    std::fs::create_dir_all(&self.root)
      .and_then(|_| {
        StorageCategory::ALL
          .iter()
          .try_for_each(|category| std::fs::create_dir_all(self.category_dir(*category)))
      })
      .map_err(|e| ServiceError::Storage(format!("Could not initialize storage: {}", e)))?;

    tracing::info!(message = "upload storage ready", root = %self.root.display());
    Ok(())
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub async fn store_audio(&self, upload: &Upload) -> Result<String> {
    self.store(upload, StorageCategory::Audio).await
  }

  pub async fn store_image(&self, upload: &Upload) -> Result<String> {
    self.store(upload, StorageCategory::Images).await
  }

  /// Validates an upload and resolves where it would be written, without
  /// touching the file system.
  pub fn prepare(&self, upload: &Upload, category: StorageCategory) -> Result<(String, PathBuf)> {
    if upload.is_empty() {
      return Err(ServiceError::Validation("Failed to store empty file.".to_owned()));
    }

    let original_name = clean_path(upload.file_name.as_deref().unwrap_or_default());

    if original_name.contains("..") {
      return Err(ServiceError::Validation(
        "Cannot store file with relative path outside current directory".to_owned(),
      ));
    }

    let extension = file_extension(&original_name);
    if !category.allowed_extensions().contains(&extension.as_str()) {
      return Err(ServiceError::Validation(category.invalid_format_message().to_owned()));
    }

    let file_name = format!("{}_{}", Uuid::new_v4(), original_name);
    let category_dir = self.category_dir(category);
    let destination = normalize(&category_dir.join(&file_name));

    if destination.parent() != Some(category_dir.as_path()) {
      return Err(ServiceError::Validation(
        "Cannot store file outside current directory.".to_owned(),
      ));
    }

    Ok((file_name, destination))
  }

  async fn store(&self, upload: &Upload, category: StorageCategory) -> Result<String> {
    let (file_name, destination) = self.prepare(upload, category)?;

    fs::write(&destination, &upload.data).await.map_err(|e| {
      ServiceError::Storage(format!("Failed to store file: {}", e))
    })?;

    let logical_path = format!("{}{}/{}", UPLOADS_PREFIX, category.dir_name(), file_name);

    tracing::info!(
      message = "stored upload",
      logical_path = logical_path.as_str(),
      content_type = upload.content_type.as_deref().unwrap_or_default(),
      size = upload.len(),
    );

    Ok(logical_path)
  }

  /// Reads a stored file by logical path.
  pub async fn load(&self, logical_path: &str) -> Result<Vec<u8>> {
    let not_found = || ServiceError::NotFound(format!("Could not read file: {}", logical_path));

    let path = self.resolve(logical_path).ok_or_else(not_found)?;

    let is_file = fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
      return Err(not_found());
    }

    match fs::read(&path).await {
      Ok(data) => Ok(data),
      Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Err(not_found()),
      Err(e) => Err(ServiceError::Storage(format!("Could not read file {}: {}", logical_path, e))),
    }
  }

  /// Best-effort removal of a stored file. Absent paths are a no-op and
  /// failures are only logged.
  pub async fn delete(&self, logical_path: Option<&str>) {
    let Some(logical_path) = logical_path.filter(|p| !p.is_empty()) else {
      return;
    };

    let Some(path) = self.resolve(logical_path) else {
      tracing::warn!(message = "refusing to delete file outside storage", logical_path);
      return;
    };

    match fs::remove_file(&path).await {
      Ok(_) => tracing::info!(message = "deleted stored file", logical_path),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        tracing::debug!(message = "stored file already gone", logical_path)
      },
      Err(e) => tracing::error!(
        message = "failed to delete stored file",
        logical_path,
        error = e.to_string(),
      ),
    }
  }

  /// Maps a logical path to its location under the root. Paths that would
  /// escape the root resolve to `None`.
  pub fn resolve(&self, logical_path: &str) -> Option<PathBuf> {
    let relative = logical_path
      .strip_prefix(UPLOADS_PREFIX)
      .unwrap_or(logical_path)
      .trim_start_matches('/');

    if relative.is_empty() {
      return None;
    }

    let relative = Path::new(relative);
    let is_plain = relative
      .components()
      .all(|component| matches!(component, Component::Normal(_)));
    if !is_plain {
      return None;
    }

    let path = normalize(&self.root.join(relative));
    path.starts_with(&self.root).then_some(path)
  }

  fn category_dir(&self, category: StorageCategory) -> PathBuf {
    self.root.join(category.dir_name())
  }
}

/// Normalizes separators and drops `.` and empty segments. `..` segments are
/// kept as-is so callers can reject them.
pub fn clean_path(name: &str) -> String {
  name
    .replace('\\', "/")
    .split('/')
    .filter(|segment| !segment.is_empty() && *segment != ".")
    .collect::<Vec<&str>>()
    .join("/")
}

/// Lower-cased text after the last dot, or an empty string.
pub fn file_extension(file_name: &str) -> String {
  match file_name.rfind('.') {
    Some(index) => file_name[index + 1..].to_lowercase(),
    None => String::new(),
  }
}

/// Lexically resolves `.` and `..` components without touching the disk.
fn normalize(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {},
      Component::ParentDir => {
        normalized.pop();
      },
      other => normalized.push(other.as_os_str()),
    }
  }
  normalized
}
