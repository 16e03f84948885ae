use std::path::PathBuf;

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:4200", "http://localhost:4201"];

/// Settings fixed at process start and handed to [`crate::serve`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub port: u16,
  pub database: PathBuf,
  /// Root directory of the file store.
  pub storage_location: PathBuf,
  /// An empty list allows any origin.
  pub allowed_origins: Vec<String>,
  pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      port: 8080,
      database: PathBuf::from("musicstream.db"),
      storage_location: PathBuf::from("uploads"),
      allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
      max_upload_bytes: 50 * 1024 * 1024,
    }
  }
}
