use std::path::PathBuf;
use clap::{Parser, Subcommand};
use server::{config::ServerConfig, serve};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Start the MusicStream server
  Serve {
    /// The port you want the server to bind to.
    #[arg(short, long, value_name = "PORT", env = "MUSICSTREAM_PORT", default_value_t = 8080)]
    port: u16,

    /// Path to the database file
    #[arg(short, long, value_name = "FILE", env = "MUSICSTREAM_DATABASE", default_value = "musicstream.db")]
    database: PathBuf,

    /// Directory where uploaded audio and cover files are stored
    #[arg(short, long, value_name = "DIR", env = "MUSICSTREAM_STORAGE_LOCATION", default_value = "uploads")]
    storage_location: PathBuf,

    /// Origin allowed to call the API. Pass an empty value to allow any origin.
    #[arg(
      long = "allowed-origin",
      value_name = "ORIGIN",
      env = "MUSICSTREAM_ALLOWED_ORIGINS",
      value_delimiter = ',',
      default_values = ["http://localhost:4200", "http://localhost:4201"],
    )]
    allowed_origins: Vec<String>,

    /// Maximum size of an upload request, in megabytes
    #[arg(long, value_name = "MB", env = "MUSICSTREAM_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,
  },
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Serve { port, database, storage_location, allowed_origins, max_upload_mb }) => {
      let config = ServerConfig {
        port,
        database,
        storage_location,
        allowed_origins: allowed_origins.into_iter().filter(|origin| !origin.trim().is_empty()).collect(),
        max_upload_bytes: max_upload_mb * 1024 * 1024,
      };
      serve(config).await;
    },
    None => {}
  }
}
