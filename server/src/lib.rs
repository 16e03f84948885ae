use axum::{
  extract::DefaultBodyLimit,
  http::{
    header::HeaderValue,
    Method,
    Request,
  },
  body::Body,
  response::Response,
  routing::get,
  Router,
};
use tracing_subscriber::EnvFilter;
use std::time::Duration;
use routes::{
  create_track,
  delete_track,
  get_track_by_id,
  get_upload,
  list_tracks,
  search_tracks,
  update_track,
};
use std::sync::Arc;
use crate::config::ServerConfig;
use db::init_db;
use services::track_service::TrackService;
use storage::FileStore;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer}, trace::{self, TraceLayer}
};
use tracing::Span;
use tokio::signal;

pub mod config;
pub mod errors;
pub mod routes;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod utils;
pub mod db;

pub struct AppState {
  pub tracks: TrackService,
}

impl AppState {
  pub fn new(tracks: TrackService) -> Self {
    Self { tracks }
  }
}

pub fn app(state: Arc<AppState>, config: &ServerConfig) -> Router {
  let api_routes = Router::new()
    .route("/tracks", get(list_tracks::route).post(create_track::route))
    .route("/tracks/search", get(search_tracks::route))
    .route(
      "/tracks/:track_id",
      get(get_track_by_id::route)
        .put(update_track::route)
        .delete(delete_track::route),
    );

  Router::new()
    .nest("/api", api_routes)
    .route("/uploads/*path", get(get_upload::route))
    .with_state(state)
    .layer(DefaultBodyLimit::max(config.max_upload_bytes))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
          let headers = request.headers();
          let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
          let method = request.method().to_string();
          let uri = request.uri().to_string();

          tracing::info_span!("request", method, uri, user_agent)
        })
        .on_response(|response: &Response, latency: Duration, _span: &Span| {
          let status_code = response.status().as_u16();
          let latency = latency.as_millis();

          tracing::info!(
            message = "finished processing request",
            latency = latency,
            status_code = status_code,
          )
        })
        .on_failure(trace::DefaultOnFailure::new().level(tracing::Level::ERROR))
    )
    .layer(cors_layer(&config.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
  let allow_origin = if allowed_origins.is_empty() {
    AllowOrigin::from(Any)
  } else {
    let origins = allowed_origins
      .iter()
      .filter_map(|origin| match origin.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(_) => {
          tracing::warn!(message = "ignoring invalid CORS origin", origin = origin.as_str());
          None
        }
      })
      .collect::<Vec<HeaderValue>>();
    AllowOrigin::list(origins)
  };

  CorsLayer::new()
    .allow_origin(allow_origin)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
    .allow_headers(Any)
    .max_age(Duration::from_secs(3600))
}

pub async fn serve(config: ServerConfig) {
  tracing_subscriber::fmt()
    .compact()
    .with_env_filter(EnvFilter::from_env("MUSICSTREAM_LOG"))
    .init();

  let pool = init_db(&config.database).expect("Cannot initialize connection to SQLite database!");

  let store = FileStore::new(&config.storage_location)
    .and_then(|store| store.init().map(|_| store))
    .expect("Cannot initialize upload storage!");

  let state = Arc::new(AppState::new(TrackService::new(pool, store)));

  let app = app(state, &config);

  let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await.unwrap();
  println!("MusicStream server is listening on {}!", listener.local_addr().unwrap());
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
