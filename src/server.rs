use std::net::SocketAddr;

use axum::http::request::Parts;
use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowCredentials, AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{create_pool, migrations};
use crate::error::error_detail_middleware;
use crate::handlers;
use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;

/// Build the application state and Axum router from a [`Config`].
///
/// Creates the database pool, runs migrations and assembles the full
/// middleware stack. Returns the shared state and a ready-to-serve router.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let db = create_pool(&config.database_path)?;

    {
        let mut conn = db.get()?;
        migrations::run_migrations(&mut conn, &config.migrations_path)?;
    }

    let state = AppState::new(db, config);
    let app = router(state.clone());

    Ok((state, app))
}

/// The API under `/api`, plus the web client when a static path is configured.
pub fn router(state: AppState) -> Router {
    let api = handlers::routes()
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let mut app = Router::new().nest("/api", api);

    if let Some(static_path) = &state.config.static_path {
        tracing::info!(path = %static_path.display(), "Serving web client");
        let index = ServeFile::new(static_path.join("index.html"));
        app = app.fallback_service(ServeDir::new(static_path).fallback(index));
    }

    app.layer(middleware::from_fn_with_state(
        state.clone(),
        error_detail_middleware,
    ))
    .layer(cors_layer(&state.config))
    .layer(CompressionLayer::new())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentials are only advertised to origins on the allow-list.
    let credentialed = origins.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(AllowCredentials::predicate(
            move |origin: &HeaderValue, _: &Parts| credentialed.contains(origin),
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        if let Err(e) = axum::serve(listener, service).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_port, handle))
}
