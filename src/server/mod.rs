//! JSON API over the roster and scenario engine. Routing is plain functions
//! ([routes::route_request]); axum only carries requests to it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tracing::{error, info};

use crate::config::Config;
use crate::data::{CachedRoster, LoadError, RosterCache};

pub mod api;
pub mod routes;

/// Shared by every request: configuration plus the session roster cache.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub cache: RosterCache,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config,
            cache: RosterCache::new(),
        }
    }

    /// The configured roster, loaded on first use.
    pub fn roster(&self) -> Result<CachedRoster, LoadError> {
        self.cache.get_or_load(&self.config.roster_path)
    }

    pub fn reload_roster(&self) -> Result<CachedRoster, LoadError> {
        self.cache.reload(&self.config.roster_path)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

    // Roster loads read the file system; keep them off the async workers.
    let handled = tokio::task::spawn_blocking(move || {
        routes::route_request(&state, method.as_str(), &path, &body)
    })
    .await;

    match handled {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status_code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                [(header::CONTENT_TYPE, response.content_type)],
                response.body,
            )
                .into_response()
        }
        Err(err) => {
            error!(%err, "request handler panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn serve(config: Config) -> std::io::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));

    // Load eagerly so a bad source is logged at startup; /api/roster/reload can recover later.
    if let Err(err) = state.roster() {
        error!(%err, "could not load roster");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("headcount server listening on http://{bind_addr}");
    axum::serve(listener, router(state)).await
}

pub fn run_server(config: Config) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config))
}
