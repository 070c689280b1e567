use crate::{
    errors, handlers,
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Router-level settings that do not belong to the handlers themselves.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub allowed_origins: Vec<String>,
    /// Body cap for uploads; `None` leaves request bodies unlimited.
    pub max_upload_bytes: Option<usize>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            max_upload_bytes: None,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>, options: &RouterOptions) -> Router {
    let body_limit = match options.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(handlers::hello))
        .route("/birthday/{id}", get(handlers::get_birthday))
        .route("/submit", post(handlers::submit_wish))
        // Middleware Layers
        .layer(body_limit)
        .layer(CatchPanicLayer::custom(errors::panic_response))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Pass the application state
}
