// routes.rs - application router
//
// Public routes (/, /health) are mounted without authentication; everything
// under /api/v1 passes through `jwt_auth_middleware` first.

use std::sync::Arc;

use axum::{http::HeaderValue, middleware::from_fn, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::config;
use crate::database::store::EntityStore;
use crate::entity::registry;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AdminService, EntityService, ResetService};

/// Shared handle to the persistence layer.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }
}

pub fn app(state: AppState) -> Router {
    let mut app = Router::new()
        .merge(protected_routes(&state))
        .merge(public_routes(state));

    if config().security.enable_cors {
        app = app.layer(cors_layer(&config().security.cors_origins));
    }
    if config().api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::root::index))
        .route("/health", get(public::root::health))
        .with_state(state)
}

fn protected_routes(state: &AppState) -> Router {
    let store = state.store().clone();

    let entities = registry().iter().fold(Router::new(), |router, entity| {
        router.merge(protected::entities::routes(EntityService::new(entity, store.clone())))
    });

    entities
        .merge(protected::config::routes(store.clone()))
        .merge(protected::reset::routes(ResetService::new(store.clone())))
        .merge(protected::db_admin::routes(AdminService::new(store)))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
