use axum::extract::{Path, State};
use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{ApiJson, AppState};
use crate::config::config;
use crate::database::models::LabelKind;
use crate::handlers::label::LabelRequest;
use crate::handlers::{home_group, inventory, label, system, user};

/// Full application router with global middleware
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/api/inventory", inventory_routes())
        .nest("/api/category", label_routes(LabelKind::Category))
        .nest("/api/position", label_routes(LabelKind::Position))
        .nest("/api/homeGroup", home_group_routes())
        .nest("/api/user", user_routes())
        .with_state(state);

    // Global middleware
    if let Some(cors) = cors_layer() {
        router = router.layer(cors);
    }
    if config().api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/queryByParams", post(inventory::query_by_params))
        .route("/add", post(inventory::add))
        .route("/update/:id", put(inventory::update))
        .route("/delete/:id", delete(inventory::delete))
}

fn label_routes(kind: LabelKind) -> Router<AppState> {
    Router::new()
        .route(
            "/queryByParams",
            post(move |state: State<AppState>, body: ApiJson<LabelRequest>| {
                label::query_by_params(kind, state, body)
            }),
        )
        .route(
            "/add",
            post(move |state: State<AppState>, body: ApiJson<LabelRequest>| {
                label::add(kind, state, body)
            }),
        )
        .route(
            "/update/:id",
            put(
                move |state: State<AppState>, path: Path<String>, body: ApiJson<LabelRequest>| {
                    label::update(kind, state, path, body)
                },
            ),
        )
        .route(
            "/delete/:id",
            delete(
                move |state: State<AppState>, path: Path<String>, body: ApiJson<LabelRequest>| {
                    label::delete(kind, state, path, body)
                },
            ),
        )
}

fn home_group_routes() -> Router<AppState> {
    Router::new()
        .route("/queryByParams", post(home_group::query_by_params))
        .route("/add", post(home_group::add))
        .route("/addMember", post(home_group::add_member))
        .route("/update", put(home_group::update))
        .route("/delete", delete(home_group::delete))
        .route("/deleteMember", delete(home_group::delete_member))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/queryByParams", post(user::query_by_params))
        .route("/add", post(user::add))
        .route("/update", put(user::update).post(user::update))
        .route("/delete", delete(user::delete))
        .route("/getOpenId", post(user::get_open_id))
}

fn cors_layer() -> Option<CorsLayer> {
    let security = &config().security;
    if !security.enable_cors {
        return None;
    }
    // No explicit origins means any origin
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
