pub mod auth;
mod completions;
mod error;
mod habits;
mod stats;
mod users;
mod validation;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/validate", get(auth::validate));

    // Registration is public; everything else requires a session
    let public_routes = Router::new().route("/users", post(users::create_user));

    let protected_routes = Router::new()
        // Users
        .route("/users/:id", get(users::get_user))
        .route("/users/:id", patch(users::update_user))
        .route("/users/:id", delete(users::delete_user))
        // Habits
        .route("/habits", get(habits::list_habits))
        .route("/habits", post(habits::create_habit))
        .route("/habits/:id", get(habits::get_habit))
        .route("/habits/:id", patch(habits::update_habit))
        .route("/habits/:id", delete(habits::delete_habit))
        // Completions
        .route("/habits/:id/completions", post(completions::mark_complete))
        .route(
            "/habits/:id/completions",
            delete(completions::unmark_complete),
        )
        // Derived stats
        .route("/habits/:id/stats", get(stats::habit_stats))
        // Protected by auth
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
