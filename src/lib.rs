pub mod config;
pub mod database;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod projection;
pub mod session;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use config::Config;
use database::{create_database, Database};
use error::RegistrationError;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
}

pub fn build_state(config: Config) -> Result<AppState, RegistrationError> {
    let db = create_database(&config)?;
    Ok(AppState {
        db,
        config: Arc::new(config),
    })
}

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Public routes
        .route("/", get(handlers::auth::index))
        .route("/login", get(handlers::auth::login_page).post(handlers::auth::login))
        .route(
            "/register",
            get(handlers::auth::register_page).post(handlers::auth::register),
        )
        .route("/logout", post(handlers::auth::logout))
        // Role-dispatched dashboard
        .route("/dashboard", get(handlers::dashboard::dashboard))
        // Expenses
        .route("/expenses/new", get(handlers::expenses::expense_form))
        .route("/expenses", post(handlers::expenses::create_expense))
        .route("/expenses/:id", get(handlers::expenses::expense_detail))
        .route(
            "/expenses/:id/approve",
            get(handlers::expenses::approve_confirmation).post(handlers::expenses::approve_expense),
        )
        .route(
            "/expenses/:id/reject",
            get(handlers::expenses::reject_confirmation).post(handlers::expenses::reject_expense),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)), // 10MB
        )
        .with_state(state)
}
