//! LiftLog Server Library
//!
//! Personal fitness-tracking backend: accounts, workouts, set logs, and
//! personal-record tracking over an estimated one-rep-max comparison. This
//! module exports the core types and the router builder for testing and
//! reuse.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

pub use config::Config;
pub use db::create_pool;
pub use error::{AppError, Result};

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use auth::{require_auth, Tokens};
use service::{AuthService, RecordTracker, TxManager, WorkoutService};
use store::Store;

/// Application state shared across all handlers, generic over the backing
/// store so the tests can run the full router against the in-memory
/// implementation.
pub struct AppState<S: Store> {
    pub store: Arc<S>,
    pub auth: AuthService<S>,
    pub workouts: WorkoutService<S>,
    pub tokens: Tokens,
    pub config: Config,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            auth: self.auth.clone(),
            workouts: self.workouts.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> AppState<S> {
    /// Wire the service graph over the given store and configuration.
    pub fn new(store: Arc<S>, config: Config) -> Self {
        let tokens = Tokens::new(config.jwt_secret.clone(), config.token_ttl_secs);
        let tx = TxManager::new(Arc::clone(&store));
        let records = RecordTracker::new(Arc::clone(&store), tx.clone());
        let auth = AuthService::new(Arc::clone(&store), tx.clone(), tokens.clone());
        let workouts = WorkoutService::new(Arc::clone(&store), tx, records);

        Self {
            store,
            auth,
            workouts,
            tokens,
            config,
        }
    }
}

/// Build the application router. Everything under `/api` except
/// register/login requires a bearer token.
pub fn app<S: Store>(state: AppState<S>) -> Router {
    let protected = Router::new()
        .route(
            "/api/workouts",
            post(routes::create_workout::<S>).get(routes::list_workouts::<S>),
        )
        .route("/api/workouts/:id", get(routes::get_workout::<S>))
        .route(
            "/api/workouts/:id/exercises",
            post(routes::add_exercise_to_workout::<S>),
        )
        .route("/api/records", get(routes::list_personal_records::<S>))
        .route("/api/exercises", get(routes::list_exercises::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<S>,
        ));

    Router::new()
        .route("/health", get(routes::health_check::<S>))
        .route("/api/register", post(routes::register::<S>))
        .route("/api/login", post(routes::login::<S>))
        .merge(protected)
        .with_state(state)
}
