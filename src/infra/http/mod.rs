pub mod error;
pub mod handlers;
mod state;

use axum::Router;
use axum::routing::{get, post};

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/export", post(handlers::export))
        .route("/items/{id}/body", get(handlers::item_body))
        .with_state(state)
}
