mod handlers;
mod helpers;
mod queries;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_attempts))
        .route("/:attempt_id", get(handlers::get_attempt_review))
        .route("/:attempt_id/answers", post(handlers::save_answer))
        .route("/:attempt_id/progress", get(handlers::get_progress))
        .route("/:attempt_id/submit", post(handlers::submit_attempt))
}

#[cfg(test)]
mod tests;
