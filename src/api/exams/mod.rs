mod handlers;
mod helpers;
mod queries;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_exam).get(handlers::list_exams))
        .route(
            "/:exam_id",
            get(handlers::get_exam).patch(handlers::update_exam).delete(handlers::delete_exam),
        )
        .route(
            "/:exam_id/questions",
            post(handlers::create_question).get(handlers::attempt_questions),
        )
        .route("/:exam_id/questions/catalog", get(handlers::list_question_catalog))
        .route("/:exam_id/questions/import", post(handlers::import_questions))
        .route(
            "/:exam_id/case-studies",
            post(handlers::create_case_study).get(handlers::list_case_studies),
        )
        .route("/:exam_id/start", get(handlers::start_attempt))
}
