use axum::{routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::question::QuestionDetailResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:question_id", get(get_question).delete(delete_question))
}

async fn get_question(
    axum::extract::Path(question_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<Json<QuestionDetailResponse>, ApiError> {
    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
    let Some(question) = question else {
        return Err(ApiError::NotFound("Question not found".to_string()));
    };

    let options = repositories::options::list_by_question(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question options"))?;
    let areas = repositories::hotspot_areas::list_by_question(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch hotspot areas"))?;

    Ok(Json(QuestionDetailResponse::from_db(question, options, areas)))
}

/// Removes a question from the bank. Options, areas, manifest rows and
/// answers referencing it go with it through the cascade; the exam's
/// denormalized question count is recomputed in the same transaction.
async fn delete_question(
    axum::extract::Path(question_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<axum::http::StatusCode, ApiError> {
    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
    let Some(question) = question else {
        return Err(ApiError::NotFound("Question not found".to_string()));
    };

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::questions::delete_by_id(&mut *tx, &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;
    repositories::exams::refresh_question_count(&mut *tx, &question.exam_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to refresh question count"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(question_id = %question.id, exam_id = %question.exam_id, "Question deleted");

    Ok(axum::http::StatusCode::NO_CONTENT)
}
