use std::collections::HashMap;

use axum::{extract::Query, Json};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_own_attempt, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::types::QuestionType;
use crate::repositories;
use crate::schemas::attempt::{AttemptStartInfo, StartAttemptResponse};
use crate::schemas::question::QuestionTakingView;
use crate::services::drawing;

use super::super::helpers;
use super::super::queries::AttemptQuestionsQuery;

/// Opens a new attempt: draws a random subset of the exam's bank, freezes
/// question and option order into the manifest, and returns the full
/// exam-taking payload. The attempt row and its manifest commit together.
pub(in crate::api::exams) async fn start_attempt(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<StartAttemptResponse>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let now = primitive_now_utc();
    let attempt_id = Uuid::new_v4().to_string();
    let attempt = repositories::attempts::create(
        &mut *tx,
        repositories::attempts::CreateAttempt {
            id: &attempt_id,
            user_id: &user.id,
            exam_id: &exam.id,
            started_at: now,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create attempt"))?;

    let bank = repositories::questions::list_draw_rows(&mut *tx, &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question bank"))?;
    if bank.is_empty() {
        // Dropping the open transaction rolls the attempt row back.
        return Err(ApiError::BadRequest("Exam has no questions".to_string()));
    }

    let mut rng = drawing::attempt_rng();
    let target = drawing::draw_target(&mut rng, bank.len());
    let selected = drawing::choose_subset(&mut rng, bank, target);

    let optioned_ids: Vec<String> = selected
        .iter()
        .filter(|row| row.question_type != QuestionType::Hotspot)
        .map(|row| row.id.clone())
        .collect();
    let mut canonical_options: HashMap<String, Vec<String>> = HashMap::new();
    for option in repositories::options::list_by_questions(&mut *tx, &optioned_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question options"))?
    {
        canonical_options.entry(option.question_id).or_default().push(option.id);
    }

    let mut manifest = Vec::with_capacity(selected.len());
    for (index, row) in selected.into_iter().enumerate() {
        let options_order = if row.question_type == QuestionType::Hotspot {
            None
        } else {
            let ids = canonical_options.remove(&row.id).unwrap_or_default();
            Some(drawing::shuffle_order(&mut rng, ids))
        };
        manifest.push(repositories::attempt_questions::NewAttemptQuestion {
            id: Uuid::new_v4().to_string(),
            attempt_id: attempt.id.clone(),
            question_id: row.id,
            question_order: (index + 1) as i32,
            options_order,
        });
    }

    repositories::attempt_questions::insert_manifest(&mut *tx, &manifest)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store attempt manifest"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    // Replay the stored manifest so the response matches later fetches.
    let stored = repositories::attempt_questions::list_by_attempt(state.db(), &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt manifest"))?;
    let questions = helpers::hydrate_manifest(state.db(), &stored).await?;

    tracing::info!(
        exam_id = %exam.id,
        attempt_id = %attempt.id,
        user_id = %user.id,
        question_count = questions.len(),
        "Attempt started"
    );

    Ok(Json(StartAttemptResponse {
        attempt: AttemptStartInfo {
            id: attempt.id,
            exam_id: attempt.exam_id,
            time_limit_minutes: exam.time_limit_minutes,
            total_questions: questions.len(),
            started_at: format_primitive(attempt.started_at),
        },
        questions,
    }))
}

/// Re-fetches the frozen question set of an existing attempt, in the same
/// order and with the same option shuffle the attempt started with.
pub(in crate::api::exams) async fn attempt_questions(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    Query(params): Query<AttemptQuestionsQuery>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<Vec<QuestionTakingView>>, ApiError> {
    let attempt = require_own_attempt(&state, &user, &params.attempt_id).await?;
    if attempt.exam_id != exam_id {
        return Err(ApiError::Forbidden("Attempt does not belong to this exam"));
    }

    let stored = repositories::attempt_questions::list_by_attempt(state.db(), &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt manifest"))?;
    let questions = helpers::hydrate_manifest(state.db(), &stored).await?;

    Ok(Json(questions))
}
