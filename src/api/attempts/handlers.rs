use std::collections::HashMap;

use axum::{extract::Query, Json};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_own_attempt, CurrentUser};
use crate::api::pagination::{self, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Answer;
use crate::repositories;
use crate::schemas::attempt::{
    AnswerView, AttemptResponse, AttemptResultResponse, ProgressResponse, SaveAnswerRequest,
};
use crate::services::answer_payload::AnswerPayload;
use crate::services::{grading, timing};

use super::helpers;
use super::queries::ListAttemptsQuery;

/// Upserts the caller's answer for one question of an open attempt. A
/// second save for the same question replaces the first.
pub(in crate::api::attempts) async fn save_answer(
    axum::extract::Path(attempt_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<SaveAnswerRequest>,
) -> Result<Json<AnswerView>, ApiError> {
    let attempt = require_own_attempt(&state, &user, &attempt_id).await?;
    if attempt.completed {
        return Err(ApiError::Conflict("Attempt is already completed".to_string()));
    }

    let answer_payload =
        AnswerPayload::from_parts(payload.selected_option_ids, payload.answer_data)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question = repositories::questions::find_in_exam(
        state.db(),
        &attempt.exam_id,
        &payload.question_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
    let Some(question) = question else {
        return Err(ApiError::NotFound("Question not found in this exam".to_string()));
    };

    answer_payload
        .check_for_question(question.question_type)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (selected_option_ids, answer_data) = answer_payload.into_columns();
    let answer_id = Uuid::new_v4().to_string();
    let answer = repositories::answers::upsert(
        state.db(),
        repositories::answers::UpsertAnswer {
            id: &answer_id,
            attempt_id: &attempt.id,
            question_id: &question.id,
            selected_option_ids,
            answer_data,
            marked_for_review: payload.marked_for_review,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save answer"))?;

    Ok(Json(AnswerView::from_db(answer)))
}

pub(in crate::api::attempts) async fn get_progress(
    axum::extract::Path(attempt_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let attempt = require_own_attempt(&state, &user, &attempt_id).await?;
    let exam = helpers::fetch_exam(state.db(), &attempt.exam_id).await?;

    let answers = repositories::answers::list_by_attempt(state.db(), &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    // A completed attempt reports the clock frozen at submission.
    let time_remaining_seconds = if attempt.completed {
        i64::from(attempt.time_remaining_seconds.unwrap_or(0))
    } else {
        timing::time_remaining_seconds(
            exam.time_limit_minutes,
            attempt.started_at,
            primitive_now_utc(),
        )
    };

    Ok(Json(ProgressResponse {
        answers: answers.into_iter().map(AnswerView::from_db).collect(),
        time_remaining_seconds,
        completed: attempt.completed,
    }))
}

/// Grades and closes an attempt. The attempt row is locked for the whole
/// transaction, so of two concurrent submits one wins and the other sees
/// the conflict. Every question of the exam is graded, drawn or not;
/// unanswered questions grade against an empty submission.
pub(in crate::api::attempts) async fn submit_attempt(
    axum::extract::Path(attempt_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<AttemptResultResponse>, ApiError> {
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let attempt = repositories::attempts::find_by_id_for_update(&mut *tx, &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?;
    let Some(attempt) = attempt else {
        return Err(ApiError::NotFound("Attempt not found".to_string()));
    };
    if attempt.user_id != user.id {
        return Err(ApiError::Forbidden("Attempt belongs to another user"));
    }
    if attempt.completed {
        return Err(ApiError::Conflict("Attempt is already completed".to_string()));
    }

    let exam = helpers::fetch_exam(&mut *tx, &attempt.exam_id).await?;

    let questions = repositories::questions::list_by_exam(&mut *tx, &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let question_ids: Vec<String> =
        questions.iter().map(|question| question.id.clone()).collect();
    let options = repositories::options::list_by_questions(&mut *tx, &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list question options"))?;
    let areas = repositories::hotspot_areas::list_by_questions(&mut *tx, &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list hotspot areas"))?;
    let answers = repositories::answers::list_by_attempt(&mut *tx, &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;
    let answers_by_question: HashMap<String, Answer> =
        answers.into_iter().map(|answer| (answer.question_id.clone(), answer)).collect();

    let rows = helpers::group_bank(questions, options, areas);
    let total_questions = rows.len();
    let now = primitive_now_utc();

    let mut correct_count = 0usize;
    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let answer = answers_by_question.get(&row.question.id);
        let is_correct = grading::is_answer_correct(
            row.question.question_type,
            row.question.question_data.as_ref().map(|data| &data.0),
            &row.correct_option_ids,
            &row.correct_area_ids,
            answer
                .and_then(|answer| answer.selected_option_ids.as_ref())
                .map(|ids| ids.0.as_slice()),
            answer.and_then(|answer| answer.answer_data.as_ref()).map(|data| &data.0),
        );
        if is_correct {
            correct_count += 1;
        }

        let verdict_id = Uuid::new_v4().to_string();
        repositories::answers::upsert_verdict(
            &mut *tx,
            &verdict_id,
            &attempt.id,
            &row.question.id,
            is_correct,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to record verdict"))?;

        results.push(helpers::result_view(row, answer, is_correct));
    }

    let score = grading::score_attempt(correct_count, total_questions);
    let remaining =
        timing::time_remaining_seconds(exam.time_limit_minutes, attempt.started_at, now);
    let time_remaining = timing::frozen_clock_seconds(remaining);

    repositories::attempts::finalize(&mut *tx, &attempt.id, score, time_remaining, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to finalize attempt"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    let refreshed = repositories::attempts::find_by_id(state.db(), &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;

    tracing::info!(
        attempt_id = %refreshed.id,
        exam_id = %exam.id,
        user_id = %user.id,
        score,
        correct_count,
        total_questions,
        "Attempt submitted"
    );

    Ok(Json(AttemptResultResponse {
        attempt: AttemptResponse::from_db(refreshed),
        score,
        passed: score >= exam.passing_score,
        correct_count,
        total_questions,
        time_remaining_seconds: time_remaining,
        results,
    }))
}

/// Replays a completed attempt's results from the verdicts stored at
/// submission time. Nothing is regraded here, so the report stays stable
/// even if the bank changes afterwards.
pub(in crate::api::attempts) async fn get_attempt_review(
    axum::extract::Path(attempt_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<AttemptResultResponse>, ApiError> {
    let attempt = require_own_attempt(&state, &user, &attempt_id).await?;
    if !attempt.completed {
        return Err(ApiError::BadRequest("Attempt is not completed yet".to_string()));
    }

    let exam = helpers::fetch_exam(state.db(), &attempt.exam_id).await?;

    let questions = repositories::questions::list_by_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let question_ids: Vec<String> =
        questions.iter().map(|question| question.id.clone()).collect();
    let options = repositories::options::list_by_questions(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list question options"))?;
    let areas = repositories::hotspot_areas::list_by_questions(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list hotspot areas"))?;
    let answers = repositories::answers::list_by_attempt(state.db(), &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;
    let answers_by_question: HashMap<String, Answer> =
        answers.into_iter().map(|answer| (answer.question_id.clone(), answer)).collect();

    let rows = helpers::group_bank(questions, options, areas);
    let total_questions = rows.len();

    let mut correct_count = 0usize;
    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let answer = answers_by_question.get(&row.question.id);
        let is_correct =
            answer.and_then(|answer| answer.is_correct).unwrap_or(false);
        if is_correct {
            correct_count += 1;
        }
        results.push(helpers::result_view(row, answer, is_correct));
    }

    let score = attempt.score.unwrap_or(0);
    let passed = score >= exam.passing_score;
    let time_remaining_seconds = attempt.time_remaining_seconds.unwrap_or(0);

    Ok(Json(AttemptResultResponse {
        attempt: AttemptResponse::from_db(attempt),
        score,
        passed,
        correct_count,
        total_questions,
        time_remaining_seconds,
        results,
    }))
}

pub(in crate::api::attempts) async fn list_attempts(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Query(params): Query<ListAttemptsQuery>,
) -> Result<Json<PaginatedResponse<AttemptResponse>>, ApiError> {
    let (skip, limit) = pagination::clamp_page(params.skip, params.limit);
    let exam_id = params.exam_id.as_deref();

    let attempts =
        repositories::attempts::list_by_user(state.db(), &user.id, exam_id, skip, limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;
    let total_count = repositories::attempts::count_by_user(state.db(), &user.id, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count attempts"))?;

    Ok(Json(PaginatedResponse {
        items: attempts.into_iter().map(AttemptResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}
