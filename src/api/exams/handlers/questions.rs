use std::collections::{HashMap, HashSet};

use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{HotspotArea, Question, QuestionOption};
use crate::repositories;
use crate::schemas::question::{QuestionCreate, QuestionDetailResponse, QuestionImport};

use super::super::helpers;

pub(in crate::api::exams) async fn create_question(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(axum::http::StatusCode, Json<QuestionDetailResponse>), ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validation::validate_question_payload(&payload)?;

    if let Some(case_study_id) = payload.case_study_id.as_deref() {
        let case_study =
            repositories::case_studies::find_in_exam(state.db(), &exam.id, case_study_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch case study"))?;
        if case_study.is_none() {
            return Err(ApiError::BadRequest(
                "Case study not found in this exam".to_string(),
            ));
        }
    }

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let now = primitive_now_utc();
    let (question, options, areas) = insert_question(&mut tx, &exam.id, payload, now).await?;

    repositories::exams::refresh_question_count(&mut *tx, &exam.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to refresh question count"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(QuestionDetailResponse::from_db(question, options, areas)),
    ))
}

pub(in crate::api::exams) async fn list_question_catalog(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<Json<Vec<QuestionDetailResponse>>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    let questions = repositories::questions::list_by_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let question_ids: Vec<String> =
        questions.iter().map(|question| question.id.clone()).collect();

    let mut options_by_question: HashMap<String, Vec<QuestionOption>> = HashMap::new();
    for option in repositories::options::list_by_questions(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list question options"))?
    {
        options_by_question.entry(option.question_id.clone()).or_default().push(option);
    }

    let mut areas_by_question: HashMap<String, Vec<HotspotArea>> = HashMap::new();
    for area in repositories::hotspot_areas::list_by_questions(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list hotspot areas"))?
    {
        areas_by_question.entry(area.question_id.clone()).or_default().push(area);
    }

    let catalog = questions
        .into_iter()
        .map(|question| {
            let options = options_by_question.remove(&question.id).unwrap_or_default();
            let areas = areas_by_question.remove(&question.id).unwrap_or_default();
            QuestionDetailResponse::from_db(question, options, areas)
        })
        .collect();

    Ok(Json(catalog))
}

/// Bulk load of already-parsed question records. Everything is validated
/// before the transaction opens; one bad record rejects the whole batch.
pub(in crate::api::exams) async fn import_questions(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuestionImport>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if payload.questions.is_empty() {
        return Err(ApiError::BadRequest("Import contains no questions".to_string()));
    }

    let known_case_studies: HashSet<String> =
        repositories::case_studies::list_by_exam(state.db(), &exam.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list case studies"))?
            .into_iter()
            .map(|case_study| case_study.id)
            .collect();

    for (index, question) in payload.questions.iter().enumerate() {
        validation::validate_question_payload(question).map_err(|err| match err {
            ApiError::BadRequest(message) => {
                ApiError::BadRequest(format!("questions[{index}]: {message}"))
            }
            other => other,
        })?;

        if let Some(case_study_id) = question.case_study_id.as_deref() {
            if !known_case_studies.contains(case_study_id) {
                return Err(ApiError::BadRequest(format!(
                    "questions[{index}]: case study not found in this exam"
                )));
            }
        }
    }

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let now = primitive_now_utc();
    let mut imported = 0usize;
    for question in payload.questions {
        insert_question(&mut tx, &exam.id, question, now).await?;
        imported += 1;
    }

    repositories::exams::refresh_question_count(&mut *tx, &exam.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to refresh question count"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(exam_id = %exam.id, imported, "Question import finished");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({ "imported": imported })),
    ))
}

async fn insert_question(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    exam_id: &str,
    payload: QuestionCreate,
    now: time::PrimitiveDateTime,
) -> Result<(Question, Vec<QuestionOption>, Vec<HotspotArea>), ApiError> {
    let question_id = Uuid::new_v4().to_string();
    let question = repositories::questions::create(
        &mut **tx,
        repositories::questions::CreateQuestion {
            id: &question_id,
            exam_id,
            case_study_id: payload.case_study_id.as_deref(),
            question_type: payload.question_type,
            body: &payload.body,
            explanation: payload.explanation.as_deref(),
            display_order: payload.display_order,
            question_data: payload.question_data,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    let mut options = Vec::with_capacity(payload.options.len());
    for option in payload.options {
        let option_id = Uuid::new_v4().to_string();
        let created = repositories::options::create(
            &mut **tx,
            repositories::options::CreateOption {
                id: &option_id,
                question_id: &question.id,
                text: &option.text,
                is_correct: option.is_correct,
                display_order: option.display_order,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question option"))?;
        options.push(created);
    }

    let mut areas = Vec::with_capacity(payload.hotspot_areas.len());
    for area in payload.hotspot_areas {
        let area_id = Uuid::new_v4().to_string();
        let created = repositories::hotspot_areas::create(
            &mut **tx,
            repositories::hotspot_areas::CreateHotspotArea {
                id: &area_id,
                question_id: &question.id,
                label: &area.label,
                x_coord: area.x_coord,
                y_coord: area.y_coord,
                width: area.width,
                height: area.height,
                is_correct: area.is_correct,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create hotspot area"))?;
        areas.push(created);
    }

    Ok((question, options, areas))
}
