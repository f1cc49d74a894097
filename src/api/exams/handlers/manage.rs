use axum::{extract::Query, Json};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{self, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::exam::{
    CaseStudyCreate, CaseStudyResponse, ExamCreate, ExamResponse, ExamUpdate,
};

use super::super::helpers;
use super::super::queries::{DeleteExamQuery, ListExamsQuery};

pub(in crate::api::exams) async fn create_exam(
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(axum::http::StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::exams::exists_by_code(state.db(), &payload.code)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check exam code"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Exam with this code already exists".to_string()));
    }

    let now = primitive_now_utc();
    let exam_id = Uuid::new_v4().to_string();
    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &exam_id,
            code: &payload.code,
            title: &payload.title,
            description: payload.description.as_deref(),
            time_limit_minutes: payload.time_limit_minutes,
            passing_score: payload.passing_score,
            created_by: &admin.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    tracing::info!(exam_id = %exam.id, code = %exam.code, "Exam created");

    Ok((axum::http::StatusCode::CREATED, Json(ExamResponse::from_db(exam))))
}

pub(in crate::api::exams) async fn list_exams(
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
    Query(params): Query<ListExamsQuery>,
) -> Result<Json<PaginatedResponse<ExamResponse>>, ApiError> {
    let (skip, limit) = pagination::clamp_page(params.skip, params.limit);
    let search = params.search.as_deref();

    let exams = repositories::exams::list(state.db(), search, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let total_count = repositories::exams::count(state.db(), search)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count exams"))?;

    let items = exams.into_iter().map(ExamResponse::from_db).collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

pub(in crate::api::exams) async fn get_exam(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;
    Ok(Json(ExamResponse::from_db(exam)))
}

pub(in crate::api::exams) async fn update_exam(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(code) = payload.code.as_deref() {
        if code != exam.code {
            let taken = repositories::exams::exists_by_code(state.db(), code)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to check exam code"))?;
            if taken.is_some() {
                return Err(ApiError::Conflict(
                    "Exam with this code already exists".to_string(),
                ));
            }
        }
    }

    let now = primitive_now_utc();
    repositories::exams::update(
        state.db(),
        &exam_id,
        repositories::exams::UpdateExam {
            code: payload.code,
            title: payload.title,
            description: payload.description,
            time_limit_minutes: payload.time_limit_minutes,
            passing_score: payload.passing_score,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?;

    let updated = repositories::exams::fetch_one_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch updated exam"))?;

    Ok(Json(ExamResponse::from_db(updated)))
}

pub(in crate::api::exams) async fn delete_exam(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    Query(params): Query<DeleteExamQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<axum::http::StatusCode, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    let attempt_count = repositories::attempts::count_by_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count attempts"))?;

    if attempt_count > 0 && !params.force {
        return Err(ApiError::BadRequest(format!(
            "Cannot delete exam with {attempt_count} recorded attempt(s). Use force=true to delete anyway."
        )));
    }

    repositories::exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    tracing::info!(exam_id = %exam.id, code = %exam.code, "Exam deleted");

    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub(in crate::api::exams) async fn create_case_study(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<CaseStudyCreate>,
) -> Result<(axum::http::StatusCode, Json<CaseStudyResponse>), ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let case_study_id = Uuid::new_v4().to_string();
    let case_study = repositories::case_studies::create(
        state.db(),
        repositories::case_studies::CreateCaseStudy {
            id: &case_study_id,
            exam_id: &exam.id,
            title: &payload.title,
            scenario: &payload.scenario,
            display_order: payload.display_order,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create case study"))?;

    Ok((axum::http::StatusCode::CREATED, Json(CaseStudyResponse::from_db(case_study))))
}

pub(in crate::api::exams) async fn list_case_studies(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<Vec<CaseStudyResponse>>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    let case_studies = repositories::case_studies::list_by_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list case studies"))?;

    Ok(Json(case_studies.into_iter().map(CaseStudyResponse::from_db).collect()))
}
