use std::collections::HashMap;

use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::db::models::{AttemptQuestion, CaseStudy, Exam, HotspotArea, Question, QuestionOption};
use crate::db::types::QuestionType;
use crate::repositories;
use crate::schemas::question::QuestionTakingView;

pub(super) async fn fetch_exam(pool: &PgPool, exam_id: &str) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(pool, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

/// Turns stored manifest rows back into the exam-taking payload. Options are
/// replayed in the order frozen at draw time; hotspot areas keep their
/// canonical order. A manifest row whose question has since been deleted is
/// skipped rather than failing the whole attempt.
pub(super) async fn hydrate_manifest(
    pool: &PgPool,
    manifest: &[AttemptQuestion],
) -> Result<Vec<QuestionTakingView>, ApiError> {
    let question_ids: Vec<String> =
        manifest.iter().map(|row| row.question_id.clone()).collect();

    let mut questions: HashMap<String, Question> =
        repositories::questions::list_by_ids(pool, &question_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch attempt questions"))?
            .into_iter()
            .map(|question| (question.id.clone(), question))
            .collect();

    let mut options_by_id: HashMap<String, QuestionOption> =
        repositories::options::list_by_questions(pool, &question_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch question options"))?
            .into_iter()
            .map(|option| (option.id.clone(), option))
            .collect();

    let mut areas_by_question: HashMap<String, Vec<HotspotArea>> = HashMap::new();
    for area in repositories::hotspot_areas::list_by_questions(pool, &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch hotspot areas"))?
    {
        areas_by_question.entry(area.question_id.clone()).or_default().push(area);
    }

    let mut case_study_ids: Vec<String> =
        questions.values().filter_map(|question| question.case_study_id.clone()).collect();
    case_study_ids.sort_unstable();
    case_study_ids.dedup();
    let case_studies: HashMap<String, CaseStudy> =
        repositories::case_studies::list_by_ids(pool, &case_study_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch case studies"))?
            .into_iter()
            .map(|case_study| (case_study.id.clone(), case_study))
            .collect();

    let mut views = Vec::with_capacity(manifest.len());
    for row in manifest {
        let Some(question) = questions.remove(&row.question_id) else {
            continue;
        };

        let ordered_options: Vec<QuestionOption> = match &row.options_order {
            Some(order) => order.0.iter().filter_map(|id| options_by_id.remove(id)).collect(),
            None => Vec::new(),
        };
        let areas = if question.question_type == QuestionType::Hotspot {
            areas_by_question.remove(&question.id).unwrap_or_default()
        } else {
            Vec::new()
        };
        let case_study = question
            .case_study_id
            .as_deref()
            .and_then(|id| case_studies.get(id).cloned());

        views.push(QuestionTakingView::assemble(
            question,
            row.question_order,
            ordered_options,
            areas,
            case_study,
        ));
    }

    Ok(views)
}
