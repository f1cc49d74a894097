use std::collections::HashMap;

use crate::api::errors::ApiError;
use crate::db::models::{Answer, Exam, HotspotArea, Question, QuestionOption};
use crate::repositories;
use crate::schemas::attempt::QuestionResultView;
use crate::schemas::question::{HotspotAreaDetailResponse, OptionDetailResponse};

/// Takes an executor so submit can read the exam through its own
/// transaction; the other handlers pass the pool.
pub(super) async fn fetch_exam(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(executor, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

/// One question of the exam bank with everything grading needs attached.
pub(super) struct GradingRow {
    pub(super) question: Question,
    pub(super) options: Vec<QuestionOption>,
    pub(super) areas: Vec<HotspotArea>,
    pub(super) correct_option_ids: Vec<String>,
    pub(super) correct_area_ids: Vec<String>,
}

/// Groups flat option and area listings under their questions and splits
/// out the correct id sets. Grading always runs over the exam's full bank,
/// not just the attempt's manifest.
pub(super) fn group_bank(
    questions: Vec<Question>,
    options: Vec<QuestionOption>,
    areas: Vec<HotspotArea>,
) -> Vec<GradingRow> {
    let mut options_by_question: HashMap<String, Vec<QuestionOption>> = HashMap::new();
    for option in options {
        options_by_question.entry(option.question_id.clone()).or_default().push(option);
    }
    let mut areas_by_question: HashMap<String, Vec<HotspotArea>> = HashMap::new();
    for area in areas {
        areas_by_question.entry(area.question_id.clone()).or_default().push(area);
    }

    questions
        .into_iter()
        .map(|question| {
            let options = options_by_question.remove(&question.id).unwrap_or_default();
            let areas = areas_by_question.remove(&question.id).unwrap_or_default();
            let correct_option_ids = options
                .iter()
                .filter(|option| option.is_correct)
                .map(|option| option.id.clone())
                .collect();
            let correct_area_ids =
                areas.iter().filter(|area| area.is_correct).map(|area| area.id.clone()).collect();
            GradingRow { question, options, areas, correct_option_ids, correct_area_ids }
        })
        .collect()
}

pub(super) fn result_view(
    row: GradingRow,
    answer: Option<&Answer>,
    is_correct: bool,
) -> QuestionResultView {
    let submitted_option_ids = answer
        .and_then(|answer| answer.selected_option_ids.as_ref())
        .map(|ids| ids.0.clone())
        .unwrap_or_default();
    let submitted_answer_data =
        answer.and_then(|answer| answer.answer_data.as_ref()).map(|data| data.0.clone());

    QuestionResultView {
        question_id: row.question.id,
        question_type: row.question.question_type,
        body: row.question.body,
        explanation: row.question.explanation,
        is_correct,
        submitted_option_ids,
        correct_option_ids: row.correct_option_ids,
        submitted_answer_data,
        options: row.options.into_iter().map(OptionDetailResponse::from_db).collect(),
        hotspot_areas: row.areas.into_iter().map(HotspotAreaDetailResponse::from_db).collect(),
    }
}
