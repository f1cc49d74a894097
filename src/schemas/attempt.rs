use serde::{Deserialize, Serialize};

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{Answer, Attempt};
use crate::db::types::QuestionType;
use crate::schemas::question::{
    HotspotAreaDetailResponse, OptionDetailResponse, QuestionTakingView,
};

#[derive(Debug, Serialize)]
pub(crate) struct AttemptStartInfo {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) time_limit_minutes: i32,
    pub(crate) total_questions: usize,
    pub(crate) started_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartAttemptResponse {
    pub(crate) attempt: AttemptStartInfo,
    pub(crate) questions: Vec<QuestionTakingView>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveAnswerRequest {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[serde(default)]
    #[serde(alias = "selectedOptionIds")]
    pub(crate) selected_option_ids: Option<Vec<String>>,
    #[serde(default)]
    #[serde(alias = "answerData")]
    pub(crate) answer_data: Option<serde_json::Value>,
    #[serde(default)]
    #[serde(alias = "markedForReview")]
    pub(crate) marked_for_review: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerView {
    pub(crate) question_id: String,
    pub(crate) selected_option_ids: Option<Vec<String>>,
    pub(crate) answer_data: Option<serde_json::Value>,
    pub(crate) marked_for_review: bool,
    pub(crate) is_correct: Option<bool>,
    pub(crate) updated_at: String,
}

impl AnswerView {
    pub(crate) fn from_db(answer: Answer) -> Self {
        Self {
            question_id: answer.question_id,
            selected_option_ids: answer.selected_option_ids.map(|ids| ids.0),
            answer_data: answer.answer_data.map(|data| data.0),
            marked_for_review: answer.marked_for_review,
            is_correct: answer.is_correct,
            updated_at: format_primitive(answer.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) answers: Vec<AnswerView>,
    pub(crate) time_remaining_seconds: i64,
    pub(crate) completed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) started_at: String,
    pub(crate) ended_at: Option<String>,
    pub(crate) score: Option<i32>,
    pub(crate) completed: bool,
    pub(crate) time_remaining_seconds: Option<i32>,
}

impl AttemptResponse {
    pub(crate) fn from_db(attempt: Attempt) -> Self {
        Self {
            id: attempt.id,
            exam_id: attempt.exam_id,
            started_at: format_primitive(attempt.started_at),
            ended_at: attempt.ended_at.map(format_primitive),
            score: attempt.score,
            completed: attempt.completed,
            time_remaining_seconds: attempt.time_remaining_seconds,
        }
    }
}

/// Per-question grading detail. Only produced once the attempt is
/// closed, so correctness flags and the full option list are visible.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionResultView {
    pub(crate) question_id: String,
    pub(crate) question_type: QuestionType,
    pub(crate) body: String,
    pub(crate) explanation: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) submitted_option_ids: Vec<String>,
    pub(crate) correct_option_ids: Vec<String>,
    pub(crate) submitted_answer_data: Option<serde_json::Value>,
    pub(crate) options: Vec<OptionDetailResponse>,
    pub(crate) hotspot_areas: Vec<HotspotAreaDetailResponse>,
}

/// Returned by submission and replayed verbatim by the review endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct AttemptResultResponse {
    pub(crate) attempt: AttemptResponse,
    pub(crate) score: i32,
    pub(crate) passed: bool,
    pub(crate) correct_count: usize,
    pub(crate) total_questions: usize,
    pub(crate) time_remaining_seconds: i32,
    pub(crate) results: Vec<QuestionResultView>,
}
