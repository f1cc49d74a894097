use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{QuestionType, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) question_count: i32,
    pub(crate) created_by: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CaseStudy {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) title: String,
    pub(crate) scenario: String,
    pub(crate) display_order: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) case_study_id: Option<String>,
    pub(crate) question_type: QuestionType,
    pub(crate) body: String,
    pub(crate) explanation: Option<String>,
    pub(crate) display_order: i32,
    pub(crate) question_data: Option<Json<serde_json::Value>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
    pub(crate) display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct HotspotArea {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) label: String,
    pub(crate) x_coord: f64,
    pub(crate) y_coord: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Attempt {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) ended_at: Option<PrimitiveDateTime>,
    pub(crate) score: Option<i32>,
    pub(crate) completed: bool,
    pub(crate) time_remaining_seconds: Option<i32>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One row per question drawn into an attempt. `question_order` fixes the
/// position of the question inside the attempt, `options_order` freezes the
/// shuffled option ids shown to the student (NULL for hotspot questions,
/// which render areas in their canonical order).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AttemptQuestion {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    pub(crate) question_order: i32,
    pub(crate) options_order: Option<Json<Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    pub(crate) selected_option_ids: Option<Json<Vec<String>>>,
    pub(crate) answer_data: Option<Json<serde_json::Value>>,
    pub(crate) marked_for_review: bool,
    pub(crate) is_correct: Option<bool>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
