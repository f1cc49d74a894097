use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{CaseStudy, Exam};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub(crate) code: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(alias = "timeLimitMinutes")]
    #[validate(range(min = 1, message = "time_limit_minutes must be positive"))]
    pub(crate) time_limit_minutes: i32,
    #[serde(default = "default_passing_score")]
    #[serde(alias = "passingScore")]
    #[validate(range(min = 0, max = 1000, message = "passing_score must be between 0 and 1000"))]
    pub(crate) passing_score: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub(crate) code: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "timeLimitMinutes")]
    #[validate(range(min = 1, message = "time_limit_minutes must be positive"))]
    pub(crate) time_limit_minutes: Option<i32>,
    #[serde(default)]
    #[serde(alias = "passingScore")]
    #[validate(range(min = 0, max = 1000, message = "passing_score must be between 0 and 1000"))]
    pub(crate) passing_score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) question_count: i32,
    pub(crate) created_by: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam) -> Self {
        Self {
            id: exam.id,
            code: exam.code,
            title: exam.title,
            description: exam.description,
            time_limit_minutes: exam.time_limit_minutes,
            passing_score: exam.passing_score,
            question_count: exam.question_count,
            created_by: exam.created_by,
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CaseStudyCreate {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "scenario must not be empty"))]
    pub(crate) scenario: String,
    #[serde(default)]
    #[serde(alias = "displayOrder")]
    pub(crate) display_order: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CaseStudyResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) title: String,
    pub(crate) scenario: String,
    pub(crate) display_order: i32,
    pub(crate) created_at: String,
}

impl CaseStudyResponse {
    pub(crate) fn from_db(case_study: CaseStudy) -> Self {
        Self {
            id: case_study.id,
            exam_id: case_study.exam_id,
            title: case_study.title,
            scenario: case_study.scenario,
            display_order: case_study.display_order,
            created_at: format_primitive(case_study.created_at),
        }
    }
}

fn default_passing_score() -> i32 {
    700
}
