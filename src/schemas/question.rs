use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{CaseStudy, HotspotArea, Question, QuestionOption};
use crate::db::types::QuestionType;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct OptionCreate {
    #[validate(length(min = 1, message = "option text must not be empty"))]
    pub(crate) text: String,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
    #[serde(default)]
    #[serde(alias = "displayOrder")]
    pub(crate) display_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct HotspotAreaCreate {
    #[validate(length(min = 1, message = "area label must not be empty"))]
    pub(crate) label: String,
    #[serde(alias = "xCoord")]
    pub(crate) x_coord: f64,
    #[serde(alias = "yCoord")]
    pub(crate) y_coord: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[serde(default)]
    #[serde(alias = "caseStudyId")]
    pub(crate) case_study_id: Option<String>,
    #[serde(alias = "questionType")]
    pub(crate) question_type: QuestionType,
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) explanation: Option<String>,
    #[serde(default)]
    #[serde(alias = "displayOrder")]
    pub(crate) display_order: i32,
    #[serde(default)]
    #[serde(alias = "questionData")]
    pub(crate) question_data: Option<serde_json::Value>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) options: Vec<OptionCreate>,
    #[serde(default)]
    #[serde(alias = "hotspotAreas")]
    #[validate(nested)]
    pub(crate) hotspot_areas: Vec<HotspotAreaCreate>,
}

/// Already-parsed question records produced by the external import
/// tooling. Parsing spreadsheets is not this service's job; it accepts
/// the same JSON shape the single-create endpoint does, in bulk.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionImport {
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OptionDetailResponse {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
    pub(crate) display_order: i32,
}

impl OptionDetailResponse {
    pub(crate) fn from_db(option: QuestionOption) -> Self {
        Self {
            id: option.id,
            text: option.text,
            is_correct: option.is_correct,
            display_order: option.display_order,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HotspotAreaDetailResponse {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) x_coord: f64,
    pub(crate) y_coord: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) is_correct: bool,
}

impl HotspotAreaDetailResponse {
    pub(crate) fn from_db(area: HotspotArea) -> Self {
        Self {
            id: area.id,
            label: area.label,
            x_coord: area.x_coord,
            y_coord: area.y_coord,
            width: area.width,
            height: area.height,
            is_correct: area.is_correct,
        }
    }
}

/// Admin catalog view. Correctness flags and the canonical `answer`
/// half of `question_data` stay visible here.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionDetailResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) case_study_id: Option<String>,
    pub(crate) question_type: QuestionType,
    pub(crate) body: String,
    pub(crate) explanation: Option<String>,
    pub(crate) display_order: i32,
    pub(crate) question_data: Option<serde_json::Value>,
    pub(crate) options: Vec<OptionDetailResponse>,
    pub(crate) hotspot_areas: Vec<HotspotAreaDetailResponse>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionDetailResponse {
    pub(crate) fn from_db(
        question: Question,
        options: Vec<QuestionOption>,
        areas: Vec<HotspotArea>,
    ) -> Self {
        Self {
            id: question.id,
            exam_id: question.exam_id,
            case_study_id: question.case_study_id,
            question_type: question.question_type,
            body: question.body,
            explanation: question.explanation,
            display_order: question.display_order,
            question_data: question.question_data.map(|data| data.0),
            options: options.into_iter().map(OptionDetailResponse::from_db).collect(),
            hotspot_areas: areas.into_iter().map(HotspotAreaDetailResponse::from_db).collect(),
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OptionPublicResponse {
    pub(crate) id: String,
    pub(crate) text: String,
}

impl OptionPublicResponse {
    pub(crate) fn from_db(option: QuestionOption) -> Self {
        Self { id: option.id, text: option.text }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HotspotAreaPublicResponse {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) x_coord: f64,
    pub(crate) y_coord: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl HotspotAreaPublicResponse {
    pub(crate) fn from_db(area: HotspotArea) -> Self {
        Self {
            id: area.id,
            label: area.label,
            x_coord: area.x_coord,
            y_coord: area.y_coord,
            width: area.width,
            height: area.height,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CaseStudyBrief {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) scenario: String,
}

impl CaseStudyBrief {
    pub(crate) fn from_db(case_study: CaseStudy) -> Self {
        Self { id: case_study.id, title: case_study.title, scenario: case_study.scenario }
    }
}

/// Exam-taking view of one manifest question. Nothing here may reveal
/// correctness: no option/area flags, no explanation, and `question_data`
/// passes through [`public_question_data`] first.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionTakingView {
    pub(crate) id: String,
    pub(crate) question_order: i32,
    pub(crate) question_type: QuestionType,
    pub(crate) body: String,
    pub(crate) question_data: Option<serde_json::Value>,
    pub(crate) options: Vec<OptionPublicResponse>,
    pub(crate) hotspot_areas: Vec<HotspotAreaPublicResponse>,
    pub(crate) case_study: Option<CaseStudyBrief>,
}

impl QuestionTakingView {
    /// `options` and `areas` must already be in the order the attempt
    /// manifest assigned; this constructor does not reorder them.
    pub(crate) fn assemble(
        question: Question,
        question_order: i32,
        options: Vec<QuestionOption>,
        areas: Vec<HotspotArea>,
        case_study: Option<CaseStudy>,
    ) -> Self {
        Self {
            id: question.id,
            question_order,
            question_type: question.question_type,
            body: question.body,
            question_data: public_question_data(question.question_data.map(|data| data.0)),
            options: options.into_iter().map(OptionPublicResponse::from_db).collect(),
            hotspot_areas: areas.into_iter().map(HotspotAreaPublicResponse::from_db).collect(),
            case_study: case_study.map(CaseStudyBrief::from_db),
        }
    }
}

/// Strips the canonical `answer` key out of a structured payload so the
/// exam-taking view only carries the prompt half (item lists, blank
/// positions, the hotspot image, and so on).
pub(crate) fn public_question_data(data: Option<serde_json::Value>) -> Option<serde_json::Value> {
    let mut value = data?;
    if let Some(object) = value.as_object_mut() {
        object.remove("answer");
    }
    Some(value)
}
