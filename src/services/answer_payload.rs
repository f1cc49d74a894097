use anyhow::{anyhow, Result};

use crate::db::types::QuestionType;

/// A student's submission for one question, exactly one of the two wire
/// fields. Option-backed types answer with option ids; everything else
/// carries a type-specific JSON document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AnswerPayload {
    Options(Vec<String>),
    Structured(serde_json::Value),
}

impl AnswerPayload {
    pub(crate) fn from_parts(
        selected_option_ids: Option<Vec<String>>,
        answer_data: Option<serde_json::Value>,
    ) -> Result<Self> {
        match (selected_option_ids, answer_data) {
            (Some(_), Some(_)) => {
                Err(anyhow!("provide either selected_option_ids or answer_data, not both"))
            }
            (Some(ids), None) => Ok(Self::Options(ids)),
            (None, Some(serde_json::Value::Null)) => {
                Err(anyhow!("answer_data must not be null"))
            }
            (None, Some(data)) => Ok(Self::Structured(data)),
            (None, None) => {
                Err(anyhow!("answer must include selected_option_ids or answer_data"))
            }
        }
    }

    /// Checks that the payload kind fits the question type being answered.
    pub(crate) fn check_for_question(&self, question_type: QuestionType) -> Result<()> {
        match self {
            Self::Options(_) if question_type.is_option_backed() => Ok(()),
            Self::Options(_) => Err(anyhow!(
                "question type {} expects answer_data, not selected_option_ids",
                type_label(question_type)
            )),
            Self::Structured(_) if !question_type.is_option_backed() => Ok(()),
            Self::Structured(_) => Err(anyhow!(
                "question type {} expects selected_option_ids, not answer_data",
                type_label(question_type)
            )),
        }
    }

    /// Splits back into the two nullable storage columns.
    pub(crate) fn into_columns(self) -> (Option<Vec<String>>, Option<serde_json::Value>) {
        match self {
            Self::Options(ids) => (Some(ids), None),
            Self::Structured(data) => (None, Some(data)),
        }
    }
}

fn type_label(question_type: QuestionType) -> String {
    serde_json::to_value(question_type)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{question_type:?}"))
}
