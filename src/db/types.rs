use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questiontype", rename_all = "snake_case")]
pub(crate) enum QuestionType {
    SingleChoice,
    MultipleChoice,
    YesNo,
    CaseStudy,
    DragDropOrdering,
    BuildList,
    Matching,
    FillInBlank,
    Hotspot,
    SequenceOrdering,
    Simulation,
}

impl QuestionType {
    /// Types whose correct answer lives on `question_options` rows and is
    /// submitted as a set of option ids.
    pub(crate) fn is_option_backed(self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice
                | QuestionType::MultipleChoice
                | QuestionType::YesNo
                | QuestionType::CaseStudy
        )
    }

    /// Types graded against the canonical answer embedded in `question_data`.
    pub(crate) fn is_structured(self) -> bool {
        matches!(
            self,
            QuestionType::DragDropOrdering
                | QuestionType::BuildList
                | QuestionType::Matching
                | QuestionType::FillInBlank
                | QuestionType::SequenceOrdering
                | QuestionType::Simulation
        )
    }
}
