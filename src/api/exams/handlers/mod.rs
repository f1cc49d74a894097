mod manage;
mod questions;
mod taking;

pub(super) use manage::{
    create_case_study, create_exam, delete_exam, get_exam, list_case_studies, list_exams,
    update_exam,
};
pub(super) use questions::{create_question, import_questions, list_question_catalog};
pub(super) use taking::{attempt_questions, start_attempt};
