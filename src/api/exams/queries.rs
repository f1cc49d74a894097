use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct ListExamsQuery {
    #[serde(default)]
    pub(super) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(super) limit: i64,
    #[serde(default)]
    pub(super) search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteExamQuery {
    #[serde(default)]
    pub(super) force: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct AttemptQuestionsQuery {
    #[serde(alias = "attemptId")]
    pub(super) attempt_id: String,
}
