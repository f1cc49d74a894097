use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct ListAttemptsQuery {
    #[serde(default)]
    pub(super) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(super) limit: i64,
    #[serde(default)]
    #[serde(alias = "examId")]
    pub(super) exam_id: Option<String>,
}
