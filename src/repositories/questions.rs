use sqlx::PgPool;

use crate::db::models::Question;
use crate::db::types::QuestionType;

pub(crate) const COLUMNS: &str = "\
    id, exam_id, case_study_id, question_type, body, explanation, display_order, \
    question_data, created_at, updated_at";

/// Minimal projection used when drawing an attempt manifest.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DrawRow {
    pub(crate) id: String,
    pub(crate) question_type: QuestionType,
}

pub(crate) async fn list_draw_rows(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<Vec<DrawRow>, sqlx::Error> {
    sqlx::query_as::<_, DrawRow>(
        "SELECT id, question_type FROM questions WHERE exam_id = $1 ORDER BY display_order, created_at",
    )
    .bind(exam_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_in_exam(
    pool: &PgPool,
    exam_id: &str,
    id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE id = $1 AND exam_id = $2"
    ))
    .bind(id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_exam(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE exam_id = $1 ORDER BY display_order, created_at"
    ))
    .bind(exam_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_ids(
    executor: impl sqlx::PgExecutor<'_>,
    ids: &[String],
) -> Result<Vec<Question>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(executor)
        .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) case_study_id: Option<&'a str>,
    pub(crate) question_type: QuestionType,
    pub(crate) body: &'a str,
    pub(crate) explanation: Option<&'a str>,
    pub(crate) display_order: i32,
    pub(crate) question_data: Option<serde_json::Value>,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (id, exam_id, case_study_id, question_type, body, explanation,
                                display_order, question_data, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.case_study_id)
    .bind(params.question_type)
    .bind(params.body)
    .bind(params.explanation)
    .bind(params.display_order)
    .bind(params.question_data.map(sqlx::types::Json))
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(executor).await?;
    Ok(())
}
