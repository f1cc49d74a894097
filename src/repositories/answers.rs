use sqlx::PgPool;

use crate::db::models::Answer;

const COLUMNS: &str = "\
    id, attempt_id, question_id, selected_option_ids, answer_data, \
    marked_for_review, is_correct, created_at, updated_at";

pub(crate) struct UpsertAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) attempt_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) selected_option_ids: Option<Vec<String>>,
    pub(crate) answer_data: Option<serde_json::Value>,
    pub(crate) marked_for_review: bool,
    pub(crate) now: time::PrimitiveDateTime,
}

/// One row per (attempt, question); a re-save replaces the payload and keeps
/// the original `created_at`.
pub(crate) async fn upsert(pool: &PgPool, params: UpsertAnswer<'_>) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (id, attempt_id, question_id, selected_option_ids, answer_data,
                              marked_for_review, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
         ON CONFLICT (attempt_id, question_id) DO UPDATE SET
             selected_option_ids = EXCLUDED.selected_option_ids,
             answer_data = EXCLUDED.answer_data,
             marked_for_review = EXCLUDED.marked_for_review,
             updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.selected_option_ids.map(sqlx::types::Json))
    .bind(params.answer_data.map(sqlx::types::Json))
    .bind(params.marked_for_review)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_by_attempt(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE attempt_id = $1 ORDER BY created_at"
    ))
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}

/// Records the grading verdict, creating the row when the question was never
/// answered.
pub(crate) async fn upsert_verdict(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    attempt_id: &str,
    question_id: &str,
    is_correct: bool,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO answers (id, attempt_id, question_id, marked_for_review, is_correct,
                              created_at, updated_at)
         VALUES ($1,$2,$3,FALSE,$4,$5,$5)
         ON CONFLICT (attempt_id, question_id) DO UPDATE SET
             is_correct = EXCLUDED.is_correct,
             updated_at = EXCLUDED.updated_at",
    )
    .bind(id)
    .bind(attempt_id)
    .bind(question_id)
    .bind(is_correct)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}
