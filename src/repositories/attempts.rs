use sqlx::PgPool;
use sqlx::{Postgres, QueryBuilder};

use crate::db::models::Attempt;

pub(crate) const COLUMNS: &str = "\
    id, user_id, exam_id, started_at, ended_at, score, completed, \
    time_remaining_seconds, created_at, updated_at";

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) started_at: time::PrimitiveDateTime,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<Attempt, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (id, user_id, exam_id, started_at, completed, created_at, updated_at)
         VALUES ($1,$2,$3,$4,FALSE,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.exam_id)
    .bind(params.started_at)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Row-locked read used by submission so two concurrent submits serialize on
/// the attempt row and the loser observes `completed = true`.
pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn finalize(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    score: i32,
    time_remaining_seconds: i32,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE attempts
         SET score = $1, completed = TRUE, ended_at = $2,
             time_remaining_seconds = $3, updated_at = $2
         WHERE id = $4",
    )
    .bind(score)
    .bind(now)
    .bind(time_remaining_seconds)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
    exam_id: Option<&str>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Attempt>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM attempts WHERE user_id = "));
    builder.push_bind(user_id);

    if let Some(exam_id) = exam_id {
        builder.push(" AND exam_id = ");
        builder.push_bind(exam_id);
    }

    builder.push(" ORDER BY started_at DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Attempt>().fetch_all(pool).await
}

pub(crate) async fn count_by_exam(pool: &PgPool, exam_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM attempts WHERE exam_id = $1")
        .bind(exam_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn count_by_user(
    pool: &PgPool,
    user_id: &str,
    exam_id: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM attempts WHERE user_id = ");
    builder.push_bind(user_id);

    if let Some(exam_id) = exam_id {
        builder.push(" AND exam_id = ");
        builder.push_bind(exam_id);
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}
