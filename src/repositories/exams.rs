use sqlx::PgPool;
use sqlx::{Postgres, QueryBuilder};

use crate::db::models::Exam;

pub(crate) const COLUMNS: &str = "\
    id, code, title, description, time_limit_minutes, passing_score, \
    question_count, created_by, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn exists_by_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM exams WHERE code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    search: Option<&str>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Exam>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM exams WHERE TRUE"));

    if let Some(search) = search {
        builder.push(" AND (code ILIKE ");
        builder.push_bind(format!("%{search}%"));
        builder.push(" OR title ILIKE ");
        builder.push_bind(format!("%{search}%"));
        builder.push(")");
    }

    builder.push(" ORDER BY code OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Exam>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exams WHERE TRUE");

    if let Some(search) = search {
        builder.push(" AND (code ILIKE ");
        builder.push_bind(format!("%{search}%"));
        builder.push(" OR title ILIKE ");
        builder.push_bind(format!("%{search}%"));
        builder.push(")");
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) code: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) time_limit_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (id, code, title, description, time_limit_minutes, passing_score,
                            question_count, created_by, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,0,$7,$8,$9)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.code)
    .bind(params.title)
    .bind(params.description)
    .bind(params.time_limit_minutes)
    .bind(params.passing_score)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExam {
    pub(crate) code: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) passing_score: Option<i32>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateExam) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE exams SET
            code = COALESCE($1, code),
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            time_limit_minutes = COALESCE($4, time_limit_minutes),
            passing_score = COALESCE($5, passing_score),
            updated_at = $6
         WHERE id = $7",
    )
    .bind(params.code)
    .bind(params.title)
    .bind(params.description)
    .bind(params.time_limit_minutes)
    .bind(params.passing_score)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}

/// Recomputes the denormalized `question_count` after the bank changes.
pub(crate) async fn refresh_question_count(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE exams
         SET question_count = (SELECT COUNT(*) FROM questions WHERE exam_id = $1),
             updated_at = $2
         WHERE id = $1",
    )
    .bind(exam_id)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}
