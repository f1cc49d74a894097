use sqlx::PgPool;

use crate::db::models::CaseStudy;

const COLUMNS: &str = "id, exam_id, title, scenario, display_order, created_at, updated_at";

pub(crate) async fn find_in_exam(
    pool: &PgPool,
    exam_id: &str,
    id: &str,
) -> Result<Option<CaseStudy>, sqlx::Error> {
    sqlx::query_as::<_, CaseStudy>(&format!(
        "SELECT {COLUMNS} FROM case_studies WHERE id = $1 AND exam_id = $2"
    ))
    .bind(id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<CaseStudy>, sqlx::Error> {
    sqlx::query_as::<_, CaseStudy>(&format!(
        "SELECT {COLUMNS} FROM case_studies WHERE exam_id = $1 ORDER BY display_order, created_at"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_ids(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<CaseStudy>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, CaseStudy>(&format!(
        "SELECT {COLUMNS} FROM case_studies WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateCaseStudy<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) scenario: &'a str,
    pub(crate) display_order: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCaseStudy<'_>,
) -> Result<CaseStudy, sqlx::Error> {
    sqlx::query_as::<_, CaseStudy>(&format!(
        "INSERT INTO case_studies (id, exam_id, title, scenario, display_order, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.title)
    .bind(params.scenario)
    .bind(params.display_order)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}
