use crate::db::models::HotspotArea;

const COLUMNS: &str = "id, question_id, label, x_coord, y_coord, width, height, is_correct";

pub(crate) async fn list_by_question(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
) -> Result<Vec<HotspotArea>, sqlx::Error> {
    sqlx::query_as::<_, HotspotArea>(&format!(
        "SELECT {COLUMNS} FROM hotspot_areas WHERE question_id = $1 ORDER BY id"
    ))
    .bind(question_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_questions(
    executor: impl sqlx::PgExecutor<'_>,
    question_ids: &[String],
) -> Result<Vec<HotspotArea>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, HotspotArea>(&format!(
        "SELECT {COLUMNS} FROM hotspot_areas WHERE question_id = ANY($1) ORDER BY question_id, id"
    ))
    .bind(question_ids)
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateHotspotArea<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) label: &'a str,
    pub(crate) x_coord: f64,
    pub(crate) y_coord: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) is_correct: bool,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateHotspotArea<'_>,
) -> Result<HotspotArea, sqlx::Error> {
    sqlx::query_as::<_, HotspotArea>(&format!(
        "INSERT INTO hotspot_areas (id, question_id, label, x_coord, y_coord, width, height, is_correct)
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.label)
    .bind(params.x_coord)
    .bind(params.y_coord)
    .bind(params.width)
    .bind(params.height)
    .bind(params.is_correct)
    .fetch_one(executor)
    .await
}
