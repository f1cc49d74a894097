use sqlx::{Postgres, QueryBuilder};

use crate::db::models::AttemptQuestion;

const COLUMNS: &str = "id, attempt_id, question_id, question_order, options_order";

pub(crate) struct NewAttemptQuestion {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    pub(crate) question_order: i32,
    pub(crate) options_order: Option<Vec<String>>,
}

/// Inserts the whole manifest in one statement; runs inside the attempt
/// creation transaction so a failure leaves no partial manifest behind.
pub(crate) async fn insert_manifest(
    executor: impl sqlx::PgExecutor<'_>,
    rows: &[NewAttemptQuestion],
) -> Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO attempt_questions (id, attempt_id, question_id, question_order, options_order) ",
    );
    builder.push_values(rows, |mut row, item| {
        row.push_bind(&item.id)
            .push_bind(&item.attempt_id)
            .push_bind(&item.question_id)
            .push_bind(item.question_order)
            .push_bind(item.options_order.clone().map(sqlx::types::Json));
    });

    builder.build().execute(executor).await?;
    Ok(())
}

pub(crate) async fn list_by_attempt(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<AttemptQuestion>, sqlx::Error> {
    sqlx::query_as::<_, AttemptQuestion>(&format!(
        "SELECT {COLUMNS} FROM attempt_questions WHERE attempt_id = $1 ORDER BY question_order"
    ))
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}
