use crate::db::models::QuestionOption;

const COLUMNS: &str = "id, question_id, text, is_correct, display_order";

pub(crate) async fn list_by_question(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {COLUMNS} FROM question_options WHERE question_id = $1 ORDER BY display_order, id"
    ))
    .bind(question_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_questions(
    executor: impl sqlx::PgExecutor<'_>,
    question_ids: &[String],
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {COLUMNS} FROM question_options WHERE question_id = ANY($1)
         ORDER BY question_id, display_order, id"
    ))
    .bind(question_ids)
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateOption<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) is_correct: bool,
    pub(crate) display_order: i32,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateOption<'_>,
) -> Result<QuestionOption, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(&format!(
        "INSERT INTO question_options (id, question_id, text, is_correct, display_order)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.text)
    .bind(params.is_correct)
    .bind(params.display_order)
    .fetch_one(executor)
    .await
}
