use sqlx::Row;

fn database_url() -> Option<String> {
    // Load .env so CERTPREP_TEST_DATABASE_URL from .env is available
    dotenvy::dotenv().ok();

    if let Ok(url) = std::env::var("CERTPREP_TEST_DATABASE_URL") {
        if !url.trim().is_empty() {
            return Some(url);
        }
    }

    None
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let database_url = match database_url() {
        Some(url) => url,
        None => {
            // No test database on this machine.
            return Ok(());
        }
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let migrations_dir =
        std::env::var("CERTPREP_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let tables = [
        "users",
        "exams",
        "case_studies",
        "questions",
        "question_options",
        "hotspot_areas",
        "attempts",
        "attempt_questions",
        "answers",
    ];

    for table in tables {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    Ok(())
}
