use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::api;
use crate::core::{config::Settings, security, state::AppState, time::primitive_now_utc};
use crate::db::models::{CaseStudy, Exam, HotspotArea, Question, QuestionOption, User};
use crate::db::types::{QuestionType, UserRole};
use crate::repositories;

const TEST_SECRET_KEY: &str = "test-secret";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    dotenvy::dotenv().ok();

    std::env::set_var("CERTPREP_ENV", "test");
    std::env::set_var("CERTPREP_STRICT_CONFIG", "0");
    std::env::set_var("SECRET_KEY", TEST_SECRET_KEY);
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("PROJECT_NAME");
    std::env::remove_var("FIRST_ADMIN_PASSWORD");
}

/// Database-backed test harness. Returns `None` when
/// `CERTPREP_TEST_DATABASE_URL` is not set, so these suites skip on
/// machines without a local test Postgres.
pub(crate) async fn setup_test_context() -> Option<TestContext> {
    let guard = env_lock().await;
    set_test_env();

    let test_database_url = std::env::var("CERTPREP_TEST_DATABASE_URL").ok()?;
    std::env::set_var("DATABASE_URL", &test_database_url);

    let settings = Settings::load().expect("settings");
    let db = prepare_db(&settings).await;

    let state = AppState::new(settings, db);
    let app = api::router::router(state.clone());

    Some(TestContext { state, app, _guard: guard })
}

async fn prepare_db(settings: &Settings) -> PgPool {
    let db = crate::db::init_pool(settings).await.expect("db pool");
    crate::db::run_migrations(&db).await.expect("migrations");
    reset_db(&db).await.expect("reset db");
    db
}

pub(crate) async fn reset_db(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "TRUNCATE answers, attempt_questions, attempts, hotspot_areas, question_options, \
         questions, case_studies, exams, users RESTART IDENTITY CASCADE",
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn insert_user(
    pool: &PgPool,
    email: &str,
    full_name: &str,
    password: &str,
) -> User {
    insert_user_with_role(pool, email, full_name, password, UserRole::Student).await
}

pub(crate) async fn insert_admin(
    pool: &PgPool,
    email: &str,
    full_name: &str,
    password: &str,
) -> User {
    insert_user_with_role(pool, email, full_name, password, UserRole::Admin).await
}

pub(crate) async fn insert_user_with_role(
    pool: &PgPool,
    email: &str,
    full_name: &str,
    password: &str,
    role: UserRole,
) -> User {
    let hashed_password = security::hash_password(password).expect("hash password");
    let now = primitive_now_utc();

    repositories::users::create(
        pool,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email,
            hashed_password,
            full_name,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .expect("insert user")
}

pub(crate) async fn insert_exam(
    pool: &PgPool,
    code: &str,
    title: &str,
    time_limit_minutes: i32,
    passing_score: i32,
    created_by: &str,
) -> Exam {
    let now = primitive_now_utc();
    repositories::exams::create(
        pool,
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            code,
            title,
            description: None,
            time_limit_minutes,
            passing_score,
            created_by,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .expect("insert exam")
}

pub(crate) async fn insert_case_study(
    pool: &PgPool,
    exam_id: &str,
    title: &str,
    scenario: &str,
) -> CaseStudy {
    let now = primitive_now_utc();
    repositories::case_studies::create(
        pool,
        repositories::case_studies::CreateCaseStudy {
            id: &Uuid::new_v4().to_string(),
            exam_id,
            title,
            scenario,
            display_order: 0,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .expect("insert case study")
}

/// Inserts an option-backed question with one option per `(text, correct)`
/// pair, in the given display order.
pub(crate) async fn insert_choice_question(
    pool: &PgPool,
    exam_id: &str,
    question_type: QuestionType,
    body: &str,
    options: &[(&str, bool)],
) -> (Question, Vec<QuestionOption>) {
    let question = insert_question_row(pool, exam_id, question_type, body, None).await;

    let mut created = Vec::with_capacity(options.len());
    for (index, (text, is_correct)) in options.iter().enumerate() {
        let option = repositories::options::create(
            pool,
            repositories::options::CreateOption {
                id: &Uuid::new_v4().to_string(),
                question_id: &question.id,
                text,
                is_correct: *is_correct,
                display_order: index as i32,
            },
        )
        .await
        .expect("insert option");
        created.push(option);
    }

    (question, created)
}

pub(crate) async fn insert_structured_question(
    pool: &PgPool,
    exam_id: &str,
    question_type: QuestionType,
    body: &str,
    question_data: serde_json::Value,
) -> Question {
    insert_question_row(pool, exam_id, question_type, body, Some(question_data)).await
}

pub(crate) async fn insert_hotspot_question(
    pool: &PgPool,
    exam_id: &str,
    body: &str,
    areas: &[(&str, bool)],
) -> (Question, Vec<HotspotArea>) {
    let question =
        insert_question_row(pool, exam_id, QuestionType::Hotspot, body, None).await;

    let mut created = Vec::with_capacity(areas.len());
    for (label, is_correct) in areas {
        let area = repositories::hotspot_areas::create(
            pool,
            repositories::hotspot_areas::CreateHotspotArea {
                id: &Uuid::new_v4().to_string(),
                question_id: &question.id,
                label,
                x_coord: 10.0,
                y_coord: 20.0,
                width: 50.0,
                height: 30.0,
                is_correct: *is_correct,
            },
        )
        .await
        .expect("insert hotspot area");
        created.push(area);
    }

    (question, created)
}

async fn insert_question_row(
    pool: &PgPool,
    exam_id: &str,
    question_type: QuestionType,
    body: &str,
    question_data: Option<serde_json::Value>,
) -> Question {
    let now = primitive_now_utc();
    let question = repositories::questions::create(
        pool,
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            exam_id,
            case_study_id: None,
            question_type,
            body,
            explanation: None,
            display_order: 0,
            question_data,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .expect("insert question");

    repositories::exams::refresh_question_count(pool, exam_id, now)
        .await
        .expect("refresh question count");

    question
}

pub(crate) fn bearer_token(user_id: &str, settings: &Settings) -> String {
    security::create_access_token(user_id, settings.security(), None).expect("token")
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
