use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::QuestionType;
use crate::test_support::{self, TestContext};

async fn start_attempt(ctx: &TestContext, exam_id: &str, token: &str) -> serde_json::Value {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{exam_id}/start"),
            Some(token),
            None,
        ))
        .await
        .expect("start attempt");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    body
}

async fn signup_student(
    app: axum::Router,
    email: &str,
    full_name: &str,
    password: &str,
) -> (String, String) {
    let payload = json!({
        "email": email,
        "full_name": full_name,
        "password": password
    });

    let response = app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(payload),
        ))
        .await
        .expect("signup");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");

    let token = body["access_token"].as_str().expect("token").to_string();
    let user_id = body["user"]["id"].as_str().expect("user id").to_string();

    (token, user_id)
}

async fn login_student(app: axum::Router, email: &str, password: &str) -> String {
    let payload = json!({
        "email": email,
        "password": password
    });

    let response = app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(payload),
        ))
        .await
        .expect("login");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    body["access_token"].as_str().expect("token").to_string()
}

async fn save_answer(
    ctx: &TestContext,
    attempt_id: &str,
    token: &str,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/attempts/{attempt_id}/answers"),
            Some(token),
            Some(payload),
        ))
        .await
        .expect("save answer");
    let status = response.status();
    let body = test_support::read_json(response).await;
    (status, body)
}

#[tokio::test]
async fn save_answer_upserts_and_validates_payload_kind() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let admin =
        test_support::insert_admin(ctx.state.db(), "admin@certprep.test", "Admin", "admin-pass")
            .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@certprep.test",
        "Student",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let exam =
        test_support::insert_exam(ctx.state.db(), "AZ-500", "Security Engineer", 90, 700, &admin.id)
            .await;
    let (question, options) = test_support::insert_choice_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::SingleChoice,
        "Pick the identity service",
        &[("Entra ID", true), ("DNS", false)],
    )
    .await;
    let correct_id = options[0].id.clone();
    let wrong_id = options[1].id.clone();

    let start = start_attempt(&ctx, &exam.id, &token).await;
    let attempt_id = start["attempt"]["id"].as_str().expect("attempt id").to_string();

    let (status, saved) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": question.id, "selectedOptionIds": [wrong_id]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {saved}");
    assert_eq!(saved["question_id"], question.id.as_str());
    assert_eq!(saved["marked_for_review"], false);
    assert!(saved["is_correct"].is_null(), "verdict must not exist before submission");

    // A second save for the same question replaces the first.
    let (status, saved) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({
            "questionId": question.id,
            "selectedOptionIds": [correct_id],
            "markedForReview": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {saved}");
    assert_eq!(saved["marked_for_review"], true);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}/progress"),
            Some(&token),
            None,
        ))
        .await
        .expect("progress");
    let progress = test_support::read_json(response).await;
    let answers = progress["answers"].as_array().expect("answers");
    assert_eq!(answers.len(), 1, "re-save must not create a second row");
    assert_eq!(answers[0]["selected_option_ids"][0], correct_id.as_str());
    assert_eq!(progress["completed"], false);

    // Exactly one of the two payload fields must be present.
    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({
            "questionId": question.id,
            "selectedOptionIds": [correct_id],
            "answerData": {"order": []}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        save_answer(&ctx, &attempt_id, &token, json!({"questionId": question.id})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The payload kind must match the question type.
    let (status, body) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": question.id, "answerData": {"order": ["a"]}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");

    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": "missing-question", "selectedOptionIds": []}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_reports_a_live_clock() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let admin =
        test_support::insert_admin(ctx.state.db(), "admin@certprep.test", "Admin", "admin-pass")
            .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@certprep.test",
        "Student",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let exam =
        test_support::insert_exam(ctx.state.db(), "AZ-204", "Developer", 150, 700, &admin.id).await;
    test_support::insert_choice_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::YesNo,
        "Is Rust memory safe?",
        &[("Yes", true), ("No", false)],
    )
    .await;

    let start = start_attempt(&ctx, &exam.id, &token).await;
    let attempt_id = start["attempt"]["id"].as_str().expect("attempt id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}/progress"),
            Some(&token),
            None,
        ))
        .await
        .expect("progress");
    let progress = test_support::read_json(response).await;

    let remaining = progress["time_remaining_seconds"].as_i64().expect("clock");
    assert!(remaining > 150 * 60 - 60, "clock drained too fast: {remaining}");
    assert!(remaining <= 150 * 60, "clock above the limit: {remaining}");
    assert_eq!(progress["answers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn submit_grades_the_full_bank_and_freezes_the_attempt() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let admin =
        test_support::insert_admin(ctx.state.db(), "admin@certprep.test", "Admin", "admin-pass")
            .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@certprep.test",
        "Student",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let exam =
        test_support::insert_exam(ctx.state.db(), "AZ-700", "Network Engineer", 120, 700, &admin.id)
            .await;

    let (single, single_options) = test_support::insert_choice_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::SingleChoice,
        "Pick the right subnet",
        &[("10.0.0.0/24", true), ("300.1.1.1/8", false)],
    )
    .await;
    let (multi, multi_options) = test_support::insert_choice_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::MultipleChoice,
        "Select both private ranges",
        &[("10.0.0.0/8", true), ("172.16.0.0/12", true), ("8.8.8.8/32", false)],
    )
    .await;
    let ordering = test_support::insert_structured_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::DragDropOrdering,
        "Order the handshake",
        json!({"items": ["ack", "syn", "syn-ack"], "answer": ["syn", "syn-ack", "ack"]}),
    )
    .await;
    let (hotspot, areas) = test_support::insert_hotspot_question(
        ctx.state.db(),
        &exam.id,
        "Click the gateway",
        &[("Gateway", true), ("Switch", false)],
    )
    .await;

    let start = start_attempt(&ctx, &exam.id, &token).await;
    let attempt_id = start["attempt"]["id"].as_str().expect("attempt id").to_string();
    assert_eq!(start["questions"].as_array().unwrap().len(), 4);

    // Correct single choice.
    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": single.id, "selectedOptionIds": [single_options[0].id]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Partial multi select grades as wrong: exact set or nothing.
    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": multi.id, "selectedOptionIds": [multi_options[0].id]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Correct hotspot selection. The ordering question stays unanswered.
    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": hotspot.id, "answerData": {"selected_area_ids": [areas[0].id]}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/attempts/{attempt_id}/submit"),
            Some(&token),
            None,
        ))
        .await
        .expect("submit attempt");
    let status = response.status();
    let result = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");

    // 2 of 4 correct on the 0-1000 scale.
    assert_eq!(result["score"], 500);
    assert_eq!(result["correct_count"], 2);
    assert_eq!(result["total_questions"], 4);
    assert_eq!(result["passed"], false);
    assert_eq!(result["attempt"]["completed"], true);
    assert_eq!(result["attempt"]["score"], 500);
    assert!(result["attempt"]["ended_at"].is_string());

    let results = result["results"].as_array().expect("results");
    assert_eq!(results.len(), 4);
    let by_question = |id: &str| {
        results
            .iter()
            .find(|row| row["question_id"] == id)
            .unwrap_or_else(|| panic!("missing result for {id}"))
    };
    assert_eq!(by_question(&single.id)["is_correct"], true);
    assert_eq!(by_question(&multi.id)["is_correct"], false);
    assert_eq!(by_question(&multi.id)["correct_option_ids"].as_array().unwrap().len(), 2);
    assert_eq!(by_question(&multi.id)["submitted_option_ids"].as_array().unwrap().len(), 1);
    assert_eq!(by_question(&ordering.id)["is_correct"], false);
    assert_eq!(by_question(&hotspot.id)["is_correct"], true);

    // Saves against a finalized attempt are refused.
    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": single.id, "selectedOptionIds": [single_options[1].id]}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // So is a second submission.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/attempts/{attempt_id}/submit"),
            Some(&token),
            None,
        ))
        .await
        .expect("second submit");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Review replays the frozen verdicts.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("review");
    let status = response.status();
    let review = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {review}");
    assert_eq!(review["score"], 500);
    assert_eq!(review["correct_count"], 2);
    assert_eq!(review["passed"], false);
    assert_eq!(review["time_remaining_seconds"], result["time_remaining_seconds"]);
    assert_eq!(review["results"].as_array().unwrap().len(), 4);

    // Progress now reports the clock frozen at submission.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}/progress"),
            Some(&token),
            None,
        ))
        .await
        .expect("progress after submit");
    let progress = test_support::read_json(response).await;
    assert_eq!(progress["completed"], true);
    assert_eq!(progress["time_remaining_seconds"], result["time_remaining_seconds"]);
}

#[tokio::test]
async fn unanswered_submission_scores_zero() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let admin =
        test_support::insert_admin(ctx.state.db(), "admin@certprep.test", "Admin", "admin-pass")
            .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@certprep.test",
        "Student",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let exam =
        test_support::insert_exam(ctx.state.db(), "DP-203", "Data Engineer", 60, 700, &admin.id)
            .await;
    for index in 0..3 {
        test_support::insert_choice_question(
            ctx.state.db(),
            &exam.id,
            QuestionType::SingleChoice,
            &format!("Question {index}"),
            &[("Right", true), ("Wrong", false)],
        )
        .await;
    }

    let start = start_attempt(&ctx, &exam.id, &token).await;
    let attempt_id = start["attempt"]["id"].as_str().expect("attempt id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/attempts/{attempt_id}/submit"),
            Some(&token),
            None,
        ))
        .await
        .expect("submit blank attempt");
    let status = response.status();
    let result = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["score"], 0);
    assert_eq!(result["correct_count"], 0);
    assert_eq!(result["total_questions"], 3);
    assert!(result["results"]
        .as_array()
        .unwrap()
        .iter()
        .all(|row| row["is_correct"] == false));
}

#[tokio::test]
async fn attempt_operations_enforce_ownership_and_state() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let admin =
        test_support::insert_admin(ctx.state.db(), "admin@certprep.test", "Admin", "admin-pass")
            .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@certprep.test",
        "Student",
        "student-pass",
    )
    .await;
    let intruder = test_support::insert_user(
        ctx.state.db(),
        "intruder@certprep.test",
        "Intruder",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let intruder_token = test_support::bearer_token(&intruder.id, ctx.state.settings());
    let exam =
        test_support::insert_exam(ctx.state.db(), "SC-900", "Security Basics", 60, 700, &admin.id)
            .await;
    let (question, options) = test_support::insert_choice_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::YesNo,
        "Is MFA recommended?",
        &[("Yes", true), ("No", false)],
    )
    .await;

    let start = start_attempt(&ctx, &exam.id, &token).await;
    let attempt_id = start["attempt"]["id"].as_str().expect("attempt id").to_string();

    // Review before completion is refused.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("review open attempt");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Foreign attempts look forbidden, unknown ones absent.
    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &intruder_token,
        json!({"questionId": question.id, "selectedOptionIds": [options[0].id]}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for uri in [
        format!("/api/v1/attempts/{attempt_id}/progress"),
        format!("/api/v1/attempts/{attempt_id}"),
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, &uri, Some(&intruder_token), None))
            .await
            .expect("foreign attempt access");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri: {uri}");
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/attempts/{attempt_id}/submit"),
            Some(&intruder_token),
            None,
        ))
        .await
        .expect("foreign submit");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/attempts/no-such-attempt/progress",
            Some(&token),
            None,
        ))
        .await
        .expect("unknown attempt");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}/progress"),
            None,
            None,
        ))
        .await
        .expect("progress without token");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_flow_signup_login_take_and_review() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let admin =
        test_support::insert_admin(ctx.state.db(), "admin@certprep.test", "Admin", "admin-pass")
            .await;
    let exam =
        test_support::insert_exam(ctx.state.db(), "AI-102", "AI Engineer", 100, 700, &admin.id)
            .await;
    let (first, first_options) = test_support::insert_choice_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::SingleChoice,
        "Which service hosts models?",
        &[("Azure ML", true), ("Blob Storage", false)],
    )
    .await;
    test_support::insert_choice_question(
        ctx.state.db(),
        &exam.id,
        QuestionType::YesNo,
        "Does the endpoint autoscale?",
        &[("Yes", true), ("No", false)],
    )
    .await;

    let (signup_token, _user_id) =
        signup_student(ctx.app.clone(), "flow@example.com", "Flow Student", "student-pass").await;
    assert!(!signup_token.is_empty());
    let token = login_student(ctx.app.clone(), "flow@example.com", "student-pass").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exams?search=AI-102",
            Some(&token),
            None,
        ))
        .await
        .expect("browse catalog");
    let catalog = test_support::read_json(response).await;
    assert_eq!(catalog["total_count"], 1);
    assert_eq!(catalog["items"][0]["id"], exam.id.as_str());

    let start = start_attempt(&ctx, &exam.id, &token).await;
    let attempt_id = start["attempt"]["id"].as_str().expect("attempt id").to_string();
    assert_eq!(start["questions"].as_array().unwrap().len(), 2);

    let (status, _) = save_answer(
        &ctx,
        &attempt_id,
        &token,
        json!({"questionId": first.id, "selectedOptionIds": [first_options[0].id]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/attempts/{attempt_id}/submit"),
            Some(&token),
            None,
        ))
        .await
        .expect("submit");
    let status = response.status();
    let result = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["score"], 500);
    assert_eq!(result["passed"], false);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts/{attempt_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("review");
    let review = test_support::read_json(response).await;
    assert_eq!(review["score"], 500);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/attempts", Some(&token), None))
        .await
        .expect("history");
    let history = test_support::read_json(response).await;
    assert_eq!(history["total_count"], 1);
    assert_eq!(history["items"][0]["score"], 500);
    assert_eq!(history["items"][0]["completed"], true);
}

#[tokio::test]
async fn attempt_history_lists_only_the_callers_attempts() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let admin =
        test_support::insert_admin(ctx.state.db(), "admin@certprep.test", "Admin", "admin-pass")
            .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@certprep.test",
        "Student",
        "student-pass",
    )
    .await;
    let other = test_support::insert_user(
        ctx.state.db(),
        "other@certprep.test",
        "Other",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let other_token = test_support::bearer_token(&other.id, ctx.state.settings());

    let first =
        test_support::insert_exam(ctx.state.db(), "AZ-900", "Fundamentals", 60, 700, &admin.id)
            .await;
    let second =
        test_support::insert_exam(ctx.state.db(), "AZ-104", "Administrator", 90, 700, &admin.id)
            .await;
    for exam_id in [&first.id, &second.id] {
        test_support::insert_choice_question(
            ctx.state.db(),
            exam_id,
            QuestionType::YesNo,
            "Placeholder",
            &[("Yes", true), ("No", false)],
        )
        .await;
    }

    start_attempt(&ctx, &first.id, &token).await;
    start_attempt(&ctx, &first.id, &token).await;
    start_attempt(&ctx, &second.id, &token).await;
    start_attempt(&ctx, &first.id, &other_token).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/attempts", Some(&token), None))
        .await
        .expect("list attempts");
    let list = test_support::read_json(response).await;
    assert_eq!(list["total_count"], 3);
    assert_eq!(list["items"].as_array().unwrap().len(), 3);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/attempts?exam_id={}", first.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list attempts for one exam");
    let list = test_support::read_json(response).await;
    assert_eq!(list["total_count"], 2);
    assert!(list["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["exam_id"] == first.id.as_str()));
}
