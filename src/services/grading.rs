use serde_json::Value;

use crate::db::types::QuestionType;

/// Exact-set comparison for option-style answers: both sides are sorted and
/// must be structurally equal. A missing or extra selection on a
/// multi-correct question grades as wrong; overlap is never enough.
pub(crate) fn sets_match(submitted: &[String], correct: &[String]) -> bool {
    let mut submitted: Vec<&str> = submitted.iter().map(String::as_str).collect();
    let mut correct: Vec<&str> = correct.iter().map(String::as_str).collect();
    submitted.sort_unstable();
    correct.sort_unstable();
    submitted == correct
}

/// Structured types carry their canonical answer inside the question's
/// `question_data` document under the `answer` key; the submission must be
/// structurally identical to it.
pub(crate) fn structured_matches(question_data: Option<&Value>, submitted: &Value) -> bool {
    match question_data.and_then(|data| data.get("answer")) {
        Some(expected) => expected == submitted,
        None => false,
    }
}

/// Area ids a hotspot submission selected, from its
/// `{"selected_area_ids": [...]}` document.
pub(crate) fn hotspot_selected_ids(answer_data: &Value) -> Vec<String> {
    answer_data
        .get("selected_area_ids")
        .and_then(Value::as_array)
        .map(|items| {
            items.iter().filter_map(Value::as_str).map(str::to_string).collect()
        })
        .unwrap_or_default()
}

/// Grades one question. A question with no stored submission is graded with
/// an empty payload, so unanswered questions count as wrong unless the
/// canonical set is itself empty.
pub(crate) fn is_answer_correct(
    question_type: QuestionType,
    question_data: Option<&Value>,
    correct_option_ids: &[String],
    correct_area_ids: &[String],
    selected_option_ids: Option<&[String]>,
    answer_data: Option<&Value>,
) -> bool {
    if question_type.is_option_backed() {
        return sets_match(selected_option_ids.unwrap_or(&[]), correct_option_ids);
    }

    if question_type == QuestionType::Hotspot {
        let selected = answer_data.map(hotspot_selected_ids).unwrap_or_default();
        return sets_match(&selected, correct_area_ids);
    }

    match answer_data {
        Some(submitted) => structured_matches(question_data, submitted),
        None => false,
    }
}

/// Fixed 0-1000 scale so scores compare across exams of any size and can be
/// checked against a single passing threshold.
pub(crate) fn score_attempt(correct_count: usize, total_questions: usize) -> i32 {
    if total_questions == 0 {
        return 0;
    }
    ((correct_count as f64 / total_questions as f64) * 1000.0).round() as i32
}
