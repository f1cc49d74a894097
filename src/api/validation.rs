use crate::api::errors::ApiError;
use crate::schemas::question::QuestionCreate;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() <= 320
        && email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid email address".to_string()))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Cross-field check that a new question carries exactly the payload kind
/// its type calls for: option rows for option-backed types, area rows for
/// hotspot, a `question_data` document with a canonical `answer` for the
/// rest. A question that passes here is gradable as stored.
pub(crate) fn validate_question_payload(payload: &QuestionCreate) -> Result<(), ApiError> {
    let question_type = payload.question_type;

    if question_type.is_option_backed() {
        if payload.options.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "{} questions require at least one option",
                type_name(payload)
            )));
        }
        if !payload.options.iter().any(|option| option.is_correct) {
            return Err(ApiError::BadRequest(format!(
                "{} questions require at least one correct option",
                type_name(payload)
            )));
        }
        if !payload.hotspot_areas.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "{} questions must not carry hotspot areas",
                type_name(payload)
            )));
        }
        if payload.question_data.is_some() {
            return Err(ApiError::BadRequest(format!(
                "{} questions must not carry question_data",
                type_name(payload)
            )));
        }
        return Ok(());
    }

    if question_type == crate::db::types::QuestionType::Hotspot {
        if payload.hotspot_areas.is_empty() {
            return Err(ApiError::BadRequest(
                "hotspot questions require at least one clickable area".to_string(),
            ));
        }
        if !payload.hotspot_areas.iter().any(|area| area.is_correct) {
            return Err(ApiError::BadRequest(
                "hotspot questions require at least one correct area".to_string(),
            ));
        }
        if !payload.options.is_empty() {
            return Err(ApiError::BadRequest(
                "hotspot questions must not carry options".to_string(),
            ));
        }
        return Ok(());
    }

    let Some(data) = payload.question_data.as_ref() else {
        return Err(ApiError::BadRequest(format!(
            "{} questions require question_data",
            type_name(payload)
        )));
    };
    if !data.is_object() || data.get("answer").is_none() {
        return Err(ApiError::BadRequest(format!(
            "{} questions require question_data with an answer key",
            type_name(payload)
        )));
    }
    if !payload.options.is_empty() || !payload.hotspot_areas.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "{} questions must not carry options or hotspot areas",
            type_name(payload)
        )));
    }

    Ok(())
}

fn type_name(payload: &QuestionCreate) -> String {
    serde_json::to_value(payload.question_type)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
