//! Input validation helpers
//!
//! Custom `validator` rules, error flattening and the
//! [`ValidatedJson`] extractor used by every JSON body in the API.

use std::borrow::Cow;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::utils::AppError;
use crate::utils::error::FieldError;

// ── Limits ──────────────────────────────────────────────────────────

/// Minimum review comment length (after trimming)
pub const MIN_REVIEW_COMMENT_LEN: usize = 5;

// ── Custom rules (used via `#[validate(custom(function = ...))]`) ───

/// Rejects empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be empty")));
    }
    Ok(())
}

/// Review comments must carry at least a few visible characters.
pub fn review_comment(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < MIN_REVIEW_COMMENT_LEN {
        return Err(ValidationError::new("too_short").with_message(Cow::Owned(format!(
            "must be at least {MIN_REVIEW_COMMENT_LEN} characters"
        ))));
    }
    Ok(())
}

// ── validator → AppError ────────────────────────────────────────────

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        flatten_errors(None, &errors, &mut details);
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = match details.first() {
            Some(first) if details.len() == 1 => {
                format!("Validation failed: {} {}", first.field, first.message)
            }
            _ => "Validation failed".to_string(),
        };

        AppError::Validation { message, details }
    }
}

/// 展开嵌套结构 / 列表的错误，字段路径形如 `items[0].quantity`
fn flatten_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(FieldError {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(Some(&path), inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_errors(Some(&format!("{path}[{index}]")), inner, out);
                }
            }
        }
    }
}

// ── Extractor ───────────────────────────────────────────────────────

/// JSON body extractor that runs `validator` rules before the handler.
///
/// Malformed JSON and rule violations both surface as
/// [`AppError::Validation`] (400).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}
