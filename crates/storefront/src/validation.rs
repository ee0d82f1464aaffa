//! Client-side form validation.
//!
//! Two layers, mirroring the browser: [`submit`] is the native validity
//! gate (required fields, structurally valid email inputs) and [`blur`] runs
//! the stricter per-field checks with inline error text.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use nutriharvest_core::Email;

use crate::page::{Field, FieldKind, PageHandle};

/// Minimum accepted password length on blur.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Email shape required on blur: something, `@`, something, `.`, something.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Client-side validation failures; `Display` is the text shown to the
/// shopper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Please select a rating")]
    MissingRating,

    #[error("Please enter your review comment")]
    MissingComment,

    #[error("Could not determine the product for this review")]
    UnknownProduct,

    #[error("Please select items and an action")]
    NoBulkSelection,

    /// The form failed the native validity gate.
    #[error("Please correct the highlighted fields")]
    InvalidForm { fields: Vec<String> },

    #[error("Form not found: {0}")]
    UnknownForm(String),
}

/// Check an email address the way the blur handler does.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] if `value` does not look like
/// `local@domain.tld`.
pub fn check_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Check a password length the way the blur handler does.
///
/// # Errors
///
/// Returns [`ValidationError::PasswordTooShort`] for fewer than
/// [`MIN_PASSWORD_LEN`] characters.
pub fn check_password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        Err(ValidationError::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Native validity of one field: required and structural email checks.
fn natively_valid(field: &Field) -> bool {
    if field.value.is_empty() {
        return !field.required;
    }
    match field.kind {
        FieldKind::Email => Email::parse(&field.value).is_ok(),
        FieldKind::Text | FieldKind::Password => true,
    }
}

/// Gate a form submission.
///
/// The form is marked validated whether or not it passes, so invalid
/// fields get highlighted.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidForm`] naming the failing fields, or
/// [`ValidationError::UnknownForm`] if the page has no such form.
pub fn submit(page: &PageHandle, form_id: &str) -> Result<(), ValidationError> {
    page.update(|page| {
        let form = page
            .forms
            .iter_mut()
            .find(|f| f.id == form_id)
            .ok_or_else(|| ValidationError::UnknownForm(form_id.to_string()))?;

        form.was_validated = true;

        let invalid: Vec<String> = form
            .fields
            .iter_mut()
            .filter_map(|field| {
                field.invalid = !natively_valid(field);
                field.invalid.then(|| field.name.clone())
            })
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            debug!(form = form_id, fields = ?invalid, "Form submission blocked");
            Err(ValidationError::InvalidForm { fields: invalid })
        }
    })
}

/// Validate a field when it loses focus.
///
/// Empty fields are left alone. On failure the field is flagged and its
/// error text inserted (or replaced); on success both are cleared.
///
/// # Errors
///
/// Returns the failed check, or [`ValidationError::UnknownForm`] if the
/// field does not exist.
pub fn blur(page: &PageHandle, form_id: &str, field_name: &str) -> Result<(), ValidationError> {
    page.update(|page| {
        let field = page
            .field_mut(form_id, field_name)
            .ok_or_else(|| ValidationError::UnknownForm(form_id.to_string()))?;

        let result = match field.kind {
            FieldKind::Email if !field.value.is_empty() => check_email(&field.value),
            FieldKind::Password if !field.value.is_empty() => check_password(&field.value),
            _ => Ok(()),
        };

        match &result {
            Ok(()) => {
                field.invalid = false;
                field.error = None;
            }
            Err(e) => {
                field.invalid = true;
                field.error = Some(e.to_string());
            }
        }
        result
    })
}
