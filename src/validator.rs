// ==============================================================================
// validator.rs - Request Input Validation
// ==============================================================================
// Description: Field validators for user registration and weather lookups,
//              plus conversion of validation errors into handler failures
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

use crate::error::HandlerFailure;

// US ZIP code, five digits
const ZIP_LENGTH: usize = 5;

/// Validates a five digit ZIP code
pub fn validate_zip(zip: &str) -> Result<(), ValidationError> {
    if zip.len() == ZIP_LENGTH && zip.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("zip");
        error.message = Some(Cow::Borrowed("zip must be a 5 digit code"));
        Err(error)
    }
}

/// Validates a ZIP code taken from a path segment
pub fn check_zip(zip: &str) -> Result<(), HandlerFailure> {
    validate_zip(zip).map_err(|_| HandlerFailure::bad_request("Invalid zip code"))
}

/// Converts field errors into a single 400 failure
///
/// The message lists each failing field; the detail carries the raw
/// validator output for the error log.
pub fn validation_failure(errors: ValidationErrors) -> HandlerFailure {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            errs.iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", field))
        })
        .collect();
    fields.sort();

    HandlerFailure::bad_request(format!("Invalid user data: {}", fields.join(", ")))
        .with_detail(errors.to_string())
}
