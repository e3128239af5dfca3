// 📋 Payload validation - required-field checks at the API boundary
//
// Mirrors the validation middleware of the HTTP layer: clients need
// name/status/type, interactions need clientId/type/date. Status and type
// arrive pre-classified by the model enums, so the remaining checks are
// about empty strings.

use crate::store::{NewClient, NewInteraction};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

fn required(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError {
            field: field.to_string(),
            message: "Required field is empty".to_string(),
        });
    }
}

/// Validate a client payload before it reaches the store.
pub fn validate_client(new: &NewClient) -> ValidationResult {
    let mut errors = Vec::new();

    required(&mut errors, "name", &new.name);
    required(&mut errors, "status", new.status.as_str());
    required(&mut errors, "type", new.client_type.as_str());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate an interaction payload before it reaches the store.
pub fn validate_interaction(new: &NewInteraction) -> ValidationResult {
    let mut errors = Vec::new();

    required(&mut errors, "clientId", &new.client_id);
    required(&mut errors, "type", new.interaction_type.as_str());
    required(&mut errors, "date", &new.date);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Flatten validation errors into the single message the API returns.
pub fn error_message(errors: &[ValidationError]) -> String {
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    format!("Required fields missing or empty: {}", fields.join(", "))
}

// ============================================================================
// TESTS
// ============================================================================
