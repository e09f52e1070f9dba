//! Lock-string assertion for conflict responses.

use {
    super::{ValidationContext, ValidationResult},
    crate::wire,
};

/// Verifies `X-WOPI-Lock` on a 409 against a literal or a saved state value.
///
/// The saved value wins when both are declared and the state key is set.
/// A missing header is tolerated when `is_required` is false.
#[derive(Clone, Debug)]
pub struct LockMismatchValidator {
    pub expected_value: Option<String>,
    pub expected_state_key: Option<String>,
    pub is_required: bool,
}

impl LockMismatchValidator {
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let actual = match ctx.response.header(wire::LOCK) {
            Some(value) => value,
            None if self.is_required => {
                return ValidationResult::fail(format!(
                    "Expected {} header on the conflict response",
                    wire::LOCK
                ));
            }
            None => return ValidationResult::ok(),
        };

        let saved = self
            .expected_state_key
            .as_deref()
            .and_then(|key| ctx.state.get(key));
        let expected = saved.or(self.expected_value.as_deref());

        match expected {
            Some(expected) if expected == actual => ValidationResult::ok(),
            Some(expected) => ValidationResult::fail(format!(
                "{} mismatch: expected '{expected}', got '{actual}'",
                wire::LOCK
            )),
            // Nothing to compare against: presence is all that was asked.
            None => ValidationResult::ok(),
        }
    }
}
