//! Response-header assertions.

use super::{check_absolute_url, ValidationContext, ValidationResult};

/// What a [`ResponseHeaderValidator`] asserts about its header.
#[derive(Clone, Debug)]
pub enum HeaderExpectation {
    Absent,
    Present,
    Equals { value: String },
    EqualsStateValue { key: String },
    AbsoluteUrl { must_include_access_token: bool },
}

/// Asserts absence, presence, equality, or URL shape of one response header.
/// Lookup is case-insensitive.
#[derive(Clone, Debug)]
pub struct ResponseHeaderValidator {
    pub header: String,
    pub expectation: HeaderExpectation,
}

impl ResponseHeaderValidator {
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let header = &self.header;
        let actual = ctx.response.header(header);

        match &self.expectation {
            HeaderExpectation::Absent => match actual {
                None => ValidationResult::ok(),
                Some(value) => ValidationResult::fail(format!(
                    "Header '{header}' expected absent, got '{value}'"
                )),
            },
            HeaderExpectation::Present => match actual {
                Some(_) => ValidationResult::ok(),
                None => ValidationResult::fail(format!("Header '{header}' is missing")),
            },
            HeaderExpectation::Equals { value: expected } => match actual {
                Some(value) if value == expected => ValidationResult::ok(),
                Some(value) => ValidationResult::fail(format!(
                    "Header '{header}' expected '{expected}', got '{value}'"
                )),
                None => ValidationResult::fail(format!("Header '{header}' is missing")),
            },
            HeaderExpectation::EqualsStateValue { key } => {
                let Some(expected) = ctx.state.get(key) else {
                    return ValidationResult::fail(format!("State key '{key}' is unset"));
                };
                match actual {
                    Some(value) if value == expected => ValidationResult::ok(),
                    Some(value) => ValidationResult::fail(format!(
                        "Header '{header}' expected '{expected}' (state '{key}'), got '{value}'"
                    )),
                    None => ValidationResult::fail(format!("Header '{header}' is missing")),
                }
            }
            HeaderExpectation::AbsoluteUrl {
                must_include_access_token,
            } => match actual {
                None => ValidationResult::fail(format!("Header '{header}' is missing")),
                Some(value) => match check_absolute_url(
                    value,
                    *must_include_access_token,
                    &format!("Header '{header}'"),
                ) {
                    None => ValidationResult::ok(),
                    Some(failure) => ValidationResult::fail(failure),
                },
            },
        }
    }
}
