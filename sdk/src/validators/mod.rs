//! Validator algebra: pluggable predicates over a captured response.
//!
//! Every validator shares the same contract: given the response, the
//! resource table, and the case state, produce a [`ValidationResult`].
//! Validators are side-effect free; state writes belong to the separate
//! state-saver family (see [`crate::savers`]).

mod headers;
pub(crate) mod json;
mod lock;

pub use {
    headers::{HeaderExpectation, ResponseHeaderValidator},
    json::{JsonContentValidator, JsonPropertyKind, JsonPropertyValidator},
    lock::LockMismatchValidator,
};

use {
    crate::{capture::ResponseCapture, resources::ResourceManager, state::State, wire},
    reqwest::Url,
};

/// Success, or a non-empty list of diagnostics in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ValidationResult {
    failures: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            failures: vec![message.into()],
        }
    }

    pub fn from_failures(failures: Vec<String>) -> Self {
        Self { failures }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<String> {
        self.failures
    }
}

/// What a validator gets to look at.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub response: &'a ResponseCapture,
    pub resources: &'a ResourceManager,
    pub state: &'a State,
}

/// One conformance predicate over a captured response.
#[derive(Clone, Debug)]
pub enum Validator {
    ResponseCode(ResponseCodeValidator),
    ResponseContent(ResponseContentValidator),
    ResponseHeader(ResponseHeaderValidator),
    LockMismatch(LockMismatchValidator),
    JsonContent(JsonContentValidator),
}

impl Validator {
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        match self {
            Self::ResponseCode(v) => v.validate(ctx),
            Self::ResponseContent(v) => v.validate(ctx),
            Self::ResponseHeader(v) => v.validate(ctx),
            Self::LockMismatch(v) => v.validate(ctx),
            Self::JsonContent(v) => v.validate(ctx),
        }
    }
}

/// Passes iff the response status equals the expected code.
#[derive(Clone, Debug)]
pub struct ResponseCodeValidator {
    pub expected: u16,
}

impl ResponseCodeValidator {
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        if ctx.response.status_code == self.expected {
            ValidationResult::ok()
        } else {
            ValidationResult::fail(format!(
                "Expected code {}, got {}",
                self.expected, ctx.response.status_code
            ))
        }
    }
}

/// Verifies the body equals a named resource or a saved state value.
#[derive(Clone, Debug)]
pub struct ResponseContentValidator {
    pub expected_resource_id: Option<String>,
    pub expected_state_key: Option<String>,
}

impl ResponseContentValidator {
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        if let Some(id) = &self.expected_resource_id {
            return match ctx.resources.contents(id) {
                Ok(expected) if expected == ctx.response.body.as_slice() => ValidationResult::ok(),
                Ok(_) => ValidationResult::fail(format!(
                    "Response body does not match resource '{id}'"
                )),
                Err(e) => ValidationResult::fail(e.to_string()),
            };
        }
        if let Some(key) = &self.expected_state_key {
            return match ctx.state.get(key) {
                Some(expected) if expected.as_bytes() == ctx.response.body.as_slice() => {
                    ValidationResult::ok()
                }
                Some(_) => ValidationResult::fail(format!(
                    "Response body does not match saved state '{key}'"
                )),
                None => ValidationResult::fail(format!("State key '{key}' is unset")),
            };
        }
        ValidationResult::ok()
    }
}

/// Absolute-URL check shared by the header and JSON-property validators.
///
/// When `must_include_access_token` is set the check fails iff the
/// `access_token` query parameter is absent.
pub(crate) fn check_absolute_url(
    raw: &str,
    must_include_access_token: bool,
    what: &str,
) -> Option<String> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => return Some(format!("{what} is not an absolute URL ('{raw}'): {e}")),
    };
    if !url.has_host() {
        return Some(format!("{what} is not an absolute URL ('{raw}')"));
    }
    if must_include_access_token
        && !url
            .query_pairs()
            .any(|(name, _)| name == wire::ACCESS_TOKEN_PARAM)
    {
        return Some(format!(
            "{what} is missing the access_token query parameter ('{raw}')"
        ));
    }
    None
}
