//! JSON-body property validation.
//!
//! The body is parsed once; each property validator selects a token by
//! JSON path and applies one predicate. Failures aggregate in declaration
//! order into a single result so a case reports every offender at once.

use {
    super::{check_absolute_url, ValidationContext, ValidationResult},
    crate::state::State,
    regex::Regex,
    serde_json::Value,
    std::str::FromStr,
};

/// Select the first token a JSON path resolves to.
///
/// Bare property names are accepted and treated as `$.name`.
pub(crate) fn select_first<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let normalized = if path.starts_with('$') {
        path.to_string()
    } else {
        format!("$.{path}")
    };
    jsonpath_lib::select(root, &normalized)
        .ok()?
        .into_iter()
        .next()
}

/// Textual form of a selected token, as savers and equality checks see it.
pub(crate) fn string_form(token: &Value) -> String {
    match token {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty(token: &Value) -> bool {
    match token {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// One predicate applied to a JSON-path-selected token.
#[derive(Clone, Debug)]
pub enum JsonPropertyKind {
    /// Integer (or long) equality; the saved state value wins when it parses.
    Integer {
        value: Option<i64>,
        state_key: Option<String>,
    },
    Boolean {
        value: Option<bool>,
        state_key: Option<String>,
    },
    String {
        value: Option<String>,
        state_key: Option<String>,
    },
    EndsWith {
        suffix: String,
    },
    Regex {
        pattern: String,
        should_match: bool,
    },
    AbsoluteUrl {
        must_include_access_token: bool,
    },
    /// Case-insensitive string containment in an array token.
    ArrayContains {
        value: String,
    },
}

/// A property assertion inside a [`JsonContentValidator`].
#[derive(Clone, Debug)]
pub struct JsonPropertyValidator {
    pub path: String,
    pub is_required: bool,
    pub kind: JsonPropertyKind,
}

impl JsonPropertyValidator {
    fn check(&self, root: &Value, state: &State) -> Option<String> {
        let path = &self.path;
        let token = select_first(root, path).filter(|t| !is_empty(t));
        let Some(token) = token else {
            return self
                .is_required
                .then(|| format!("Required property missing: {path}"));
        };

        match &self.kind {
            JsonPropertyKind::Integer { value, state_key } => {
                let Some(actual) = token.as_i64() else {
                    return Some(format!("Property {path} is not an integer ({token})"));
                };
                check_equality(path, actual, value, state_key, state)
            }
            JsonPropertyKind::Boolean { value, state_key } => {
                let Some(actual) = token.as_bool() else {
                    return Some(format!("Property {path} is not a boolean ({token})"));
                };
                check_equality(path, actual, value, state_key, state)
            }
            JsonPropertyKind::String { value, state_key } => {
                check_equality(path, string_form(token), value, state_key, state)
            }
            JsonPropertyKind::EndsWith { suffix } => {
                let actual = string_form(token);
                (!actual.ends_with(suffix))
                    .then(|| format!("Property {path} ('{actual}') does not end with '{suffix}'"))
            }
            JsonPropertyKind::Regex {
                pattern,
                should_match,
            } => {
                let regex = match Regex::new(pattern) {
                    Ok(regex) => regex,
                    Err(e) => return Some(format!("Invalid pattern '{pattern}': {e}")),
                };
                let actual = string_form(token);
                match (regex.is_match(&actual), should_match) {
                    (true, false) => {
                        Some(format!("Property {path} ('{actual}') must not match '{pattern}'"))
                    }
                    (false, true) => {
                        Some(format!("Property {path} ('{actual}') does not match '{pattern}'"))
                    }
                    _ => None,
                }
            }
            JsonPropertyKind::AbsoluteUrl {
                must_include_access_token,
            } => check_absolute_url(
                &string_form(token),
                *must_include_access_token,
                &format!("Property {path}"),
            ),
            JsonPropertyKind::ArrayContains { value } => {
                let Some(items) = token.as_array() else {
                    return Some(format!("Property {path} is not an array ({token})"));
                };
                let found = items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|item| item.eq_ignore_ascii_case(value));
                (!found).then(|| format!("Property {path} does not contain '{value}'"))
            }
        }
    }
}

/// The expected value: saved state wins when present and coercible to the
/// target type; otherwise the literal; with neither, presence alone passes.
fn expected_from<T>(state: &State, state_key: &Option<String>, literal: &Option<T>) -> Option<T>
where
    T: FromStr + Clone,
{
    if let Some(raw) = state_key.as_deref().and_then(|key| state.get(key)) {
        if let Ok(value) = raw.parse::<T>() {
            return Some(value);
        }
    }
    literal.clone()
}

fn check_equality<T>(
    path: &str,
    actual: T,
    literal: &Option<T>,
    state_key: &Option<String>,
    state: &State,
) -> Option<String>
where
    T: FromStr + Clone + PartialEq + std::fmt::Display,
{
    match expected_from(state, state_key, literal) {
        Some(expected) if expected != actual => {
            Some(format!("Property {path} expected '{expected}', got '{actual}'"))
        }
        _ => None,
    }
}

/// Parses the body as JSON and applies every property validator.
#[derive(Clone, Debug)]
pub struct JsonContentValidator {
    pub properties: Vec<JsonPropertyValidator>,
}

impl JsonContentValidator {
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let root: Value = match serde_json::from_slice(&ctx.response.body) {
            Ok(root) => root,
            Err(e) => return ValidationResult::fail(format!("Invalid JSON response body: {e}")),
        };

        let failures = self
            .properties
            .iter()
            .filter_map(|property| property.check(&root, ctx.state))
            .collect();
        ValidationResult::from_failures(failures)
    }
}
