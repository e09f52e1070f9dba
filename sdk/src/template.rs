//! `{name}` template expansion over the case state map.
//!
//! Templates appear in request URLs, header values, and textual bodies.
//! Expansion is a single pass: replacement text is emitted literally and is
//! never rescanned for further markers.

use {crate::state::State, thiserror::Error};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unbound template variable '{0}'")]
    Unbound(String),
}

/// Expand every `{name}` marker from `state`, failing on the first marker
/// whose key is absent.
pub fn expand(template: &str, state: &State) -> Result<String, TemplateError> {
    let (expanded, missing) = expand_lossy(template, state);
    match missing.into_iter().next() {
        None => Ok(expanded),
        Some(name) => Err(TemplateError::Unbound(name)),
    }
}

/// Best-effort expansion: unbound markers are kept literally and their names
/// are reported alongside the result.
///
/// The request executor uses this so a request with a missing binding still
/// goes out (and fails its case) instead of aborting the remaining sequence.
pub fn expand_lossy(template: &str, state: &State) -> (String, Vec<String>) {
    let mut out = String::with_capacity(template.len());
    let mut missing = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(pos) if after.as_bytes()[pos] == b'}' => {
                let name = &after[..pos];
                match state.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        missing.push(name.to_string());
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[pos + 1..];
            }
            // A '{' that never closes (or immediately reopens) is literal text.
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    (out, missing)
}
