//! State savers: extract values from a response into the case state map.
//!
//! Savers look like validators but have a different contract: they write
//! state and never fail the request on their own. A saver that cannot
//! extract (missing header, bad JSON) logs a warning and leaves its key
//! untouched.

use {
    crate::{capture::ResponseCapture, state::State, validators::json},
    base64::{engine::general_purpose::STANDARD as BASE64, Engine as _},
    serde_json::Value,
};

#[derive(Clone, Debug)]
pub enum StateSaver {
    /// Copy a response header value into state under `key`.
    ResponseHeader { header: String, key: String },
    /// Copy the textual form of a JSON-path-selected token into state.
    JsonProperty { path: String, key: String },
    /// Copy the raw body, either as text or base-64.
    ResponseBody { key: String, as_base64: bool },
    /// Unconditional literal set.
    Literal { key: String, value: String },
}

impl StateSaver {
    pub fn apply(&self, response: &ResponseCapture, state: &mut State) {
        match self {
            Self::ResponseHeader { header, key } => match response.header(header) {
                Some(value) => state.set(key.clone(), value),
                None => log::warn!("state saver: header '{header}' absent, '{key}' left unset"),
            },
            Self::JsonProperty { path, key } => {
                let root: Value = match serde_json::from_slice(&response.body) {
                    Ok(root) => root,
                    Err(e) => {
                        log::warn!("state saver: body is not JSON ({e}), '{key}' left unset");
                        return;
                    }
                };
                match json::select_first(&root, path) {
                    Some(token) => state.set(key.clone(), json::string_form(token)),
                    None => {
                        log::warn!("state saver: no token at '{path}', '{key}' left unset");
                    }
                }
            }
            Self::ResponseBody { key, as_base64 } => {
                if *as_base64 {
                    state.set(key.clone(), BASE64.encode(&response.body));
                } else {
                    match response.body_text() {
                        Some(text) => state.set(key.clone(), text),
                        None => {
                            log::warn!("state saver: body is not UTF-8, '{key}' left unset");
                        }
                    }
                }
            }
            Self::Literal { key, value } => state.set(key.clone(), value.clone()),
        }
    }
}
