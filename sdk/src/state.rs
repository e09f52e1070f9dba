//! Per-case scratchpad state.
//!
//! Every test case runs against its own [`State`]: a string-to-string map
//! seeded with the endpoint context, grown by state savers as responses come
//! back, and read by `{name}` template markers (see [`crate::template`]).
//! Nothing leaks across cases; each execution starts from a fresh seed.

use std::collections::BTreeMap;

/// Well-known state keys shared between the engine and catalogs.
pub mod keys {
    /// Base WOPI file URL the run is pointed at.
    pub const WOPI_ENDPOINT: &str = "WopiEndpoint";
    /// Access token for the target file.
    pub const ACCESS_TOKEN: &str = "AccessToken";
    /// Token lifetime in seconds; doubles as the HTTP timeout.
    pub const ACCESS_TOKEN_TTL: &str = "AccessTokenTTL";
    /// Fixture file name, seeded on setup upload.
    pub const FILE: &str = "File";
    /// Fixture extension including the leading dot.
    pub const FILE_EXTENSION: &str = "FileExtension";
    /// Host-facing name of the fixture document.
    pub const BASE_FILE_NAME: &str = "BaseFileName";
    /// When set, `X-WOPI-ProofOld` is computed over this URL instead of the
    /// current request URL (key-rotation cases).
    pub const OLD_ACCESS_TOKEN_URL: &str = "OldAccessTokenUrl";
}

/// Mutable string-to-string map scoped to a single test-case execution.
#[derive(Clone, Debug, Default)]
pub struct State {
    values: BTreeMap<String, String>,
}

impl State {
    /// Seed a fresh map with the endpoint context every case starts from.
    pub fn seeded(endpoint: &str, access_token: &str, access_token_ttl: u64) -> Self {
        let mut state = Self::default();
        state.set(keys::WOPI_ENDPOINT, endpoint);
        state.set(keys::ACCESS_TOKEN, access_token);
        state.set(keys::ACCESS_TOKEN_TTL, access_token_ttl.to_string());
        state
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Snapshot of the current values, for outcome diagnostics.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_state_carries_endpoint_context() {
        let state = State::seeded("http://host/wopi/files/1", "tok", 3600);
        assert_eq!(state.get(keys::WOPI_ENDPOINT), Some("http://host/wopi/files/1"));
        assert_eq!(state.get(keys::ACCESS_TOKEN), Some("tok"));
        assert_eq!(state.get(keys::ACCESS_TOKEN_TTL), Some("3600"));
        assert_eq!(state.get(keys::FILE), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut state = State::default();
        state.set("LockString", "L1");
        state.set("LockString", "L2");
        assert_eq!(state.get("LockString"), Some("L2"));
    }
}
