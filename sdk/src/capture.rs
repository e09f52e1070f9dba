//! Captured HTTP responses.

use std::time::Duration;

/// Everything the validator algebra needs from one HTTP exchange.
///
/// Headers keep their arrival order and are looked up case-insensitively
/// with multi-value semantics.
#[derive(Clone, Debug)]
pub struct ResponseCapture {
    pub status_code: u16,
    pub status_text: String,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub elapsed: Duration,
}

impl ResponseCapture {
    pub fn new(
        status_code: u16,
        status_text: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        elapsed: Duration,
    ) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            headers,
            body,
            elapsed,
        }
    }

    /// First value of `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of `name` in arrival order.
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// UTF-8 view of the body, when it is textual.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(headers: Vec<(String, String)>) -> ResponseCapture {
        ResponseCapture::new(200, "OK", headers, b"body".to_vec(), Duration::ZERO)
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = capture(vec![("X-WOPI-Lock".to_string(), "L1".to_string())]);
        assert_eq!(response.header("x-wopi-lock"), Some("L1"));
        assert_eq!(response.header("X-WOPI-LOCK"), Some("L1"));
        assert_eq!(response.header("X-WOPI-ItemVersion"), None);
    }

    #[test]
    fn multi_value_headers_keep_order() {
        let response = capture(vec![
            ("Set-Cookie".to_string(), "a=1".to_string()),
            ("set-cookie".to_string(), "b=2".to_string()),
        ]);
        assert_eq!(response.header("Set-Cookie"), Some("a=1"));
        assert_eq!(response.header_all("SET-COOKIE"), vec!["a=1", "b=2"]);
    }

    #[test]
    fn body_text_is_none_for_binary_bodies() {
        let mut response = capture(Vec::new());
        response.body = vec![0xFF, 0xFE, 0x00];
        assert_eq!(response.body_text(), None);
    }
}
