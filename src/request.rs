//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::Method;

/// An incoming HTTP request, as seen by handlers and middlewares.
///
/// Host serving loops build one per exchange, either directly or from an
/// `http::Request<Bytes>`:
///
/// ```rust
/// use tsu_controller::Request;
///
/// let req = Request::new(http::Method::POST, "/echo")
///     .with_header("content-type", "text/plain")
///     .with_body("hello");
///
/// assert_eq!(req.header("Content-Type"), Some("text/plain"));
/// assert_eq!(req.body(), b"hello");
/// ```
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`. Parameters are filled in by [`Router::handle`](crate::Router::handle).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Header values that are not valid UTF-8 are converted lossily.
impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        let headers = parts.headers.iter()
            .map(|(k, v)| (k.as_str().to_owned(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers,
            body,
            params: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_http_request() {
        let http_req = http::Request::builder()
            .method(Method::PUT)
            .uri("/users/7?verbose=1")
            .header("x-request-id", "abc")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let req = Request::from(http_req);
        assert_eq!(*req.method(), Method::PUT);
        assert_eq!(req.path(), "/users/7");
        assert_eq!(req.header("X-Request-Id"), Some("abc"));
        assert_eq!(req.body(), b"{}");
        assert_eq!(req.param("id"), None);
    }
}
