use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method, Url,
};
use serde::Serialize;

use crate::{CallerError, Result};

/// One logical request: target, headers and an already serialized body.
///
/// The value is immutable once built, so every retry of a call sends exactly
/// the same bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl CallRequest {
    /// Creates a `POST` request to `url` with no headers and an empty body.
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        let raw = url.as_ref().trim();
        let url = Url::parse(raw)
            .map_err(|err| CallerError::InvalidRequest(format!("invalid url '{raw}': {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CallerError::InvalidRequest(format!(
                "unsupported url scheme '{}'",
                url.scheme()
            )));
        }

        Ok(Self {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
        })
    }

    /// Creates a `POST` request whose body is `value` serialized as JSON.
    ///
    /// Serialization happens here, once; `Content-Type` is set to
    /// `application/json`.
    pub fn json<T: Serialize + ?Sized>(url: impl AsRef<str>, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|err| CallerError::InvalidRequest(format!("body serialization: {err}")))?;
        Self::new(url)?
            .header(header::CONTENT_TYPE.as_str(), "application/json")
            .map(|request| request.with_body(body))
    }

    /// Adds or replaces a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| CallerError::InvalidRequest(format!("header name '{name}': {err}")))?;
        let header_value = HeaderValue::from_str(value.as_ref())
            .map_err(|err| CallerError::InvalidRequest(format!("header '{name}' value: {err}")))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Adds every `(name, value)` pair; later duplicates win.
    pub fn headers<I, K, V>(self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .try_fold(self, |request, (name, value)| request.header(name, value))
    }

    /// Replaces the body with opaque bytes.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Overrides the HTTP method (default `POST`).
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::CallRequest;
    use crate::CallerError;

    #[test]
    fn new_defaults_to_post_with_empty_body() {
        let request = CallRequest::new("https://api.example.com/v1/api").expect("valid url");
        assert_eq!(request.method(), &Method::POST);
        assert!(request.body().is_empty());
        assert!(request.header_map().is_empty());
    }

    #[test]
    fn rejects_unparseable_and_non_http_urls() {
        let err = CallRequest::new("not a url").expect_err("must fail");
        assert!(matches!(err, CallerError::InvalidRequest(_)));

        let err = CallRequest::new("ftp://example.com/file").expect_err("must fail");
        assert!(matches!(err, CallerError::InvalidRequest(msg) if msg.contains("ftp")));
    }

    #[test]
    fn json_sets_content_type_and_serializes_once() {
        let request = CallRequest::json(
            "https://api.example.com/v1/api",
            &json!({ "user_id": "u1", "prompts": ["hi"] }),
        )
        .expect("must build");

        assert_eq!(
            request.header_map()["content-type"].to_str().ok(),
            Some("application/json")
        );
        let decoded: serde_json::Value =
            serde_json::from_slice(request.body()).expect("body is json");
        assert_eq!(decoded["user_id"], "u1");
    }

    #[test]
    fn header_replaces_existing_value() {
        let request = CallRequest::new("http://localhost/")
            .and_then(|r| r.headers([("x-api-key", "first"), ("X-Api-Key", "second")]))
            .expect("valid headers");
        assert_eq!(request.header_map().len(), 1);
        assert_eq!(
            request.header_map()["x-api-key"].to_str().ok(),
            Some("second")
        );
    }

    #[test]
    fn rejects_invalid_header_name_and_value() {
        let base = CallRequest::new("http://localhost/").expect("valid url");
        assert!(matches!(
            base.clone().header("bad header", "v"),
            Err(CallerError::InvalidRequest(_))
        ));
        assert!(matches!(
            base.header("x-ok", "line\nbreak"),
            Err(CallerError::InvalidRequest(_))
        ));
    }
}
