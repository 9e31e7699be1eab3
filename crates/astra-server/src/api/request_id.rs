//! Request correlation ids.
//!
//! The mobile client may send its own `x-request-id`; anything unusable is
//! replaced with a fresh v4 UUID. The id is attached to the request, to the
//! `http` tracing span every handler log line lands in, and to the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest caller-supplied id we keep.
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Accept the caller's id when it is short and made of token characters.
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(&REQUEST_ID_HEADER)?.to_str().ok()?.trim();
        let usable = !raw.is_empty()
            && raw.len() <= MAX_REQUEST_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'));
        usable.then(|| Self(raw.to_string()))
    }

    fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub async fn ensure_request_id(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_headers(request.headers()).unwrap_or_else(RequestId::generate);
    let span = tracing::info_span!(
        "http",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path()
    );
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).instrument(span).await;
    // Ids are restricted to token characters, so this never fails.
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn keeps_well_formed_caller_ids() {
        let id = RequestId::from_headers(&headers("  app-42.retry:1 ")).unwrap();
        assert_eq!(id.as_str(), "app-42.retry:1");
    }

    #[test]
    fn rejects_unusable_caller_ids() {
        assert!(RequestId::from_headers(&HeaderMap::new()).is_none());
        assert!(RequestId::from_headers(&headers("   ")).is_none());
        assert!(RequestId::from_headers(&headers("has space")).is_none());
        assert!(RequestId::from_headers(&headers(&"a".repeat(129))).is_none());
    }

    #[test]
    fn generated_ids_are_uuids() {
        let id = RequestId::generate();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }
}
