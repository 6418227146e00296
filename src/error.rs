/// Error type returned by this crate.
///
/// A [`call`](crate::ResilientCaller::call) never fails with this type; its
/// failures are reported through [`CallOutcome`](crate::CallOutcome). The
/// `RateLimited`, `Http` and `Transport` variants exist only so an outcome
/// can be escalated with [`CallOutcome::into_result`](crate::CallOutcome::into_result).
#[derive(Debug, thiserror::Error)]
pub enum CallerError {
    /// URL, header name or header value rejected while building a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),
    /// A success body that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// Endpoint kept answering 429 until the retry schedule ran out.
    #[error("rate limited after {attempts} attempt(s)")]
    RateLimited { attempts: usize },
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {}", String::from_utf8_lossy(body))]
    Http { status: u16, body: Vec<u8> },
    /// No response could be obtained.
    #[error("transport error: {0}")]
    Transport(String),
}
