use std::fmt;

use serde::de::DeserializeOwned;

use crate::{CallerError, Result};

/// Terminal result of one logical call.
///
/// Response bodies are kept as the exact bytes the server sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// A 2xx response.
    Success { status: u16, body: Vec<u8> },
    /// Every attempt was answered with 429 and the schedule ran out.
    RateLimited {
        /// Total attempts made, initial one included.
        attempts: usize,
    },
    /// Any other non-2xx status. Never retried.
    HttpError { status: u16, body: Vec<u8> },
    /// No usable response: connect failure, timeout, broken body.
    TransportError { message: String },
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Status of the final response, when one was received.
    ///
    /// `RateLimited` reports 429.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } | Self::HttpError { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::TransportError { .. } => None,
        }
    }

    /// Raw body of the final response, for `Success` and `HttpError`.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Success { body, .. } | Self::HttpError { body, .. } => Some(body),
            Self::RateLimited { .. } | Self::TransportError { .. } => None,
        }
    }

    /// Body decoded as UTF-8.
    ///
    /// Outcomes without a body yield `""`.
    pub fn body_text(&self) -> Result<&str> {
        std::str::from_utf8(self.body().unwrap_or_default())
            .map_err(|err| CallerError::Decode(format!("response body is not UTF-8: {err}")))
    }

    /// Stable lowercase label, suitable for log fields and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::RateLimited { .. } => "rate_limited",
            Self::HttpError { .. } => "http_error",
            Self::TransportError { .. } => "transport_error",
        }
    }

    /// Converts a failure outcome into a [`CallerError`] for `?` propagation.
    pub fn into_result(self) -> Result<(u16, Vec<u8>)> {
        match self {
            Self::Success { status, body } => Ok((status, body)),
            Self::RateLimited { attempts } => Err(CallerError::RateLimited { attempts }),
            Self::HttpError { status, body } => Err(CallerError::Http { status, body }),
            Self::TransportError { message } => Err(CallerError::Transport(message)),
        }
    }

    /// Decodes a success body as JSON.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        let (_, body) = self.into_result()?;
        serde_json::from_slice(&body).map_err(|err| {
            CallerError::Decode(format!(
                "invalid response JSON: {err}; body: {}",
                String::from_utf8_lossy(&body)
            ))
        })
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status, body } => {
                write!(f, "success {status} ({} byte body)", body.len())
            }
            Self::RateLimited { attempts } => {
                write!(f, "rate limited after {attempts} attempt(s)")
            }
            Self::HttpError { status, body } => {
                write!(f, "http error {status}: {}", String::from_utf8_lossy(body))
            }
            Self::TransportError { message } => write!(f, "transport error: {message}"),
        }
    }
}
