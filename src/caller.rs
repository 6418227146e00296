use std::{error::Error as StdError, time::Duration};

use reqwest::StatusCode;
use tokio::time::sleep;

use crate::{CallOutcome, CallRequest, ClientOptions, RetrySchedule};

/// Sends a request once and retries it only while the endpoint answers 429.
///
/// Cloning is cheap; clones share the connection pool of the inner
/// `reqwest::Client`.
#[derive(Clone, Debug, Default)]
pub struct ResilientCaller {
    http: reqwest::Client,
    options: ClientOptions,
}

impl ResilientCaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured HTTP client (proxies, TLS roots, default headers).
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self {
            http,
            options: ClientOptions::default(),
        }
    }

    /// Applies client options such as the per-attempt timeout.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Performs one logical call.
    ///
    /// - 2xx ends the call with [`CallOutcome::Success`].
    /// - 429 waits for the next delay of `schedule` and re-sends the identical
    ///   request; once the schedule is spent the call ends with
    ///   [`CallOutcome::RateLimited`].
    /// - Any other status ends the call with [`CallOutcome::HttpError`], even
    ///   after earlier 429 retries.
    /// - A transport failure ends the call with [`CallOutcome::TransportError`].
    ///
    /// Attempts are strictly sequential. Waiting suspends the task without
    /// blocking the runtime thread.
    pub async fn call(&self, request: &CallRequest, schedule: &RetrySchedule) -> CallOutcome {
        let mut delays = schedule.iter();
        let mut attempts = 0usize;

        loop {
            attempts += 1;

            let (status, body) = match self.send_once(request).await {
                Ok(response) => response,
                Err(message) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempt = attempts, %message, "transport failure");
                    return CallOutcome::TransportError { message };
                }
            };

            if status.is_success() {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt = attempts, status = status.as_u16(), "call succeeded");
                return CallOutcome::Success {
                    status: status.as_u16(),
                    body,
                };
            }

            if status != StatusCode::TOO_MANY_REQUESTS {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempt = attempts, status = status.as_u16(), "call failed");
                return CallOutcome::HttpError {
                    status: status.as_u16(),
                    body,
                };
            }

            match delays.next() {
                Some(delay) => self.wait_before_retry(attempts, *delay).await,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempts, "retry schedule exhausted while rate limited");
                    return CallOutcome::RateLimited { attempts };
                }
            }
        }
    }

    async fn send_once(&self, request: &CallRequest) -> Result<(StatusCode, Vec<u8>), String> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url().clone())
            .headers(request.header_map().clone())
            .body(request.body().to_vec());
        if self.options.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(self.options.timeout_ms));
        }

        let response = builder
            .send()
            .await
            .map_err(|err| describe_transport_error(&err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| describe_transport_error(&err))?;
        Ok((status, body.to_vec()))
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    async fn wait_before_retry(&self, attempt: usize, delay: Duration) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "rate limited, retrying after delay"
        );

        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Performs one logical call with a default [`ResilientCaller`].
///
/// Prefer a shared caller when issuing many calls so connections are reused.
pub async fn call(request: &CallRequest, schedule: &RetrySchedule) -> CallOutcome {
    ResilientCaller::new().call(request, schedule).await
}

/// Flattens a reqwest error and its source chain into one message.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_body() || err.is_decode() {
        "body"
    } else {
        "request"
    };

    let mut message = format!("{kind}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::ResilientCaller;
    use crate::ClientOptions;

    #[test]
    fn with_options_replaces_defaults() {
        let caller = ResilientCaller::new().with_options(ClientOptions { timeout_ms: 250 });
        assert_eq!(caller.options().timeout_ms, 250);
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(ResilientCaller::new().options().timeout_ms, 30_000);
    }
}
