/// Configures transport behavior of a [`ResilientCaller`](crate::ResilientCaller).
///
/// Retry behavior is not configured here: it travels with each call as a
/// [`RetrySchedule`](crate::RetrySchedule).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds. Expiry is a transport failure.
    ///
    /// `0` disables the per-attempt timeout; only the inner client's own
    /// limits apply.
    pub timeout_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}
