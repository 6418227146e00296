use std::{slice, str::FromStr, time::Duration};

use crate::CallerError;

/// Ordered delays waited before each retry of a rate-limited call.
///
/// The schedule is fixed at construction. A call with `n` delays makes at most
/// `n + 1` attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    pub fn new(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            delays: delays.into_iter().collect(),
        }
    }

    /// Schedule with no retries: a 429 ends the call after one attempt.
    pub fn none() -> Self {
        Self { delays: Vec::new() }
    }

    pub fn from_secs(secs: impl IntoIterator<Item = u64>) -> Self {
        Self::new(secs.into_iter().map(Duration::from_secs))
    }

    pub fn from_millis(millis: impl IntoIterator<Item = u64>) -> Self {
        Self::new(millis.into_iter().map(Duration::from_millis))
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Upper bound on attempts a single call can make under this schedule.
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Sum of every delay; the longest a call can spend waiting.
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }

    pub fn iter(&self) -> slice::Iter<'_, Duration> {
        self.delays.iter()
    }
}

impl Default for RetrySchedule {
    /// 5s, 10s, 20s, 60s.
    fn default() -> Self {
        Self::from_secs([5, 10, 20, 60])
    }
}

impl<'a> IntoIterator for &'a RetrySchedule {
    type Item = &'a Duration;
    type IntoIter = slice::Iter<'a, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parses comma-separated whole seconds, e.g. `"5, 10, 20, 60"`.
///
/// A blank string is the empty schedule.
impl FromStr for RetrySchedule {
    type Err = CallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::none());
        }

        s.split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<u64>().map_err(|err| {
                    CallerError::Config(format!("invalid retry delay '{part}': {err}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RetrySchedule;
    use crate::CallerError;

    #[test]
    fn default_is_the_rate_limit_ladder() {
        let schedule = RetrySchedule::default();
        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule.delays()[0], Duration::from_secs(5));
        assert_eq!(schedule.delays()[3], Duration::from_secs(60));
        assert_eq!(schedule.max_attempts(), 5);
        assert_eq!(schedule.total_delay(), Duration::from_secs(95));
    }

    #[test]
    fn none_allows_a_single_attempt() {
        let schedule = RetrySchedule::none();
        assert!(schedule.is_empty());
        assert_eq!(schedule.max_attempts(), 1);
        assert_eq!(schedule.total_delay(), Duration::ZERO);
    }

    #[test]
    fn parses_comma_separated_seconds() {
        let schedule: RetrySchedule = " 5, 10 ,20".parse().expect("must parse");
        assert_eq!(schedule, RetrySchedule::from_secs([5, 10, 20]));
    }

    #[test]
    fn blank_string_parses_to_empty_schedule() {
        let schedule: RetrySchedule = "  ".parse().expect("must parse");
        assert!(schedule.is_empty());
    }

    #[test]
    fn rejects_non_numeric_delay() {
        let err = "5,soon".parse::<RetrySchedule>().expect_err("must fail");
        assert!(matches!(err, CallerError::Config(msg) if msg.contains("soon")));
    }

    #[test]
    fn preserves_order() {
        let schedule = RetrySchedule::from_millis([30, 10, 20]);
        let order: Vec<u128> = schedule.iter().map(Duration::as_millis).collect();
        assert_eq!(order, vec![30, 10, 20]);
    }
}
