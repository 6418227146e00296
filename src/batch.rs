use std::{
    fmt,
    time::{Duration, Instant},
};

use tokio::task::JoinSet;

use crate::{CallOutcome, CallRequest, ResilientCaller, RetrySchedule};

/// How [`run_batch`] schedules its calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Each call starts after the previous one has finished.
    #[default]
    Sequential,
    /// All calls start at once, one task each.
    Parallel,
}

/// Outcomes of a batch, in submission order, and its wall-clock duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<CallOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn successes(&self) -> usize {
        self.count(|outcome| matches!(outcome, CallOutcome::Success { .. }))
    }

    pub fn rate_limited(&self) -> usize {
        self.count(|outcome| matches!(outcome, CallOutcome::RateLimited { .. }))
    }

    pub fn http_errors(&self) -> usize {
        self.count(|outcome| matches!(outcome, CallOutcome::HttpError { .. }))
    }

    pub fn transport_errors(&self) -> usize {
        self.count(|outcome| matches!(outcome, CallOutcome::TransportError { .. }))
    }

    fn count(&self, pred: impl Fn(&CallOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| pred(outcome)).count()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} call(s) in {:.2}s: {} ok, {} rate limited, {} http error, {} transport error",
            self.outcomes.len(),
            self.elapsed.as_secs_f64(),
            self.successes(),
            self.rate_limited(),
            self.http_errors(),
            self.transport_errors(),
        )
    }
}

/// Issues the same logical call `count` times.
///
/// Every call gets its own pass through `schedule`; calls share nothing but
/// the connection pool of `caller`.
pub async fn run_batch(
    caller: &ResilientCaller,
    request: &CallRequest,
    schedule: &RetrySchedule,
    count: usize,
    mode: BatchMode,
) -> BatchReport {
    let started = Instant::now();

    let outcomes = match mode {
        BatchMode::Sequential => {
            let mut outcomes = Vec::with_capacity(count);
            for _ in 0..count {
                #[cfg(feature = "tracing")]
                tracing::debug!(call = outcomes.len() + 1, count, "starting batch call");
                outcomes.push(caller.call(request, schedule).await);
            }
            outcomes
        }
        BatchMode::Parallel => run_parallel(caller, request, schedule, count).await,
    };

    let report = BatchReport {
        outcomes,
        elapsed: started.elapsed(),
    };

    #[cfg(feature = "tracing")]
    tracing::info!(%report, "batch finished");

    report
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
async fn run_parallel(
    caller: &ResilientCaller,
    request: &CallRequest,
    schedule: &RetrySchedule,
    count: usize,
) -> Vec<CallOutcome> {
    let mut tasks = JoinSet::new();
    for index in 0..count {
        let caller = caller.clone();
        let request = request.clone();
        let schedule = schedule.clone();
        tasks.spawn(async move { (index, caller.call(&request, &schedule).await) });
    }

    let mut slots: Vec<Option<CallOutcome>> = vec![None; count];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %err, "batch task did not complete");
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| CallOutcome::TransportError {
                message: "call task aborted before completing".to_owned(),
            })
        })
        .collect()
}
