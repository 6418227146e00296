use resilient_caller::{
    run_batch,
    summary::{SummaryEndpoint, SummaryRequest},
    BatchMode, ResilientCaller, RetrySchedule,
};

/// Calls the summarization endpoint `LOAD_CALL_COUNT` times and prints a report.
///
/// Set `LOAD_PARALLEL=1` to fire every call at once.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let endpoint = SummaryEndpoint::from_env()?;
    let count: usize = std::env::var("LOAD_CALL_COUNT")
        .unwrap_or_else(|_| "100".to_owned())
        .parse()?;
    let mode = match std::env::var("LOAD_PARALLEL").as_deref() {
        Ok("1") | Ok("true") => BatchMode::Parallel,
        _ => BatchMode::Sequential,
    };

    let request = endpoint.request(&SummaryRequest::new(
        "ftsai",
        "what should a good unit test review include?",
    ))?;

    println!("preparing to call {} {count} time(s) ({mode:?})", endpoint.url());
    let report = run_batch(
        &ResilientCaller::new(),
        &request,
        &RetrySchedule::none(),
        count,
        mode,
    )
    .await;

    for (index, outcome) in report.outcomes.iter().enumerate() {
        println!("#{}: {outcome}", index + 1);
    }
    println!("{report}");

    Ok(())
}
