use std::io::Read;

use resilient_caller::{
    summary::{
        load_prompt_template, render_prompt, SummaryEndpoint, SummaryRequest, SummaryResponse,
        DEFAULT_PROMPT_TEMPLATE,
    },
    ResilientCaller, RetrySchedule,
};

/// Reads a patch on stdin and prints the endpoint's markdown summary.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let endpoint = SummaryEndpoint::from_env()?;
    let schedule: RetrySchedule = match std::env::var("SUMMARY_RETRY_DELAYS") {
        Ok(raw) => raw.parse()?,
        Err(_) => RetrySchedule::default(),
    };
    let user_id = std::env::var("SUMMARY_USER_ID").unwrap_or_else(|_| "ftsai".to_owned());
    let extra = std::env::var("SUMMARY_EXTRA_INSTRUCTIONS").ok();

    let mut patch = String::new();
    std::io::stdin().read_to_string(&mut patch)?;
    if patch.trim().is_empty() {
        eprintln!("no changes on stdin, nothing to summarize");
        return Ok(());
    }

    let template = match std::env::var("SUMMARY_PROMPT_FILE") {
        Ok(path) => load_prompt_template(path),
        Err(_) => DEFAULT_PROMPT_TEMPLATE.to_owned(),
    };
    let prompt = render_prompt(&template, &patch, extra.as_deref());
    let request = endpoint.request(&SummaryRequest::new(user_id, prompt))?;

    let outcome = ResilientCaller::new().call(&request, &schedule).await;
    eprintln!("{outcome}");

    let reply: SummaryResponse = outcome.json()?;
    println!("{}", reply.markdown());

    Ok(())
}
