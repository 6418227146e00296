//! `resilient-caller` sends one logical HTTP request to a remote endpoint and
//! retries it on rate-limiting (HTTP 429) following a fixed delay schedule.
//!
//! Entry points:
//! - [`ResilientCaller::call`] / [`call`]
//! - [`run_batch`] for repeating a call sequentially or in parallel
//! - [`summary`] for the summarization endpoint's request and response bodies
//!
//! Every call ends in exactly one [`CallOutcome`]; failures are returned as
//! data, never raised.

mod batch;
mod caller;
mod error;
mod options;
mod outcome;
mod request;
mod schedule;
pub mod summary;

pub use batch::{run_batch, BatchMode, BatchReport};
pub use caller::{call, ResilientCaller};
pub use error::CallerError;
pub use options::ClientOptions;
pub use outcome::CallOutcome;
pub use request::CallRequest;
pub use schedule::RetrySchedule;

pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, CallerError>;
