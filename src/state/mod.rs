//! State module for tracking run progress
//!
//! This module provides the values that flow through a mapping run.
//!
//! # Components
//!
//! - `FetchStatus`: Outcome classification of a single fetch
//! - `ContentSignal`: The title/heading/description/excerpt gathered for one URL
//! - `Credentials`: Optional basic-auth pair shared by all fetches in a run
//! - `RunState`: Everything one run accumulates, reset at the start of the next

mod content_signal;
mod credentials;
mod fetch_status;
mod run_state;

// Re-export main types
pub use content_signal::ContentSignal;
pub use credentials::Credentials;
pub use fetch_status::FetchStatus;
pub use run_state::{CrawlSide, RunState};
