// src/lib.rs

pub mod extract;
pub mod http;
pub mod roster;
pub mod report;
pub mod eventbus;
pub mod platforms;
pub mod services;
pub mod tasks;
pub mod test_utils;

pub use rustwatch_common::error::Error;
pub use http::{HttpProfileFetcher, BATTLEMETRICS_PLAYERS_URL, DEFAULT_FETCH_TIMEOUT};
pub use roster::{AddOutcome, RosterStore};
