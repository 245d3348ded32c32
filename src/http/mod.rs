//! HTTP client module with upstream status validation.

mod client;

pub use client::{check_status, HttpClient, USER_AGENT};
