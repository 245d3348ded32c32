//! Core backends of the releases API: typed access to release, asset
//! and contributor data of one organization on its hosting provider,
//! the legacy flat aggregate contract on top of it, and a scraping
//! backend for app-listing metadata. An embedding server supplies
//! routing, caching and authentication around this crate.

pub mod appinfo;
pub mod backend;
pub mod compat;
pub mod config;
pub mod error;
pub mod http;
