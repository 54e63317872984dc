//! Fusion Engine
//!
//! Multi-provider AI fusion service for the Emma dashboard backend: fans a
//! client analysis out to several AI providers concurrently and merges their
//! responses into one ranked, deduplicated consensus result.

pub mod handlers;
pub mod models;
pub mod services;
