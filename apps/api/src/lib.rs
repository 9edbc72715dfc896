//! RadReport API: radiology prompt building and model-output normalization
//! behind an axum service.
//!
//! The report pipeline in [`report`] is pure and usable on its own; the
//! remaining modules wire it to HTTP and a model server.

pub mod config;
pub mod errors;
pub mod llm_client;
pub mod report;
pub mod routes;
pub mod state;
#[cfg(test)]
mod test_support;
