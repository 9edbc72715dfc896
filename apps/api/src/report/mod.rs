//! Radiology report pipeline.
//!
//! `prompt_builder::build` turns a request context into model input and
//! `normalizer::normalize` turns whatever the model said back into the fixed
//! report layout. Both are pure; time comes in through `clock`.

pub mod catalog;
pub mod clock;
pub mod context;
pub mod extractor;
pub mod handlers;
pub mod impression;
pub mod normalizer;
pub mod organs;
pub mod prompt_builder;
pub mod prompts;
