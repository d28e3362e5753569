//! Upstream wire formats

pub mod openai;
