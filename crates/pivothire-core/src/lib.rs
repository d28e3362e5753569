//! Types shared by every PivotHire crate that sits behind the HTTP layer

#![allow(clippy::must_use_candidate)]

mod context;
mod error;

pub use context::{RequestContext, SessionUser};
pub use error::HttpError;
