#![forbid(unsafe_code)]

//! Channel engagement analytics: fetch every video a channel has published,
//! attach its view/like/comment counters, derive engagement ratios and roll
//! the counters up by month.
//!
//! [`pipeline::run`] is the entry point; everything it needs from the
//! platform goes through [`api::VideoPlatform`].

pub mod aggregate;
pub mod api;
pub mod catalog;
pub mod config;
pub mod correlation;
pub mod error;
pub mod join;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use error::UpstreamError;
pub use pipeline::{PipelineReport, run};
