//! HTTP front end for receipt processing: configuration, logging, the per-request
//! pipeline and its axum routes.

pub mod config;
pub mod pipeline;
pub mod routes;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConfigError, OcrEngine, ServerConfig};
pub use pipeline::{InputError, PipelineError, ReceiptPipeline, Upload};
pub use routes::router;
