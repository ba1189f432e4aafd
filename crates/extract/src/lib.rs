//! Turns corrected OCR text into a [`pumpslip_core::ParsedReceipt`] by asking a
//! language model for JSON and decoding whatever comes back leniently.

pub mod decode;
pub mod json;
pub mod model;
pub mod parser;
pub mod prompt;

pub use model::{CannedModel, LanguageModel, ModelError, OllamaClient, OllamaOptions};
pub use parser::{FieldParser, ParseError};
