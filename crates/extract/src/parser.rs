use pumpslip_core::ParsedReceipt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::decode::receipt_from_object;
use crate::json::first_json_object;
use crate::model::{LanguageModel, ModelError};
use crate::prompt::build_prompt;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("language model response contained no JSON object")]
    NoJsonObject { raw_response: String },
    #[error("language model JSON matched no receipt fields")]
    UnrecognizedShape { raw_response: String },
}

impl ParseError {
    /// The model's reply, untouched, when the failure happened after it answered.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ParseError::Model(_) => None,
            ParseError::NoJsonObject { raw_response }
            | ParseError::UnrecognizedShape { raw_response } => Some(raw_response),
        }
    }
}

/// Prompt → one model call → JSON extraction → lenient decode.
///
/// There is no retry: one upstream call per receipt.
#[derive(Clone)]
pub struct FieldParser {
    model: Arc<dyn LanguageModel>,
}

impl FieldParser {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn parse(&self, corrected_text: &str) -> Result<ParsedReceipt, ParseError> {
        let prompt = build_prompt(corrected_text);
        let raw_response = self.model.complete(&prompt).await?;
        debug!(model = self.model.name(), chars = raw_response.len(), "Model answered");

        let Some(object) = first_json_object(&raw_response) else {
            warn!(model = self.model.name(), "No JSON object in model response");
            return Err(ParseError::NoJsonObject { raw_response });
        };

        let Some(receipt) = receipt_from_object(&object) else {
            warn!(model = self.model.name(), "Model JSON carried no receipt keys");
            return Err(ParseError::UnrecognizedShape { raw_response });
        };

        info!(
            merchant = receipt.merchant.as_deref().unwrap_or("-"),
            has_total = receipt.total.is_some(),
            items = receipt.items.len(),
            "Receipt fields parsed"
        );
        Ok(receipt)
    }
}
