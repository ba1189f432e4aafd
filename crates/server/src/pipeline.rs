use pumpslip_core::ResultPayload;
use pumpslip_extract::{FieldParser, ModelError, ParseError};
use pumpslip_ocr::{
    correct, extension_allowed, prepare_for_ocr_from_bytes, OcrBackend, OcrError, PreprocessError,
};
use pumpslip_places::StationResolver;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

/// Problems with what the caller sent; answered with 400.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("No image file provided")]
    MissingImage,
    #[error("No file selected")]
    NoFileSelected,
    #[error("Invalid file type")]
    InvalidFileType,
    #[error("Could not read the image: {0}")]
    UnreadableImage(#[from] PreprocessError),
    #[error("Malformed upload: {0}")]
    Malformed(String),
    #[error("File too large")]
    TooLarge,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("OCR failed to extract text")]
    Ocr(#[from] OcrError),
    #[error("LLM parsing failed")]
    Parse(ParseError),
    #[error("Language model unavailable")]
    ModelUnavailable(ModelError),
    #[error("OCR worker stopped: {0}")]
    Worker(String),
}

impl From<ParseError> for PipelineError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Model(m) => PipelineError::ModelUnavailable(m),
            other => PipelineError::Parse(other),
        }
    }
}

impl PipelineError {
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            PipelineError::Parse(e) => e.raw_response(),
            _ => None,
        }
    }
}

/// One uploaded file, as received.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reject uploads by name before any bytes are decoded.
pub fn check_file_name(file_name: &str) -> Result<(), InputError> {
    if file_name.trim().is_empty() {
        return Err(InputError::NoFileSelected);
    }
    if !extension_allowed(file_name) {
        return Err(InputError::InvalidFileType);
    }
    Ok(())
}

/// Upload → OCR → correction → field parsing → station lookup → payload.
///
/// Holds only shared, immutable clients; clone it freely across requests.
#[derive(Clone)]
pub struct ReceiptPipeline {
    ocr: Arc<dyn OcrBackend>,
    parser: FieldParser,
    stations: StationResolver,
}

impl ReceiptPipeline {
    pub fn new(ocr: Arc<dyn OcrBackend>, parser: FieldParser, stations: StationResolver) -> Self {
        Self { ocr, parser, stations }
    }

    pub async fn process(&self, upload: Upload) -> Result<ResultPayload, PipelineError> {
        let span = info_span!("receipt", request_id = %Uuid::new_v4(), file = %upload.file_name);
        self.run(upload).instrument(span).await
    }

    async fn run(&self, upload: Upload) -> Result<ResultPayload, PipelineError> {
        check_file_name(&upload.file_name)?;
        debug!(bytes = upload.bytes.len(), "Upload received");

        let ocr = Arc::clone(&self.ocr);
        let span = Span::current();
        let raw_text = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            recognize(ocr.as_ref(), &upload.bytes)
        })
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))??;

        let ocr_text = correct(&raw_text);
        info!(lines = ocr_text.lines().count(), "OCR text ready");

        let parsed = self.parser.parse(&ocr_text).await?;
        let station = self.stations.resolve_receipt(&parsed).await;

        Ok(ResultPayload::assemble(ocr_text, parsed, station))
    }
}

fn recognize(ocr: &dyn OcrBackend, image_bytes: &[u8]) -> Result<String, PipelineError> {
    let prepared = prepare_for_ocr_from_bytes(image_bytes).map_err(InputError::from)?;
    let text = ocr.recognize(&prepared)?;
    if text.trim().is_empty() {
        return Err(OcrError::NoText.into());
    }
    Ok(text)
}
