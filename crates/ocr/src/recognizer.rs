use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR found no text in the image")]
    NoText,
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return the recognized text,
/// one recognized line per `\n`-separated line.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string — useful for exercising the receipt pipeline
/// without an OCR engine running.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── HTTP sidecar backend ──────────────────────────────────────────────────────

pub const DEFAULT_OCR_URL: &str = "http://127.0.0.1:8866";

#[derive(Deserialize)]
struct SidecarResponse {
    #[serde(default)]
    lines: Vec<String>,
}

/// Talks to an OCR sidecar process (e.g. a PaddleOCR server loaded with the Greek
/// model) over HTTP: `POST {base_url}/ocr` with the image as the request body,
/// answered by `{"lines": [...]}`.
///
/// `recognize` blocks on `runtime`, so it must be called from outside the runtime's
/// worker threads (`spawn_blocking`, or a plain thread), and `runtime` must be a
/// multi-thread runtime whose workers drive the I/O.
pub struct HttpOcrRecognizer {
    client: reqwest::Client,
    base_url: String,
    runtime: Handle,
}

impl HttpOcrRecognizer {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        runtime: Handle,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::Engine(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl OcrBackend for HttpOcrRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let request = self
            .client
            .post(format!("{}/ocr", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image_bytes.to_vec());

        let lines = self.runtime.block_on(async move {
            let response = request
                .send()
                .await
                .map_err(|e| OcrError::Engine(format!("OCR sidecar unreachable: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(OcrError::Engine(format!("OCR sidecar returned {status}: {body}")));
            }

            response
                .json::<SidecarResponse>()
                .await
                .map(|r| r.lines)
                .map_err(|e| OcrError::Engine(format!("invalid OCR sidecar response: {e}")))
        })?;

        tracing::debug!(lines = lines.len(), "OCR sidecar responded");
        join_lines(lines)
    }
}

/// Drop blank lines and join the rest; an image with no text is an error.
pub(crate) fn join_lines<I, S>(lines: I) -> Result<String, OcrError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let kept: Vec<String> = lines
        .into_iter()
        .map(|l| l.as_ref().trim_end().to_string())
        .filter(|l| !l.trim().is_empty())
        .collect();
    if kept.is_empty() {
        return Err(OcrError::NoText);
    }
    Ok(kept.join("\n"))
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

/// Greek first, English as the fallback script for brand names.
pub const DEFAULT_TESSERACT_LANG: &str = "ell+eng";

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{join_lines, OcrBackend, OcrError};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            join_lines(text.lines())
        }
    }
}
