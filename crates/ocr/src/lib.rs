pub mod correct;
pub mod preprocess;
pub mod recognizer;

pub use correct::correct;
pub use preprocess::{
    extension_allowed, prepare_for_ocr_from_bytes, PreprocessError, ALLOWED_EXTENSIONS,
};
pub use recognizer::{HttpOcrRecognizer, MockRecognizer, OcrBackend, OcrError};
