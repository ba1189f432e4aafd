use anyhow::{Context, Result};
use pumpslip_extract::{FieldParser, OllamaClient, OllamaOptions};
use pumpslip_ocr::{HttpOcrRecognizer, OcrBackend};
use pumpslip_places::{GooglePlacesClient, PlacesAccess, StationResolver};
use pumpslip_server::{router, telemetry, OcrEngine, ReceiptPipeline, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    telemetry::init_subscriber("pumpslip", "info");
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = ServerConfig::load().context("failed to load configuration")?;

    let ocr = ocr_backend(&config)?;
    let model = OllamaClient::new(OllamaOptions {
        base_url: config.ollama_base_url.clone(),
        model: config.model.clone(),
        timeout: config.llm_timeout(),
        ..OllamaOptions::default()
    })
    .context("failed to build language model client")?;
    let places = GooglePlacesClient::new(config.places_timeout(), config.places_language.clone())
        .context("failed to build places client")?;
    let stations = StationResolver::new(
        PlacesAccess::from_key(config.places_api_key.clone()),
        Arc::new(places),
    );
    if !stations.is_enabled() {
        warn!("GOOGLE_PLACES_API_KEY not set; station lookup disabled");
    }

    let pipeline = ReceiptPipeline::new(ocr, FieldParser::new(Arc::new(model)), stations);
    let app = router(pipeline, config.max_upload_bytes);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        addr = %config.bind,
        model = %config.model,
        ocr_engine = ?config.ocr_engine,
        "Receipt server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

fn ocr_backend(config: &ServerConfig) -> Result<Arc<dyn OcrBackend>> {
    match config.ocr_engine {
        OcrEngine::Http => {
            let recognizer = HttpOcrRecognizer::new(
                config.ocr_url.clone(),
                config.ocr_timeout(),
                Handle::current(),
            )
            .context("failed to build OCR client")?;
            info!(url = recognizer.base_url(), "Using OCR sidecar");
            Ok(Arc::new(recognizer))
        }
        #[cfg(feature = "tesseract")]
        OcrEngine::Tesseract => {
            use pumpslip_ocr::recognizer::tesseract_backend::TesseractRecognizer;
            info!(lang = %config.ocr_lang, "Using in-process Tesseract");
            Ok(Arc::new(TesseractRecognizer::new(config.tessdata_path.clone(), &config.ocr_lang)))
        }
        #[cfg(not(feature = "tesseract"))]
        OcrEngine::Tesseract => Err(pumpslip_ocr::OcrError::NotAvailable.into()),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
