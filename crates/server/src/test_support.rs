//! Deterministic stand-ins for the OCR engine, the language model and the places service.

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use pumpslip_extract::{CannedModel, FieldParser, LanguageModel};
use pumpslip_ocr::MockRecognizer;
use pumpslip_places::{
    GeocodeHit, LatLng, PlaceCandidate, PlaceDetails, PlacesAccess, PlacesApi, PlacesCredential,
    StationLookupError, StationResolver,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::pipeline::ReceiptPipeline;

/// An 8×8 striped PNG, enough for the image decoder.
pub fn tiny_png() -> Vec<u8> {
    let img = GrayImage::from_fn(8, 8, |x, _| Luma([if x % 2 == 0 { 20 } else { 230 }]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[derive(Default)]
pub struct StubPlaces {
    candidates: Vec<PlaceCandidate>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubPlaces {
    pub fn with_shell() -> Self {
        Self {
            candidates: vec![PlaceCandidate {
                place_id: Some("ChIJshell".into()),
                name: "Shell Κηφισίας".into(),
                formatted_address: Some("Λεωφ. Κηφισίας 100, Αθήνα".into()),
                location: Some(LatLng { lat: 37.98, lng: 23.72 }),
                rating: Some(4.2),
                user_ratings_total: 150,
            }],
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) -> Result<(), StationLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StationLookupError::Http(503));
        }
        Ok(())
    }
}

#[async_trait]
impl PlacesApi for StubPlaces {
    async fn text_search(
        &self,
        _credential: &PlacesCredential,
        _query: &str,
    ) -> Result<Vec<PlaceCandidate>, StationLookupError> {
        self.tick()?;
        Ok(self.candidates.clone())
    }

    async fn place_details(
        &self,
        _credential: &PlacesCredential,
        _place_id: &str,
    ) -> Result<Option<PlaceDetails>, StationLookupError> {
        self.tick()?;
        Ok(None)
    }

    async fn geocode(
        &self,
        _credential: &PlacesCredential,
        _address: &str,
    ) -> Result<Option<GeocodeHit>, StationLookupError> {
        self.tick()?;
        Ok(None)
    }
}

/// Station lookup switched off, any model.
pub fn pipeline_with_model(ocr_text: &str, model: Arc<dyn LanguageModel>) -> ReceiptPipeline {
    ReceiptPipeline::new(
        Arc::new(MockRecognizer::new(ocr_text)),
        FieldParser::new(model),
        StationResolver::new(PlacesAccess::Disabled, Arc::new(StubPlaces::default())),
    )
}

pub fn pipeline_with_stations(
    ocr_text: &str,
    model_reply: &str,
    access: PlacesAccess,
    places: Arc<StubPlaces>,
) -> ReceiptPipeline {
    ReceiptPipeline::new(
        Arc::new(MockRecognizer::new(ocr_text)),
        FieldParser::new(Arc::new(CannedModel::new(model_reply))),
        StationResolver::new(access, places),
    )
}

/// Station lookup switched off.
pub fn pipeline(ocr_text: &str, model_reply: &str) -> ReceiptPipeline {
    pipeline_with_stations(
        ocr_text,
        model_reply,
        PlacesAccess::Disabled,
        Arc::new(StubPlaces::default()),
    )
}
