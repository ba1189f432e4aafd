use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::access::PlacesCredential;

#[derive(Debug, Error)]
pub enum StationLookupError {
    #[error("places request failed: {0}")]
    Transport(String),
    #[error("places service returned HTTP {0}")]
    Http(u16),
    #[error("places service answered {status}: {message}")]
    Service { status: String, message: String },
    #[error("places response could not be read: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// One text-search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub place_id: Option<String>,
    pub name: String,
    pub formatted_address: Option<String>,
    pub location: Option<LatLng>,
    pub rating: Option<f64>,
    pub user_ratings_total: u64,
}

/// Extra facts from a place-details lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDetails {
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Vec<String>,
    pub editorial_summary: Option<String>,
    /// Every result field whose name hints at fuel or prices, verbatim.
    pub fuel_price_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
    pub location: Option<LatLng>,
}

/// The places service as the resolver sees it.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Text search restricted to gas stations; results in relevance order.
    async fn text_search(
        &self,
        credential: &PlacesCredential,
        query: &str,
    ) -> Result<Vec<PlaceCandidate>, StationLookupError>;

    async fn place_details(
        &self,
        credential: &PlacesCredential,
        place_id: &str,
    ) -> Result<Option<PlaceDetails>, StationLookupError>;

    async fn geocode(
        &self,
        credential: &PlacesCredential,
        address: &str,
    ) -> Result<Option<GeocodeHit>, StationLookupError>;
}

// ── Google Places ─────────────────────────────────────────────────────────────

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DETAILS_FIELDS: &str = concat!(
    "name,formatted_phone_number,opening_hours,website,price_level,",
    "current_opening_hours,editorial_summary,reviews"
);
const FUEL_TERMS: &[&str] = &["fuel", "price", "gas", "petrol", "diesel", "unleaded"];

#[derive(Deserialize)]
struct SearchEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<WirePlace>,
}

#[derive(Deserialize)]
struct DetailsEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct WirePlace {
    place_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<WireGeometry>,
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u64>,
}

#[derive(Deserialize)]
struct WireGeometry {
    location: Option<LatLng>,
}

/// Google Places (legacy JSON web services) over reqwest.
pub struct GooglePlacesClient {
    client: reqwest::Client,
    language: String,
}

impl GooglePlacesClient {
    pub fn new(timeout: Duration, language: impl Into<String>) -> Result<Self, StationLookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StationLookupError::Transport(e.to_string()))?;
        Ok(Self { client, language: language.into() })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, StationLookupError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| StationLookupError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StationLookupError::Http(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| StationLookupError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn text_search(
        &self,
        credential: &PlacesCredential,
        query: &str,
    ) -> Result<Vec<PlaceCandidate>, StationLookupError> {
        debug!(query, "Places text search");
        let envelope: SearchEnvelope = self
            .get_json(
                TEXT_SEARCH_URL,
                &[
                    ("query", query),
                    ("key", credential.expose()),
                    ("type", "gas_station"),
                    ("language", self.language.as_str()),
                ],
            )
            .await?;
        check_status(&envelope.status, envelope.error_message.as_deref())?;
        Ok(envelope.results.into_iter().filter_map(WirePlace::into_candidate).collect())
    }

    async fn place_details(
        &self,
        credential: &PlacesCredential,
        place_id: &str,
    ) -> Result<Option<PlaceDetails>, StationLookupError> {
        let envelope: DetailsEnvelope = self
            .get_json(
                DETAILS_URL,
                &[
                    ("place_id", place_id),
                    ("key", credential.expose()),
                    ("fields", DETAILS_FIELDS),
                    ("language", self.language.as_str()),
                ],
            )
            .await?;
        details_from_envelope(envelope)
    }

    async fn geocode(
        &self,
        credential: &PlacesCredential,
        address: &str,
    ) -> Result<Option<GeocodeHit>, StationLookupError> {
        let envelope: SearchEnvelope = self
            .get_json(GEOCODE_URL, &[("address", address), ("key", credential.expose())])
            .await?;
        geocode_hit(envelope)
    }
}

/// `ZERO_RESULTS` is an empty answer, not a failure; anything but `OK` otherwise is.
fn check_status(status: &str, message: Option<&str>) -> Result<(), StationLookupError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(StationLookupError::Service {
            status: other.to_string(),
            message: message.unwrap_or_default().to_string(),
        }),
    }
}

/// The best geocoder match; geocode replies share the search envelope but carry no names.
fn geocode_hit(envelope: SearchEnvelope) -> Result<Option<GeocodeHit>, StationLookupError> {
    check_status(&envelope.status, envelope.error_message.as_deref())?;
    Ok(envelope.results.into_iter().next().map(|p| GeocodeHit {
        place_id: p.place_id,
        formatted_address: p.formatted_address,
        location: p.geometry.and_then(|g| g.location),
    }))
}

fn details_from_envelope(
    envelope: DetailsEnvelope,
) -> Result<Option<PlaceDetails>, StationLookupError> {
    check_status(&envelope.status, envelope.error_message.as_deref())?;
    Ok(envelope.result.as_ref().map(details_from_result))
}

impl WirePlace {
    fn into_candidate(self) -> Option<PlaceCandidate> {
        Some(PlaceCandidate {
            name: self.name.filter(|n| !n.trim().is_empty())?,
            place_id: self.place_id,
            formatted_address: self.formatted_address,
            location: self.geometry.and_then(|g| g.location),
            rating: self.rating,
            user_ratings_total: self.user_ratings_total.unwrap_or(0),
        })
    }
}

fn details_from_result(result: &Map<String, Value>) -> PlaceDetails {
    let text = |key: &str| result.get(key).and_then(Value::as_str).map(str::to_string);

    let opening_hours = result
        .get("opening_hours")
        .and_then(|h| h.get("weekday_text"))
        .and_then(Value::as_array)
        .map(|days| days.iter().filter_map(|d| d.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    let editorial_summary = result
        .get("editorial_summary")
        .and_then(|s| s.get("overview"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    PlaceDetails {
        phone: text("formatted_phone_number"),
        website: text("website"),
        opening_hours,
        editorial_summary,
        fuel_price_data: fuel_price_fields(result),
    }
}

/// Collect fields that might carry fuel prices. Google does not document any, so
/// this is usually `None`; `fuelOptions` is kept when a newer API surface sends it.
pub fn fuel_price_fields(result: &Map<String, Value>) -> Option<Value> {
    let found: Map<String, Value> = result
        .iter()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            key == "fueloptions" || FUEL_TERMS.iter().any(|t| key.contains(t))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (!found.is_empty()).then_some(Value::Object(found))
}
