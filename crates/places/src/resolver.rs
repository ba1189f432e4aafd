use pumpslip_core::{ParsedReceipt, StationInfo};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::access::{PlacesAccess, PlacesCredential};
use crate::brand::detect_brand;
use crate::client::{GeocodeHit, PlaceCandidate, PlacesApi, StationLookupError};

pub const DEFAULT_COUNTRY: &str = "Greece";

/// Matches a receipt's merchant to a real station. Strictly best-effort: every
/// failure ends in "no station info", never in an error for the caller.
#[derive(Clone)]
pub struct StationResolver {
    access: PlacesAccess,
    api: Arc<dyn PlacesApi>,
    country: String,
}

impl StationResolver {
    pub fn new(access: PlacesAccess, api: Arc<dyn PlacesApi>) -> Self {
        Self { access, api, country: DEFAULT_COUNTRY.to_string() }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.access.is_enabled()
    }

    /// Resolve the station for a parsed receipt, echoing its per-liter price.
    pub async fn resolve_receipt(&self, receipt: &ParsedReceipt) -> Option<StationInfo> {
        self.resolve(
            receipt.merchant.as_deref(),
            receipt.address.as_deref(),
            receipt.price_per_liter,
        )
        .await
    }

    /// Look a station up, downgrading any failure to `None` with a warning.
    pub async fn resolve(
        &self,
        merchant: Option<&str>,
        address_hint: Option<&str>,
        receipt_price: Option<Decimal>,
    ) -> Option<StationInfo> {
        match self.lookup(merchant, address_hint, receipt_price).await {
            Ok(Some(station)) => {
                info!(name = %station.name, brand = %station.brand, "Station resolved");
                Some(station)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Station lookup failed; continuing without station info");
                None
            }
        }
    }

    /// The fallible lookup behind [`StationResolver::resolve`].
    pub async fn lookup(
        &self,
        merchant: Option<&str>,
        address_hint: Option<&str>,
        receipt_price: Option<Decimal>,
    ) -> Result<Option<StationInfo>, StationLookupError> {
        let PlacesAccess::Enabled(credential) = &self.access else {
            debug!("No places credential configured; skipping station lookup");
            return Ok(None);
        };

        let merchant = non_blank(merchant);
        let address_hint = non_blank(address_hint);
        let Some(query) = search_query(merchant, address_hint, &self.country) else {
            debug!("Receipt has neither merchant nor address; skipping station lookup");
            return Ok(None);
        };

        let candidates = self.api.text_search(credential, &query).await?;
        let station = match candidates.into_iter().next() {
            Some(candidate) => {
                Some(self.station_from_candidate(credential, candidate, merchant).await)
            }
            None => match address_hint {
                Some(address) => {
                    let located = format!("{address}, {}", self.country);
                    debug!(address = %located, "No text-search hit; geocoding the address");
                    self.api
                        .geocode(credential, &located)
                        .await?
                        .map(|hit| station_from_geocode(hit, merchant, address))
                }
                None => None,
            },
        };

        if station.is_none() {
            warn!(query = %query, "No gas station found");
        }
        Ok(station.map(|s| s.with_receipt_price(receipt_price)))
    }

    async fn station_from_candidate(
        &self,
        credential: &PlacesCredential,
        candidate: PlaceCandidate,
        merchant: Option<&str>,
    ) -> StationInfo {
        let mut station = StationInfo::new(
            candidate.name.clone(),
            detect_brand(&candidate.name, merchant),
        );
        station.place_id = candidate.place_id;
        station.address = candidate.formatted_address;
        station.latitude = candidate.location.map(|l| l.lat);
        station.longitude = candidate.location.map(|l| l.lng);
        station.rating = candidate.rating;
        station.user_ratings_total = candidate.user_ratings_total;

        let Some(place_id) = station.place_id.clone() else {
            return station;
        };
        match self.api.place_details(credential, &place_id).await {
            Ok(Some(details)) => {
                if let Some(fields) = &details.fuel_price_data {
                    info!(
                        place_id = %place_id,
                        fields = %fields,
                        "Places returned fuel/price fields"
                    );
                }
                station.phone = details.phone;
                station.website = details.website;
                station.opening_hours = details.opening_hours;
                station.editorial_summary = details.editorial_summary;
                station.google_fuel_price_data = details.fuel_price_data;
            }
            Ok(None) => {}
            Err(e) => warn!(place_id = %place_id, error = %e, "Place details unavailable"),
        }
        station
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// `"<merchant> [<address>] gas station <country>"`, or `None` with nothing to search for.
pub fn search_query(
    merchant: Option<&str>,
    address: Option<&str>,
    country: &str,
) -> Option<String> {
    if merchant.is_none() && address.is_none() {
        return None;
    }
    let parts: Vec<&str> = merchant
        .into_iter()
        .chain(address)
        .chain(["gas station", country])
        .filter(|p| !p.is_empty())
        .collect();
    Some(parts.join(" "))
}

fn station_from_geocode(hit: GeocodeHit, merchant: Option<&str>, address: &str) -> StationInfo {
    let name = merchant
        .map(str::to_string)
        .or_else(|| hit.formatted_address.clone())
        .unwrap_or_else(|| address.to_string());
    let mut station = StationInfo::new(name.clone(), detect_brand(&name, merchant));
    station.place_id = hit.place_id;
    station.address = hit.formatted_address.or_else(|| Some(address.to_string()));
    station.latitude = hit.location.map(|l| l.lat);
    station.longitude = hit.location.map(|l| l.lng);
    station
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LatLng, PlaceDetails};
    use async_trait::async_trait;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubPlaces {
        candidates: Vec<PlaceCandidate>,
        details: Option<PlaceDetails>,
        geocode_hit: Option<GeocodeHit>,
        fail_search: bool,
        fail_details: bool,
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
        geocoded: Mutex<Vec<String>>,
    }

    impl StubPlaces {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlacesApi for StubPlaces {
        async fn text_search(
            &self,
            _credential: &PlacesCredential,
            query: &str,
        ) -> Result<Vec<PlaceCandidate>, StationLookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail_search {
                return Err(StationLookupError::Service {
                    status: "OVER_QUERY_LIMIT".into(),
                    message: "quota".into(),
                });
            }
            Ok(self.candidates.clone())
        }

        async fn place_details(
            &self,
            _credential: &PlacesCredential,
            _place_id: &str,
        ) -> Result<Option<PlaceDetails>, StationLookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_details {
                return Err(StationLookupError::Transport("reset".into()));
            }
            Ok(self.details.clone())
        }

        async fn geocode(
            &self,
            _credential: &PlacesCredential,
            address: &str,
        ) -> Result<Option<GeocodeHit>, StationLookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.geocoded.lock().unwrap().push(address.to_string());
            Ok(self.geocode_hit.clone())
        }
    }

    fn shell() -> PlaceCandidate {
        PlaceCandidate {
            place_id: Some("ChIJshell".into()),
            name: "Shell Κηφισίας".into(),
            formatted_address: Some("Λεωφ. Κηφισίας 100, Αθήνα".into()),
            location: Some(LatLng { lat: 37.98, lng: 23.72 }),
            rating: Some(4.2),
            user_ratings_total: 150,
        }
    }

    fn enabled() -> PlacesAccess {
        PlacesAccess::from_key(Some("test-key".into()))
    }

    fn resolver(access: PlacesAccess, stub: Arc<StubPlaces>) -> StationResolver {
        StationResolver::new(access, stub)
    }

    #[tokio::test]
    async fn disabled_access_never_calls_the_service() {
        let stub = Arc::new(StubPlaces { candidates: vec![shell()], ..Default::default() });
        let r = resolver(PlacesAccess::Disabled, stub.clone());
        assert!(r.resolve(Some("SHELL"), Some("Αθήνα"), None).await.is_none());
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn service_error_becomes_no_station() {
        let stub = Arc::new(StubPlaces { fail_search: true, ..Default::default() });
        let r = resolver(enabled(), stub.clone());
        assert!(r.resolve(Some("SHELL"), None, None).await.is_none());
        assert!(r.lookup(Some("SHELL"), None, None).await.is_err());
    }

    #[tokio::test]
    async fn first_candidate_becomes_station() {
        let stub = Arc::new(StubPlaces {
            candidates: vec![
                shell(),
                PlaceCandidate { name: "BP".into(), ..shell() },
            ],
            ..Default::default()
        });
        let s = resolver(enabled(), stub.clone()).resolve(Some("SHELL"), None, None).await.unwrap();
        assert_eq!(s.name, "Shell Κηφισίας");
        assert_eq!(s.brand, "SHELL");
        assert_eq!(s.place_id.as_deref(), Some("ChIJshell"));
        assert_eq!(s.latitude, Some(37.98));
        assert_eq!(s.user_ratings_total, 150);
        assert_eq!(s.price_from_receipt, None);
        assert_eq!(
            stub.queries.lock().unwrap().as_slice(),
            ["SHELL gas station Greece".to_string()]
        );
    }

    #[tokio::test]
    async fn receipt_price_is_echoed() {
        let stub = Arc::new(StubPlaces { candidates: vec![shell()], ..Default::default() });
        let receipt = ParsedReceipt {
            merchant: Some("SHELL".into()),
            price_per_liter: Some(Decimal::from_str("1.499").unwrap()),
            ..ParsedReceipt::default()
        };
        let s = resolver(enabled(), stub).resolve_receipt(&receipt).await.unwrap();
        assert_eq!(s.price_from_receipt, receipt.price_per_liter);
        assert_eq!(s.price_source.as_deref(), Some("receipt"));
    }

    #[tokio::test]
    async fn details_enrich_station() {
        let stub = Arc::new(StubPlaces {
            candidates: vec![shell()],
            details: Some(PlaceDetails {
                phone: Some("210 000 0000".into()),
                fuel_price_data: Some(json!({"price_level": 2})),
                ..Default::default()
            }),
            ..Default::default()
        });
        let s = resolver(enabled(), stub).resolve(Some("SHELL"), None, None).await.unwrap();
        assert_eq!(s.phone.as_deref(), Some("210 000 0000"));
        assert_eq!(s.google_fuel_price_data, Some(json!({"price_level": 2})));
    }

    #[tokio::test]
    async fn details_failure_keeps_station() {
        let stub = Arc::new(StubPlaces {
            candidates: vec![shell()],
            fail_details: true,
            ..Default::default()
        });
        let s = resolver(enabled(), stub).resolve(Some("SHELL"), None, None).await;
        assert_eq!(s.unwrap().name, "Shell Κηφισίας");
    }

    #[tokio::test]
    async fn no_candidate_and_no_address_is_no_station() {
        let stub = Arc::new(StubPlaces::default());
        let r = resolver(enabled(), stub.clone());
        assert!(r.resolve(Some("ΚΑΡΑΤΖΙΑΣ"), None, None).await.is_none());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn address_hint_falls_back_to_geocoding() {
        let stub = Arc::new(StubPlaces {
            geocode_hit: Some(GeocodeHit {
                place_id: Some("ChIJgeo".into()),
                formatted_address: Some("Εθνική Οδός 12, Λαμία".into()),
                location: Some(LatLng { lat: 38.9, lng: 22.4 }),
            }),
            ..Default::default()
        });
        let s = resolver(enabled(), stub.clone())
            .resolve(Some("Karatzias"), Some("Εθνική Οδός 12"), None)
            .await
            .unwrap();
        assert_eq!(s.name, "Karatzias");
        assert_eq!(s.brand, "KARATZIAS");
        assert_eq!(s.address.as_deref(), Some("Εθνική Οδός 12, Λαμία"));
        assert_eq!(s.longitude, Some(22.4));
        assert_eq!(
            stub.queries.lock().unwrap().as_slice(),
            ["Karatzias Εθνική Οδός 12 gas station Greece".to_string()]
        );
        assert_eq!(
            stub.geocoded.lock().unwrap().as_slice(),
            ["Εθνική Οδός 12, Greece".to_string()]
        );
    }

    #[tokio::test]
    async fn geocoding_uses_configured_country() {
        let stub = Arc::new(StubPlaces::default());
        let r = resolver(enabled(), stub.clone()).with_country("Cyprus");
        assert!(r.resolve(None, Some("Λεωφ. Μακαρίου 5"), None).await.is_none());
        assert_eq!(
            stub.geocoded.lock().unwrap().as_slice(),
            ["Λεωφ. Μακαρίου 5, Cyprus".to_string()]
        );
    }

    #[tokio::test]
    async fn nothing_to_search_makes_no_calls() {
        let stub = Arc::new(StubPlaces { candidates: vec![shell()], ..Default::default() });
        let r = resolver(enabled(), stub.clone());
        assert!(r.resolve(None, Some("  "), None).await.is_none());
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn query_layout() {
        assert_eq!(
            search_query(Some("EKO"), None, "Greece").as_deref(),
            Some("EKO gas station Greece")
        );
        assert_eq!(search_query(None, None, "Greece"), None);
    }
}
