//! Best-effort gas-station lookup against a places service.

pub mod access;
pub mod brand;
pub mod client;
pub mod resolver;

pub use access::{PlacesAccess, PlacesCredential};
pub use client::{
    GeocodeHit, GooglePlacesClient, LatLng, PlaceCandidate, PlaceDetails, PlacesApi,
    StationLookupError,
};
pub use resolver::StationResolver;
