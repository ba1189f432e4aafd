use rust_decimal::Decimal;
use serde::Serialize;

/// Where the echoed fuel price came from.
pub const PRICE_SOURCE_RECEIPT: &str = "receipt";

/// A gas station matched against a places service.
///
/// Derived from a [`crate::ParsedReceipt`]; the receipt itself is never touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInfo {
    pub place_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub brand: String,
    pub rating: Option<f64>,
    pub user_ratings_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editorial_summary: Option<String>,
    /// Fuel or price related fields the places service happened to return, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_fuel_price_data: Option<serde_json::Value>,
    /// `price_per_liter` echoed from the receipt; places services carry no live fuel prices.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price_from_receipt: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_source: Option<String>,
}

impl StationInfo {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            place_id: None,
            name: name.into(),
            address: None,
            latitude: None,
            longitude: None,
            brand: brand.into(),
            rating: None,
            user_ratings_total: 0,
            phone: None,
            website: None,
            opening_hours: Vec::new(),
            editorial_summary: None,
            google_fuel_price_data: None,
            price_from_receipt: None,
            price_source: None,
        }
    }

    /// Attach the receipt's per-liter price, if it printed one.
    pub fn with_receipt_price(mut self, price: Option<Decimal>) -> Self {
        if let Some(p) = price {
            self.price_from_receipt = Some(p);
            self.price_source = Some(PRICE_SOURCE_RECEIPT.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn receipt_price_sets_source() {
        let s = StationInfo::new("Shell Kifisias", "SHELL")
            .with_receipt_price(Some(Decimal::from_str("1.499").unwrap()));
        assert_eq!(s.price_source.as_deref(), Some("receipt"));
        let v = serde_json::to_value(&s).unwrap();
        assert!((v["price_from_receipt"].as_f64().unwrap() - 1.499).abs() < 1e-9);
    }

    #[test]
    fn no_receipt_price_leaves_fields_out() {
        let s = StationInfo::new("EKO", "EKO").with_receipt_price(None);
        let v = serde_json::to_value(&s).unwrap();
        assert!(v.get("price_from_receipt").is_none());
        assert!(v.get("price_source").is_none());
        assert!(v.get("google_fuel_price_data").is_none());
        assert_eq!(v["user_ratings_total"], json!(0));
    }
}
