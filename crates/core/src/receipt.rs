use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::station::StationInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Structured fields recovered from one gas-station receipt.
///
/// Every field is optional because the extraction model may omit any of them.
/// `None` serializes as `null` and is never collapsed into zero: a receipt
/// stating `0.00` VAT and one that states no VAT at all stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub merchant: Option<String>,
    /// `YYYY-MM-DD` when the printed date could be normalized.
    pub date: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat: Option<Decimal>,
    /// Amount before VAT.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub net_amount: Option<Decimal>,
    pub fuel_type: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub liters: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price_per_liter: Option<Decimal>,
    /// Station address as printed on the receipt.
    pub address: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// The JSON body returned for a successfully processed receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ResultPayload {
    pub success: bool,
    /// OCR text after correction, exactly as it was handed to the parser.
    pub ocr_text: String,
    pub parsed_data: ParsedReceipt,
    pub station_info: Option<StationInfo>,
}

impl ResultPayload {
    pub fn assemble(
        ocr_text: String,
        parsed_data: ParsedReceipt,
        station_info: Option<StationInfo>,
    ) -> Self {
        Self { success: true, ocr_text, parsed_data, station_info }
    }
}
