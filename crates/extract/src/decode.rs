use pumpslip_core::{decimal_from_json_number, normalize_receipt_date, parse_locale_decimal};
use pumpslip_core::{LineItem, ParsedReceipt};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Keys a model answer must carry at least one of to count as a receipt.
pub const RECEIPT_KEYS: &[&str] = &[
    "merchant",
    "date",
    "total",
    "vat",
    "net_amount",
    "fuel_type",
    "liters",
    "price_per_liter",
    "address",
    "items",
];

/// Decode a model-produced JSON object into a [`ParsedReceipt`].
///
/// Per-field leniency: a key that is missing, `null`, or of the wrong type becomes
/// `None` (or is dropped, for line items). Returns `None` only when the object
/// has none of the receipt keys at all.
pub fn receipt_from_object(obj: &Map<String, Value>) -> Option<ParsedReceipt> {
    if !RECEIPT_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return None;
    }

    Some(ParsedReceipt {
        merchant: text_field(obj.get("merchant")),
        date: text_field(obj.get("date")).map(|d| normalize_receipt_date(&d)),
        total: decimal_field(obj.get("total")),
        vat: decimal_field(obj.get("vat")),
        net_amount: decimal_field(obj.get("net_amount")),
        fuel_type: text_field(obj.get("fuel_type")),
        liters: decimal_field(obj.get("liters")),
        price_per_liter: decimal_field(obj.get("price_per_liter")),
        address: text_field(obj.get("address")),
        items: line_items(obj.get("items")),
    })
}

fn text_field(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(s.to_string())
}

fn decimal_field(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => decimal_from_json_number(n),
        Value::String(s) => parse_locale_decimal(s),
        _ => None,
    }
}

fn line_items(value: Option<&Value>) -> Vec<LineItem> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            Some(LineItem {
                name: text_field(obj.get("name"))?,
                price: decimal_field(obj.get("price"))?,
            })
        })
        .collect()
}
