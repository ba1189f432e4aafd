pub mod amount;
pub mod date;
pub mod receipt;
pub mod station;

pub use amount::{decimal_from_json_number, parse_locale_decimal};
pub use date::normalize_receipt_date;
pub use receipt::{LineItem, ParsedReceipt, ResultPayload};
pub use station::StationInfo;
