use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn re_day_first() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4})\b").expect("invalid regex")
    })
}

/// Normalize a receipt date to `YYYY-MM-DD`.
///
/// Greek receipts print day-first dates (`29/04/2020`, `29-04-2020`, `29.04.2020`).
/// Those are rewritten when they name a real calendar day; anything else,
/// including dates already in ISO form, is returned trimmed but otherwise as given.
pub fn normalize_receipt_date(raw: &str) -> String {
    if let Some(c) = re_day_first().captures(raw) {
        let day = c[1].parse::<u32>().ok();
        let month = c[2].parse::<u32>().ok();
        let year = c[3].parse::<i32>().ok();
        if let (Some(d), Some(m), Some(y)) = (day, month, year) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return date.format("%Y-%m-%d").to_string();
            }
        }
    }
    raw.trim().to_string()
}
