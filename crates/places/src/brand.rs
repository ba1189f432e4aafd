/// Fuel brands common on Greek forecourts. `ΑΒ` is written in Greek capitals.
pub const KNOWN_BRANDS: &[&str] =
    &["SHELL", "BP", "EKO", "AVIN", "REVOIL", "METRO", "ΑΒ", "CYCLON"];

/// Pick a brand for a matched station.
///
/// The first known brand appearing in the places name wins; otherwise the
/// receipt's merchant, then the places name itself, upper-cased.
pub fn detect_brand(place_name: &str, merchant: Option<&str>) -> String {
    let upper = place_name.to_uppercase();
    if let Some(brand) = KNOWN_BRANDS.iter().find(|b| upper.contains(*b)) {
        return brand.to_string();
    }
    merchant
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_uppercase)
        .unwrap_or(upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_brand_in_place_name() {
        assert_eq!(detect_brand("Shell Κηφισίας", Some("ΚΑΡΑΤΖΙΑΣ")), "SHELL");
        assert_eq!(detect_brand("Πρατήριο Revoil Μαρούσι", None), "REVOIL");
    }

    #[test]
    fn falls_back_to_merchant() {
        assert_eq!(detect_brand("Πρατήριο Καυσίμων", Some("Karatzias")), "KARATZIAS");
    }

    #[test]
    fn falls_back_to_place_name() {
        assert_eq!(detect_brand("ΠΡΑΤΗΡΙΟ ΚΑΥΣΙΜΩΝ", None), "ΠΡΑΤΗΡΙΟ ΚΑΥΣΙΜΩΝ");
        assert_eq!(detect_brand("Gas & Go", Some("  ")), "GAS & GO");
    }
}
