/// Build the extraction prompt for a Greek fuel receipt.
///
/// The schema block names every key the decoder looks for; keys the model
/// leaves out simply decode as absent.
pub fn build_prompt(receipt_text: &str) -> String {
    format!(
        r#"You are reading a GAS STATION receipt from Greece. Extract the data below.

Receipt text:
{receipt_text}

Answer with ONE JSON object and nothing else, using exactly these keys:
{{
  "merchant": string or null (station or company name, legal suffixes such as A.E., A.E.B.E., E.Π.E. removed),
  "address": string or null (station address printed on the receipt),
  "date": string or null (YYYY-MM-DD; receipts print DD/MM/YYYY after "HM:", "ΗΜ:" or "HM/NIA:"),
  "total": number or null (final amount paid, "ΣΥΝΟΛΟ ΜΕ ΦΠΑ" or "ΣΥΝΟΛΟ"),
  "vat": number or null (VAT amount, "ΦΠΑ" or "Φ.Π.Α."),
  "net_amount": number or null (amount before VAT, "ΚΑΘΑΡΗ ΑΞΙΑ"),
  "fuel_type": string or null (e.g. "UNLEADED 95", "DIESEL", "LPG", "ΑΜΟΛΥΒΔΗ", "ΠΕΤΡΕΛΑΙΟ"),
  "liters": number or null (quantity, "ΣΥΝΟΛΟ ΛΙΤΡΩΝ", "ΠΟΣΟΤΗΤΑ" or a number followed by "ΛΙΤΡΑ"),
  "price_per_liter": number or null ("ΤΙΜΗ ΛΙΤΡΟΥ" or "ΤΙΜΗ ΜΟΝΑΔΟΣ"),
  "items": array of {{"name": string, "price": number}} (other purchased products; [] if none)
}}

Rules:
- Greek receipts use a COMMA as the decimal separator: "21,860 ΛΙΤΡΑ" is 21.860 liters, not 21860.
  Write every number with a dot as the decimal separator.
- Use null for anything not printed on the receipt. Never guess and never use 0 for a missing value.
- Examples of merchant clean-up: "SHELL HELLAS" -> "SHELL", "METPO A.E.B.E." -> "METRO".
- No markdown, no code fences, no explanations."#
    )
}
