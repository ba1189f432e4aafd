//! Post-OCR correction for Greek fuel receipts.
//!
//! Greek OCR models routinely read the capital lambda `Λ` as alpha `Α`, which turns
//! `ΛΙΤΡΑ` (liters) into the non-word `ΑΙΤΡΑ`. The rules below only touch that
//! vocabulary, so any line without a known misread comes back byte-for-byte intact.

use regex::Regex;
use std::sync::OnceLock;

/// Exact substitutions, longest phrases first so the generic word forms
/// never pre-empt a more specific phrase.
const PHRASE_FIXES: &[(&str, &str)] = &[
    ("ΤΙΜΗ ΜΟΝΑΔΟΣ ΑΙΤΡΟΥ", "ΤΙΜΗ ΜΟΝΑΔΟΣ ΛΙΤΡΟΥ"),
    ("ΠΟΣΟΤΗΤΑ ΑΙΤΡΩΝ", "ΠΟΣΟΤΗΤΑ ΛΙΤΡΩΝ"),
    ("ΠΟΣΟΤΗΤΑ ΑΙΤΡΑ", "ΠΟΣΟΤΗΤΑ ΛΙΤΡΑ"),
    ("ΣΥΝΟΛΟ ΑΙΤΡΩΝ", "ΣΥΝΟΛΟ ΛΙΤΡΩΝ"),
    ("ΣΥΝΟΛΟ ΑΙΤΡΑ", "ΣΥΝΟΛΟ ΛΙΤΡΑ"),
    ("ΤΙΜΗ ΑΙΤΡΟΥ", "ΤΙΜΗ ΛΙΤΡΟΥ"),
    (" ΑΙΤΡΩΝ", " ΛΙΤΡΩΝ"),
    (" ΑΙΤΡΑ", " ΛΙΤΡΑ"),
    (" ΑΙΤΡΟΥ", " ΛΙΤΡΟΥ"),
    (" ΑΙΤΡΟ", " ΛΙΤΡΟ"),
];

/// A decimal quantity directly followed by the misread stem.
fn re_quantity_stem() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(\d+[.,]\d+)\s*ΑΙΤΡ").expect("invalid regex"))
}

/// Apply the known-misread table to raw OCR text, line by line.
///
/// Deterministic and infallible. Line breaks are preserved exactly.
pub fn correct(raw: &str) -> String {
    raw.split('\n').map(correct_line).collect::<Vec<_>>().join("\n")
}

fn correct_line(line: &str) -> String {
    if !line.contains("ΑΙΤΡ") {
        return line.to_string();
    }
    let mut fixed = line.to_string();
    for (wrong, right) in PHRASE_FIXES {
        if fixed.contains(wrong) {
            fixed = fixed.replace(wrong, right);
        }
    }
    re_quantity_stem().replace_all(&fixed, "${1} ΛΙΤΡ").into_owned()
}
