use std::sync::OnceLock;

use regex::Regex;

fn non_price_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\d.,]").unwrap())
}

/// Convert locale-formatted price text (`.` thousands, `,` decimal) to a
/// number. `"1.234,56 ₺"` → `1234.56`, `"12,50 TL"` → `12.50`.
///
/// The order matters: periods must be stripped as thousands separators
/// *before* the comma becomes the decimal point, or grouped prices corrupt
/// silently.
pub fn normalize_price(raw: &str) -> Option<f64> {
    if raw.trim().is_empty() {
        return None;
    }
    let cleaned = non_price_chars()
        .replace_all(raw, "")
        .replace('.', "")
        .replace(',', ".");
    cleaned.parse::<f64>().ok()
}
