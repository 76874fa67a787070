/// Normalise one CSV cell: surrounding whitespace goes, and so does a
/// wrapping pair of double quotes along with any padding inside them.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// `clean_str`, with blank values treated as absent.
pub fn clean_opt(raw: Option<&str>) -> Option<String> {
    raw.map(clean_str).filter(|s| !s.is_empty())
}

/// Parse a money amount, tolerating thousands separators.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = clean_str(raw).replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a quantity; `"1.0"` style exports count as whole units.
pub fn parse_qty(raw: &str) -> Option<i64> {
    let s = clean_str(raw);
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}
