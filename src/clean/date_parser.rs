use chrono::NaiveDate;

/// Parse an order date, trying each chrono format in turn.
/// The Amazon export writes `MM-DD-YY`, e.g. `04-30-22`.
pub fn parse_order_date<S: AsRef<str>>(s: &str, formats: &[S]) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt.as_ref()).ok())
}
