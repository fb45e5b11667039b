/// Parse a display timestamp into seconds.
///
/// Accepts `HH:MM:SS`, `MM:SS`, or a bare number of seconds, optionally
/// wrapped in brackets (`[00:01:30]`). Anything unparseable yields 0.0 so a
/// bad timestamp never fails the pipeline.
pub fn parse_timestamp(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let parts: Vec<&str> = inner.split(':').collect();
    let parsed: Option<Vec<f64>> = parts.iter().map(|p| p.trim().parse::<f64>().ok()).collect();

    match parsed.as_deref() {
        Some([hours, minutes, seconds]) => hours * 3600.0 + minutes * 60.0 + seconds,
        Some([minutes, seconds]) => minutes * 60.0 + seconds,
        Some([seconds]) => *seconds,
        _ => 0.0,
    }
}
