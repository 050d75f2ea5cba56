/// Parse a human duration into milliseconds.
///
/// Accepts plain seconds (`90`) or unit-suffixed parts that may be chained:
/// `250ms`, `30s`, `2m`, `1h`, `1m30s`.
pub fn parse_duration_ms(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("duration value cannot be empty".to_string());
    }

    if let Ok(secs) = trimmed.parse::<u64>() {
        return secs
            .checked_mul(1000)
            .ok_or_else(|| format!("duration too large: {raw}"));
    }

    let mut total: u64 = 0;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            return Err(format!("invalid duration value: {raw}"));
        }
        let value = rest[..digits]
            .parse::<u64>()
            .map_err(|_| format!("invalid duration value: {raw}"))?;
        rest = &rest[digits..];

        let (unit_ms, unit_len) = if rest.starts_with("ms") {
            (1, 2)
        } else if rest.starts_with('h') {
            (3_600_000, 1)
        } else if rest.starts_with('m') {
            (60_000, 1)
        } else if rest.starts_with('s') {
            (1000, 1)
        } else {
            return Err(format!("invalid duration unit in: {raw}"));
        };
        rest = &rest[unit_len..];

        total = value
            .checked_mul(unit_ms)
            .and_then(|ms| total.checked_add(ms))
            .ok_or_else(|| format!("duration too large: {raw}"))?;
    }
    Ok(total)
}
