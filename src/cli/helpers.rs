//! Shared helper functions for CLI commands

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format a cost amount for display (two decimals, currency prefix)
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{}{:.2}", currency, amount)
}

/// Parse a `KEY=VALUE` argument (e.g. `--material "Vamp=Calf leather"`)
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// Parse a `NAME:QUANTITY:CONSUMPTION` part argument
pub fn parse_part_spec(raw: &str) -> Result<(String, u32, f64), String> {
    let mut pieces = raw.splitn(3, ':');
    let name = pieces
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("expected NAME:QUANTITY:CONSUMPTION, got '{}'", raw))?;

    let quantity = match pieces.next() {
        Some(q) => q
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid quantity in '{}'", raw))?,
        None => 1,
    };

    let consumption = match pieces.next() {
        Some(c) => c
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid consumption in '{}'", raw))?,
        None => 0.0,
    };

    Ok((name.to_string(), quantity, consumption))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_format_money_rounds_to_two_decimals() {
        assert_eq!(format_money(420.0, "$"), "$420.00");
        assert_eq!(format_money(12.345, "€"), "€12.35");
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("Vamp=Calf leather brown").unwrap(),
            ("Vamp".to_string(), "Calf leather brown".to_string())
        );
        assert!(parse_key_value("no-separator").is_err());
        assert!(parse_key_value("=empty-key").is_err());
    }

    #[test]
    fn test_parse_part_spec() {
        assert_eq!(
            parse_part_spec("Tongue:2:1.5").unwrap(),
            ("Tongue".to_string(), 2, 1.5)
        );
        assert_eq!(parse_part_spec("Tongue").unwrap(), ("Tongue".to_string(), 1, 0.0));
        assert!(parse_part_spec("Tongue:x:1").is_err());
    }
}
