use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses the EUR price format rendered by the portal.
/// Examples: "€ 1.234,56", "512,34 €", "89,00", "1.234"
pub fn parse_eur_price(text: &str) -> Result<Decimal, String> {
    let cleaned = text
        .replace('€', "")
        .replace("EUR", "")
        .replace('\u{a0}', " ")
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return Err("empty price text".to_string());
    }

    // Italian format: dot as thousands separator, comma as decimal separator
    let normalized = if cleaned.contains('.') && cleaned.contains(',') {
        // 1.234,56 -> 1234.56
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.contains('.') && !cleaned.contains(',') {
        // A lone dot followed by exactly 3 digits is a thousands separator
        if let Some(dot_pos) = cleaned.rfind('.') {
            let after_dot = &cleaned[dot_pos + 1..];
            if after_dot.len() == 3 && after_dot.chars().all(|c| c.is_ascii_digit()) {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        } else {
            cleaned
        }
    } else if cleaned.contains(',') && !cleaned.contains('.') {
        // 512,34 -> 512.34
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    let re = Regex::new(r"([0-9]+(?:\.[0-9]+)?)").map_err(|e| e.to_string())?;

    let matched = re
        .captures(&normalized)
        .and_then(|c| c.get(1))
        .ok_or_else(|| format!("no numeric value in '{}'", text))?;

    Decimal::from_str(matched.as_str())
        .map(|d| d.round_dp(2))
        .map_err(|e| format!("decimal parse failed for '{}': {}", text, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_italian_format() {
        assert_eq!(parse_eur_price("€ 1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_eur_price("512,34 €").unwrap(), dec!(512.34));
        assert_eq!(parse_eur_price("89,00").unwrap(), dec!(89.00));
        assert_eq!(parse_eur_price("1.234").unwrap(), dec!(1234));
        assert_eq!(parse_eur_price("300.000,50").unwrap(), dec!(300000.50));
    }

    #[test]
    fn test_parse_simple_format() {
        assert_eq!(parse_eur_price("512").unwrap(), dec!(512));
        assert_eq!(parse_eur_price("512.34").unwrap(), dec!(512.34));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_eur_price("").is_err());
        assert!(parse_eur_price("   ").is_err());
        assert!(parse_eur_price("non disponibile").is_err());
        assert!(parse_eur_price("€").is_err());
    }
}
