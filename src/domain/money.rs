use thiserror::Error;

/// Amounts are integer minor units (paise for INR): ₹12.50 = 1250.
pub type Cents = i64;

/// Render minor units as a decimal string: 125050 -> "1250.50".
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount '{0}'")]
    InvalidFormat(String),
    #[error("amount '{0}' has more than two decimal places")]
    TooPrecise(String),
}

/// Parse a decimal amount into minor units.
///
/// Accepts an optional sign, digit-group commas (`1,25,000.00`) and up to
/// two decimal places. Unlike a float parse, `0.1 + 0.2` style rounding
/// never happens because both halves are parsed as integers.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let cleaned: String = unsigned.chars().filter(|c| *c != ',').collect();
    let invalid = || ParseCentsError::InvalidFormat(input.to_string());

    let (units_str, fraction_str) = match cleaned.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (cleaned.as_str(), ""),
    };
    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(invalid());
    }
    if fraction_str.len() > 2 {
        return Err(ParseCentsError::TooPrecise(input.to_string()));
    }
    if !units_str.chars().chain(fraction_str.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| invalid())?
    };
    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction_str.parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(125050), "1250.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5500), "-55.00");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("1250.50"), Ok(125050));
        assert_eq!(parse_cents("1,25,000"), Ok(12500000));
        assert_eq!(parse_cents("55"), Ok(5500));
        assert_eq!(parse_cents("0.5"), Ok(50));
        assert_eq!(parse_cents(".05"), Ok(5));
        assert_eq!(parse_cents("-12.34"), Ok(-1234));
        assert_eq!(parse_cents("+3"), Ok(300));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::Empty));
        assert!(matches!(
            parse_cents("12.345"),
            Err(ParseCentsError::TooPrecise(_))
        ));
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("1.2.3").is_err());
        assert!(parse_cents(".").is_err());
        assert!(parse_cents("1e5").is_err());
    }
}
