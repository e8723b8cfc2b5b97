use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 12.50 = 1250 cents.
pub type Cents = i64;

/// Format cents as a plain decimal string.
/// Example: 1250 -> "12.50", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Format cents the way the terminal shows amounts: "$12.50".
pub fn display_cents(cents: Cents) -> String {
    if cents < 0 {
        format!("-${}", format_cents(-cents))
    } else {
        format!("${}", format_cents(cents))
    }
}

/// Parse a decimal string into cents.
/// Example: "12.50" -> 1250, "12.5" -> 1250, "100" -> 10000
///
/// A leading `$` is accepted. More than two decimal places is rejected
/// instead of truncated, so no precision is dropped on the way in.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');
    let input = input.strip_prefix('$').unwrap_or(input);

    let (units_str, decimal_str) = match input.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (input, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.bytes().all(|b| b.is_ascii_digit())
        || !decimal_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?
    };

    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // Single digit like "5" means 50 cents
        1 => decimal_str
            .parse::<i64>()
            .map_err(|_| ParseCentsError::InvalidFormat)?
            * 10,
        2 => decimal_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
        _ => {
            // Trailing zeros carry no precision ("10.000" is fine)
            let (kept, rest) = decimal_str.split_at(2);
            if rest.bytes().any(|b| b != b'0') {
                return Err(ParseCentsError::TooPrecise);
            }
            kept.parse().map_err(|_| ParseCentsError::InvalidFormat)?
        }
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::InvalidFormat)?;
    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    TooPrecise,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooPrecise => write!(f, "amounts allow at most two decimal places"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
