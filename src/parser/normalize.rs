/// Tokens the report prints in place of a figure it does not have.
const NOT_AVAILABLE: &[&str] = &["-", "–", "—"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Decimal(f64),
}

impl Numeric {
    /// Counts are whole and non-negative; anything else is treated as missing.
    pub fn as_count(self) -> Option<u64> {
        match self {
            Numeric::Integer(n) => u64::try_from(n).ok(),
            Numeric::Decimal(_) => None,
        }
    }

    pub fn as_decimal(self) -> Option<f64> {
        match self {
            Numeric::Integer(n) => Some(n as f64),
            Numeric::Decimal(d) => Some(d),
        }
    }
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a table figure such as `1,694,310` or `4.2`.
///
/// Never fails: blanks, not-available dashes and garbage all come back as `None`.
pub fn parse_number(token: &str) -> Option<Numeric> {
    let trimmed = token.trim();
    if trimmed.is_empty() || NOT_AVAILABLE.contains(&trimmed) {
        return None;
    }
    let digits = trimmed.replace(',', "");
    if digits.is_empty() {
        return None;
    }
    if let Ok(n) = digits.parse::<i64>() {
        return Some(Numeric::Integer(n));
    }
    digits
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .map(Numeric::Decimal)
}

pub fn parse_count(token: &str) -> Option<u64> {
    parse_number(token).and_then(Numeric::as_count)
}

pub fn parse_decimal(token: &str) -> Option<f64> {
    parse_number(token).and_then(Numeric::as_decimal)
}

/// `MTWARA-MIKINDANI` → `Mtwara-Mikindani`: every alphabetic run gets an
/// upper-case first letter, the rest is lowered.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
