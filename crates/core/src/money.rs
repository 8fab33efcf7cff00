use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An amount exactly as it came off a statement: already numeric, or text
/// still carrying thousands separators, symbols or accounting parentheses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawAmount {
    Number(Decimal),
    Text(String),
}

impl RawAmount {
    /// Builds a numeric amount from a spreadsheet float. `NaN` and infinities
    /// have no decimal representation and yield `None`.
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(RawAmount::Number)
    }

    /// Coerces the amount to a decimal; text that does not parse yields `None`.
    pub fn normalize(&self) -> Option<Decimal> {
        match self {
            RawAmount::Number(d) => Some(*d),
            RawAmount::Text(s) => parse_amount(s),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.normalize().is_some_and(|d| d.is_zero())
    }
}

/// Parses statement or report amount text: `1,234.50`, `$99.99`, `-50`,
/// `(75.25)`. Blank or non-numeric text yields `None`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '៛' | '\u{a0}') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let dec = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -dec } else { dec })
}

/// Renders an amount in accounting style: thousands separators, two
/// decimals, negatives in parentheses.
pub fn format_accounting(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("({grouped}.{frac_part})")
    } else {
        format!("{grouped}.{frac_part}")
    }
}
