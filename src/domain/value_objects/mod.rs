//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest amount a `NUMERIC(10, 2)` column accepts.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Money value object. Always carries exactly two fraction digits (BRL cents).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, 2));

    pub fn new(amount: Decimal) -> Self {
        let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        Self(amount)
    }

    /// Parses user-typed prices. Accepts `10.50`, `10,50` and surrounding blanks.
    pub fn parse(raw: &str) -> Result<Self, MoneyError> {
        let normalized = raw.trim().replace(',', ".");
        if normalized.is_empty() { return Err(MoneyError::Empty); }
        let amount = Decimal::from_str(&normalized).map_err(|_| MoneyError::Malformed(raw.trim().to_string()))?;
        Self::checked(amount)
    }

    fn checked(amount: Decimal) -> Result<Self, MoneyError> {
        let money = Self::new(amount);
        if money.0.is_sign_negative() && !money.0.is_zero() { return Err(MoneyError::Negative); }
        if money.0 > MAX_AMOUNT { return Err(MoneyError::TooLarge); }
        Ok(money)
    }

    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
    pub fn add(&self, other: Money) -> Money { Money::new(self.0 + other.0) }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.0 * Decimal::from(qty)) }

    /// `R$ 1.234,56`
    pub fn to_brl(&self) -> String {
        let plain = self.0.abs().to_string();
        let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 { grouped.push('.'); }
            grouped.push(ch);
        }
        let sign = if self.0.is_sign_negative() && !self.0.is_zero() { "-" } else { "" };
        format!("{sign}R$ {grouped},{frac_part}")
    }
}

impl Default for Money { fn default() -> Self { Self::ZERO } }

impl From<Money> for Decimal { fn from(m: Money) -> Decimal { m.0 } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("price is empty")]
    Empty,
    #[error("price `{0}` is not a number")]
    Malformed(String),
    #[error("price cannot be negative")]
    Negative,
    #[error("price exceeds the maximum of 99999999.99")]
    TooLarge,
}

/// Price as it arrives from a form or a cart payload: either a JSON number or a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    pub fn to_money(&self) -> Result<Money, MoneyError> {
        match self {
            Self::Number(n) => Money::parse(&n.to_string()),
            Self::Text(s) => Money::parse(s),
        }
    }
}

impl From<&str> for PriceInput { fn from(s: &str) -> Self { Self::Text(s.to_string()) } }

/// Strips everything but ASCII digits from a phone number.
pub fn phone_digits(raw: &str) -> String { raw.chars().filter(char::is_ascii_digit).collect() }

/// URL slug: lowercase, accents folded, runs of non-alphanumerics collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().to_lowercase().chars() {
        let folded = match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        };
        if folded.is_ascii_alphanumeric() { slug.push(folded); }
        else if !slug.is_empty() && !slug.ends_with('-') { slug.push('-'); }
    }
    while slug.ends_with('-') { slug.pop(); }
    slug
}
