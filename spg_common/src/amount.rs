use std::{fmt, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

/// A monetary amount, stored as the decimal string the client supplied.
///
/// Amounts are never represented as floats anywhere in the system. The accepted
/// format is an unsigned decimal: one or more digits, optionally followed by a
/// decimal point and further digits (`"10"`, `"0.5"`, `"19.99"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(String);

#[derive(Debug, Clone, Error)]
pub enum AmountError {
    #[error("'{0}' is not a valid decimal amount")]
    InvalidFormat(String),
    #[error("Amount arithmetic overflowed")]
    Overflow,
}

impl Amount {
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Add two amounts without going through floating point. The result carries as
    /// many decimal places as the more precise operand.
    pub fn checked_add(&self, other: &Amount) -> Result<Amount, AmountError> {
        let (a_int, a_frac) = split_decimal(&self.0);
        let (b_int, b_frac) = split_decimal(&other.0);
        let scale = a_frac.len().max(b_frac.len());
        let a = to_scaled(a_int, a_frac, scale)?;
        let b = to_scaled(b_int, b_frac, scale)?;
        let sum = a.checked_add(b).ok_or(AmountError::Overflow)?;
        if scale == 0 {
            return Ok(Amount(sum.to_string()));
        }
        let divisor = 10i128.pow(scale as u32);
        Ok(Amount(format!("{}.{:0width$}", sum / divisor, sum % divisor, width = scale)))
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn split_decimal(s: &str) -> (&str, &str) {
    match s.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (s, ""),
    }
}

fn to_scaled(int: &str, frac: &str, scale: usize) -> Result<i128, AmountError> {
    let mut digits = String::with_capacity(int.len() + scale);
    digits.push_str(int);
    digits.push_str(frac);
    for _ in frac.len()..scale {
        digits.push('0');
    }
    digits.parse::<i128>().map_err(|_| AmountError::Overflow)
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = match s.split_once('.') {
            // A dot must have digits on both sides.
            Some((int, frac)) => is_digits(int) && is_digits(frac),
            None => is_digits(s),
        };
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(AmountError::InvalidFormat(s.to_string()))
        }
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
