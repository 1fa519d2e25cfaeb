use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest representable price: seven digits, two of them decimals.
const MAX_CENTS: i64 = 99_999_99;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("Enter a number.")]
    NotANumber,
    #[error("Ensure that there are no more than 2 decimal places.")]
    TooPrecise,
    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,
    #[error("Ensure that there are no more than 7 digits in total.")]
    TooLarge,
}

/// A non-negative amount stored as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        if cents > MAX_CENTS {
            return Err(PriceError::TooLarge);
        }
        Ok(Price(cents))
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('-') {
            return match rest.parse::<Price>() {
                Ok(p) if p.0 == 0 => Ok(p),
                Ok(_) => Err(PriceError::Negative),
                Err(e) => Err(e),
            };
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(PriceError::NotANumber);
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(PriceError::NotANumber);
        }
        if frac.len() > 2 {
            return Err(PriceError::TooPrecise);
        }
        let whole = whole.trim_start_matches('0');
        if whole.len() > 5 {
            return Err(PriceError::TooLarge);
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| PriceError::NotANumber)?
        };
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| PriceError::NotANumber)? * 10,
            _ => frac.parse().map_err(|_| PriceError::NotANumber)?,
        };
        Price::from_cents(units * 100 + cents)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl ToSql for Price {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Price {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(Price)
    }
}
