//! Money amounts using decimal arithmetic.
//!
//! Every stored amount is `NUMERIC(18,2)`, so [`Money`] always holds a value
//! rounded to two decimal places. The shop runs in a single configured
//! [`CurrencyCode`]; amounts themselves carry no currency.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount, rounding half away from zero to cents.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount multiplied by a quantity (line totals).
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self::new(self.0 * Decimal::from(quantity))
    }

    /// Returns true for amounts below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Format with the currency symbol, e.g. `1250.00 ден` or `$19.99`.
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        match currency {
            CurrencyCode::Usd => format!("${:.2}", self.0),
            CurrencyCode::Eur | CurrencyCode::Mkd => format!("{:.2} {}", self.0, currency.symbol()),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// ISO 4217 currency codes the shop can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// Macedonian denar.
    #[default]
    Mkd,
    /// Euro.
    Eur,
    /// US dollar.
    Usd,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Mkd => "MKD",
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Mkd => "ден",
            Self::Eur => "€",
            Self::Usd => "$",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MKD" => Ok(Self::Mkd),
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    #[test]
    fn test_new_rounds_to_cents() {
        assert_eq!(money("10.005").amount(), "10.01".parse::<Decimal>().unwrap());
        assert_eq!(money("10.004").amount(), "10.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [money("149.50").times(2), money("20").times(3)];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total, money("359.00"));
    }

    #[test]
    fn test_display_formats() {
        let amount = money("1250");
        assert_eq!(amount.to_string(), "1250.00");
        assert_eq!(amount.display(CurrencyCode::Mkd), "1250.00 ден");
        assert_eq!(amount.display(CurrencyCode::Eur), "1250.00 €");
        assert_eq!(amount.display(CurrencyCode::Usd), "$1250.00");
    }

    #[test]
    fn test_is_negative() {
        assert!(money("-0.01").is_negative());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::Eur);
        assert_eq!(" MKD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::Mkd);
        assert!("GBP".parse::<CurrencyCode>().is_err());
    }
}
