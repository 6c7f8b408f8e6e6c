//! Currency amounts in exact integer minor units.
//!
//! No floating point anywhere: an [`Amount`] is a `u64` count of minor units
//! (cents for USD) tagged with its [`Currency`]. Arithmetic between different
//! currencies is an error, never a silent conversion.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// ISO-4217 style three-letter currency code (upper-case ASCII).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");
    pub const GBP: Currency = Currency(*b"GBP");
    pub const JPY: Currency = Currency(*b"JPY");

    /// Parse a currency code. Lower-case input is accepted and normalised.
    pub fn new(code: &str) -> DomainResult<Self> {
        let bytes = code.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(DomainError::validation(format!(
                "currency code must be three ASCII letters, got '{code}'"
            )));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Number of minor-unit digits (2 for USD cents, 0 for JPY).
    pub fn fraction_digits(&self) -> u32 {
        match &self.0 {
            b"JPY" | b"KRW" | b"CLP" | b"ISK" | b"VND" => 0,
            b"BHD" | b"JOD" | b"KWD" | b"OMR" | b"TND" => 3,
            _ => 2,
        }
    }
}

impl ValueObject for Currency {}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.as_str())
    }
}

impl core::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

/// A non-negative quantity of one currency, in minor units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    quantity: u64,
    currency: Currency,
}

impl Amount {
    pub fn new(quantity: u64, currency: Currency) -> Self {
        Self { quantity, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Build an amount from whole major units (e.g. dollars).
    pub fn from_major(units: u64, currency: Currency) -> DomainResult<Self> {
        let scale = 10u64.pow(currency.fraction_digits());
        let quantity = units.checked_mul(scale).ok_or(DomainError::Overflow)?;
        Ok(Self::new(quantity, currency))
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_positive(&self) -> bool {
        self.quantity > 0
    }

    fn ensure_same_currency(&self, other: &Amount) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::currency_mismatch(self.currency, other.currency));
        }
        Ok(())
    }

    pub fn checked_sub(&self, other: &Amount) -> DomainResult<Amount> {
        self.ensure_same_currency(other)?;
        let quantity = self
            .quantity
            .checked_sub(other.quantity)
            .ok_or(DomainError::InsufficientAmount {
                available: self.quantity,
                requested: other.quantity,
            })?;
        Ok(Self::new(quantity, self.currency))
    }
}

impl ValueObject for Amount {}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.currency.fraction_digits();
        if digits == 0 {
            return write!(f, "{} {}", self.quantity, self.currency);
        }
        let scale = 10u64.pow(digits);
        write!(
            f,
            "{}.{:0width$} {}",
            self.quantity / scale,
            self.quantity % scale,
            self.currency,
            width = digits as usize
        )
    }
}

/// Running total over amounts of a single currency.
///
/// Accumulates in `u128` so summing any realistic number of `u64` quantities
/// cannot overflow. An empty tally has no currency and a zero quantity.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    currency: Option<Currency>,
    quantity: u128,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum a sequence of amounts, failing on the first currency mismatch.
    pub fn of<'a, I>(amounts: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = &'a Amount>,
    {
        let mut tally = Self::new();
        for amount in amounts {
            tally.add(amount)?;
        }
        Ok(tally)
    }

    pub fn add(&mut self, amount: &Amount) -> DomainResult<()> {
        match self.currency {
            Some(existing) if existing != amount.currency() => {
                return Err(DomainError::currency_mismatch(existing, amount.currency()));
            }
            Some(_) => {}
            None => self.currency = Some(amount.currency()),
        }
        self.quantity = self
            .quantity
            .checked_add(u128::from(amount.quantity()))
            .ok_or(DomainError::Overflow)?;
        Ok(())
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub fn quantity(&self) -> u128 {
        self.quantity
    }

    pub fn is_positive(&self) -> bool {
        self.quantity > 0
    }

    /// Narrow back to an [`Amount`]; `None` for an empty tally.
    pub fn to_amount(&self) -> DomainResult<Option<Amount>> {
        let Some(currency) = self.currency else {
            return Ok(None);
        };
        let quantity = u64::try_from(self.quantity).map_err(|_| DomainError::Overflow)?;
        Ok(Some(Amount::new(quantity, currency)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usd(quantity: u64) -> Amount {
        Amount::new(quantity, Currency::USD)
    }

    #[test]
    fn currency_codes_are_normalised() {
        assert_eq!(Currency::new("usd").unwrap(), Currency::USD);
        assert_eq!(Currency::new(" EUR ").unwrap(), Currency::EUR);
    }

    #[test]
    fn malformed_currency_codes_are_rejected() {
        for code in ["", "US", "USDX", "U$D", "12A"] {
            assert!(matches!(
                Currency::new(code),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn currency_serializes_as_code() {
        let json = serde_json::to_string(&Currency::GBP).unwrap();
        assert_eq!(json, "\"GBP\"");
        let back: Currency = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(back, Currency::GBP);
        assert!(serde_json::from_str::<Currency>("\"POUND\"").is_err());
    }

    #[test]
    fn from_major_scales_by_fraction_digits() {
        assert_eq!(Amount::from_major(100, Currency::USD).unwrap().quantity(), 10_000);
        assert_eq!(Amount::from_major(100, Currency::JPY).unwrap().quantity(), 100);
        assert_eq!(
            Amount::from_major(u64::MAX, Currency::USD),
            Err(DomainError::Overflow)
        );
    }

    #[test]
    fn display_uses_minor_units() {
        assert_eq!(usd(10_005).to_string(), "100.05 USD");
        assert_eq!(Amount::new(7, Currency::JPY).to_string(), "7 JPY");
        assert_eq!(Amount::new(1, Currency::new("KWD").unwrap()).to_string(), "0.001 KWD");
    }

    #[test]
    fn arithmetic_requires_matching_currency() {
        let eur = Amount::new(1, Currency::EUR);
        assert_eq!(
            usd(1).checked_sub(&eur),
            Err(DomainError::currency_mismatch(Currency::USD, Currency::EUR))
        );
    }

    #[test]
    fn subtraction_never_goes_negative() {
        assert_eq!(usd(10).checked_sub(&usd(4)).unwrap(), usd(6));
        assert_eq!(
            usd(3).checked_sub(&usd(4)),
            Err(DomainError::InsufficientAmount {
                available: 3,
                requested: 4
            })
        );
    }

    #[test]
    fn tally_widens_past_u64() {
        let max = usd(u64::MAX);
        let tally = Tally::of([&max, &max]).unwrap();
        assert_eq!(tally.quantity(), u128::from(u64::MAX) * 2);
        assert_eq!(tally.to_amount(), Err(DomainError::Overflow));
    }

    #[test]
    fn empty_tally_has_no_currency() {
        let tally = Tally::new();
        assert_eq!(tally.currency(), None);
        assert!(!tally.is_positive());
        assert_eq!(tally.to_amount(), Ok(None));
    }

    #[test]
    fn tally_rejects_mixed_currencies() {
        let eur = Amount::new(5, Currency::EUR);
        let err = Tally::of([&usd(1), &eur]).unwrap_err();
        assert!(matches!(err, DomainError::CurrencyMismatch { .. }));
    }

    proptest! {
        /// Property: the tally equals the exact integer sum of its parts.
        #[test]
        fn tally_is_exact(quantities in prop::collection::vec(any::<u64>(), 0..20)) {
            let amounts: Vec<Amount> = quantities.iter().map(|q| usd(*q)).collect();
            let tally = Tally::of(&amounts).unwrap();
            let expected: u128 = quantities.iter().map(|q| u128::from(*q)).sum();
            prop_assert_eq!(tally.quantity(), expected);
        }
    }
}
