use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::EngineError;

/// Money amount represented as **integer cents**.
///
/// Every amount the engine handles (expense amounts, budgets, totals) goes
/// through this type so sums never drift the way floats do. On the wire the
/// value is a plain JSON number in currency units (`20`, `12.5`), which keeps
/// the persisted layout readable by anything that stores `amount: number`.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "$12.34");
/// ```
///
/// Parsing from user input:
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the amount in currency units, for ratios and display only.
    #[must_use]
    pub fn as_units(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Converts a unit amount (`12.5`) to cents, rounding to the nearest cent.
    ///
    /// Returns `None` for non-finite values or values outside the `i64` range.
    #[must_use]
    pub fn from_units(units: f64) -> Option<Self> {
        if !units.is_finite() {
            return None;
        }
        let cents = (units * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}${units}.{cents:02}")
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for MoneyCents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts stay integers in JSON (`20`, not `20.0`).
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_units())
        }
    }
}

impl<'de> Deserialize<'de> for MoneyCents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UnitsVisitor)
    }
}

struct UnitsVisitor;

impl de::Visitor<'_> for UnitsVisitor {
    type Value = MoneyCents;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a numeric amount")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        v.checked_mul(100)
            .map(MoneyCents)
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(MoneyCents)
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        MoneyCents::from_units(v).ok_or_else(|| E::custom("amount out of range"))
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses user input such as `12`, `-3.5`, `$7.25` or `10,50`.
    ///
    /// At most two fractional digits are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("invalid amount '{}'", s.trim()));

        let text = s.trim();
        let (negative, text) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let text = text.trim_start();
        let text = text.strip_prefix('$').unwrap_or(text);

        let (whole, frac) = match text.split_once(['.', ',']) {
            Some((whole, frac)) => (whole, frac),
            None => (text, ""),
        };
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !digits_only(whole) || !digits_only(frac) {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(EngineError::InvalidAmount(format!(
                "too many decimals in '{}'",
                s.trim()
            )));
        }

        let too_large = || EngineError::InvalidAmount("amount too large".to_string());
        let units: i64 = whole.parse().map_err(|_| too_large())?;
        let cents = match frac.len() {
            0 => 0,
            1 => i64::from(frac.as_bytes()[0] - b'0') * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid())?,
        };
        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(too_large)?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_dollars() {
        assert_eq!(MoneyCents::new(0).to_string(), "$0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "$0.01");
        assert_eq!(MoneyCents::new(1050).to_string(), "$10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-$10.50");
    }

    #[test]
    fn parse_accepts_dot_comma_and_dollar_sign() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("$7.25".parse::<MoneyCents>().unwrap().cents(), 725);
        assert_eq!("-5".parse::<MoneyCents>().unwrap().cents(), -500);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage_and_extra_decimals() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn json_uses_plain_numbers() {
        assert_eq!(serde_json::to_string(&MoneyCents::new(2000)).unwrap(), "20");
        assert_eq!(serde_json::to_string(&MoneyCents::new(1250)).unwrap(), "12.5");

        let whole: MoneyCents = serde_json::from_str("20").unwrap();
        assert_eq!(whole.cents(), 2000);
        let fractional: MoneyCents = serde_json::from_str("19.99").unwrap();
        assert_eq!(fractional.cents(), 1999);
        let rounded: MoneyCents = serde_json::from_str("0.126").unwrap();
        assert_eq!(rounded.cents(), 13);
        assert!(serde_json::from_str::<MoneyCents>("\"20\"").is_err());
    }

    #[test]
    fn sum_adds_all_amounts() {
        let total: MoneyCents = [MoneyCents::new(150), MoneyCents::new(250)].iter().sum();
        assert_eq!(total, MoneyCents::new(400));
    }
}
