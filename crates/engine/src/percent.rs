//! Percentages kept in integer space.
//!
//! A [`Percent`] counts hundredths of a percent (basis points), so `33.5%` is
//! stored as `3350`. Applying a percentage to an amount never goes through a
//! floating-point value.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{EngineError, MoneyCents};

const BASIS_POINTS_PER_UNIT: i64 = 100;
const WHOLE: i128 = 10_000;

/// A percentage with two decimal digits of precision.
///
/// ```rust
/// use engine::{MoneyCents, Percent};
///
/// let rate: Percent = "6.5".parse().unwrap();
/// assert_eq!(rate.basis_points(), 650);
/// assert_eq!(rate.rounded_of(MoneyCents::new(1000)), Some(MoneyCents::new(65)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Percent = Percent(0);

    /// A whole percentage, e.g. `Percent::whole(10)` is 10%.
    #[must_use]
    pub const fn whole(percent: i64) -> Self {
        Self(percent * BASIS_POINTS_PER_UNIT)
    }

    #[must_use]
    pub const fn from_basis_points(basis_points: i64) -> Self {
        Self(basis_points)
    }

    #[must_use]
    pub const fn basis_points(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `floor(total * self / 100)`, or `None` when it does not fit in cents.
    #[must_use]
    pub fn floor_of(self, total: MoneyCents) -> Option<MoneyCents> {
        let scaled = i128::from(total.cents()) * i128::from(self.0);
        narrow(scaled.div_euclid(WHOLE)).map(MoneyCents::new)
    }

    /// `round(total * self / 100)`, halves away from zero. `None` when it does
    /// not fit in cents.
    #[must_use]
    pub fn rounded_of(self, total: MoneyCents) -> Option<MoneyCents> {
        let scaled = i128::from(total.cents()) * i128::from(self.0);
        let half = WHOLE / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / WHOLE
        } else {
            (scaled - half) / WHOLE
        };
        narrow(rounded).map(MoneyCents::new)
    }

    /// The rate `part / whole`, rounded to the nearest basis point.
    ///
    /// Returns `None` when `whole` is not positive.
    #[must_use]
    pub fn ratio(part: MoneyCents, whole: MoneyCents) -> Option<Self> {
        if !whole.is_positive() {
            return None;
        }
        let scaled = i128::from(part.cents()) * WHOLE;
        let whole = i128::from(whole.cents());
        let rounded = if scaled >= 0 {
            (scaled + whole / 2) / whole
        } else {
            (scaled - whole / 2) / whole
        };
        narrow(rounded).map(Self)
    }
}

fn narrow(value: i128) -> Option<i64> {
    i64::try_from(value).ok()
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let frac = abs % 100;
        match frac {
            0 => write!(f, "{sign}{units}"),
            f10 if f10 % 10 == 0 => write!(f, "{sign}{units}.{}", f10 / 10),
            _ => write!(f, "{sign}{units}.{frac:02}"),
        }
    }
}

impl FromStr for Percent {
    type Err = EngineError;

    /// Parses `"33"`, `"33.5"`, `"12.25"` or `"12.25%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPercentage(format!("invalid percentage: {s}"));

        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (units_str, frac_str) = match digits.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (digits, ""),
        };
        if units_str.is_empty()
            || !units_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
            || frac_str.len() > 2
        {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;
        let frac: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac_str.parse::<i64>().map_err(|_| invalid())?,
        };
        let basis_points = units
            .checked_mul(BASIS_POINTS_PER_UNIT)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -basis_points } else { basis_points }))
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PercentVisitor)
    }
}

struct PercentVisitor;

impl de::Visitor<'_> for PercentVisitor {
    type Value = Percent;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a percentage such as 10, 12.5 or \"12.5%\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Percent, E> {
        v.checked_mul(BASIS_POINTS_PER_UNIT)
            .map(Percent)
            .ok_or_else(|| E::custom("percentage out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Percent, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("percentage out of range"))?;
        self.visit_i64(v)
    }

    // Parsed from the shortest decimal text of the number, not computed.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Percent, E> {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Percent, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_percentages() {
        assert_eq!("33".parse::<Percent>().unwrap(), Percent::whole(33));
        assert_eq!("33.5".parse::<Percent>().unwrap().basis_points(), 3350);
        assert_eq!("12.25%".parse::<Percent>().unwrap().basis_points(), 1225);
        assert_eq!(" 7 % ".parse::<Percent>().unwrap(), Percent::whole(7));
        assert_eq!("-5".parse::<Percent>().unwrap(), Percent::whole(-5));
    }

    #[test]
    fn rejects_malformed_percentages() {
        assert!("".parse::<Percent>().is_err());
        assert!("1.234".parse::<Percent>().is_err());
        assert!("abc".parse::<Percent>().is_err());
        assert!(".5".parse::<Percent>().is_err());
    }

    #[test]
    fn display_drops_trailing_zeros() {
        assert_eq!(Percent::whole(10).to_string(), "10");
        assert_eq!(Percent::from_basis_points(1250).to_string(), "12.5");
        assert_eq!(Percent::from_basis_points(1225).to_string(), "12.25");
        assert_eq!(Percent::from_basis_points(5).to_string(), "0.05");
    }

    #[test]
    fn floor_and_round_stay_in_integer_space() {
        let total = MoneyCents::new(1001);
        assert_eq!(Percent::whole(10).floor_of(total), Some(MoneyCents::new(100)));
        assert_eq!(Percent::whole(10).rounded_of(total), Some(MoneyCents::new(100)));
        assert_eq!(Percent::whole(5).rounded_of(MoneyCents::new(1010)), Some(MoneyCents::new(51)));
        assert_eq!(Percent::whole(5).floor_of(MoneyCents::new(1010)), Some(MoneyCents::new(50)));
    }

    #[test]
    fn out_of_range_results_are_none() {
        let huge = MoneyCents::new(i64::MAX);
        assert_eq!(Percent::whole(200).floor_of(huge), None);
        assert_eq!(Percent::whole(200).rounded_of(huge), None);
        assert_eq!(Percent::whole(100).floor_of(huge), Some(huge));
    }

    #[test]
    fn ratio_rounds_to_basis_points() {
        let rate = Percent::ratio(MoneyCents::new(60), MoneyCents::new(1000)).unwrap();
        assert_eq!(rate, Percent::whole(6));
        let rate = Percent::ratio(MoneyCents::new(1), MoneyCents::new(3)).unwrap();
        assert_eq!(rate.basis_points(), 3333);
        assert!(Percent::ratio(MoneyCents::new(1), MoneyCents::ZERO).is_none());
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let values: Vec<Percent> = serde_json::from_str(r#"[10, 6.5, "12.25", "8%"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Percent::whole(10),
                Percent::from_basis_points(650),
                Percent::from_basis_points(1225),
                Percent::whole(8),
            ]
        );
        assert_eq!(serde_json::to_string(&Percent::from_basis_points(650)).unwrap(), "\"6.5\"");
    }
}
