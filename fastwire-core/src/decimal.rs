/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Exact decimal values as mantissa/exponent pairs.
//!
//! FAST decimals travel as two stop-bit integers and must survive the codec
//! without rounding, so the value type keeps the wire representation and
//! converts through [`rust_decimal::Decimal`] only at the edges.

use crate::error::{RepError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decimal as `mantissa * 10^exponent`, exactly as it appears on the wire.
///
/// Construction keeps the pair as given; `7E1` and `70E0` are distinct
/// values even though they denote the same number. Conversion from
/// [`Decimal`] normalizes by stripping trailing zeros from the mantissa.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord,
)]
pub struct DecimalValue {
    /// The scaled integer value.
    pub mantissa: i64,
    /// Power-of-ten scale; negative moves the point left.
    pub exponent: i32,
}

impl DecimalValue {
    /// Smallest exponent representable on the wire.
    pub const MIN_EXPONENT: i32 = -63;
    /// Largest exponent representable on the wire.
    pub const MAX_EXPONENT: i32 = 63;

    /// Creates a decimal from an explicit mantissa/exponent pair.
    #[must_use]
    pub const fn new(mantissa: i64, exponent: i32) -> Self {
        Self { mantissa, exponent }
    }

    /// Converts an exact decimal into mantissa/exponent form.
    ///
    /// Trailing zeros move from the mantissa into the exponent, so
    /// `9427.55` becomes `942755E-2` and `100` becomes `1E2`.
    ///
    /// # Errors
    /// Returns [`RepError::NumericOverflow`] when the normalized mantissa
    /// does not fit a signed 64-bit integer.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        let mut mantissa = value.mantissa();
        let mut scale = i32::try_from(value.scale()).unwrap_or(i32::MAX);

        while mantissa != 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }

        let mantissa = i64::try_from(mantissa).map_err(|_| RepError::NumericOverflow {
            value: value.to_string(),
            target: "decimal mantissa",
        })?;

        Ok(Self {
            mantissa,
            exponent: -scale,
        })
    }

    /// Converts back to an exact [`Decimal`].
    ///
    /// # Errors
    /// Returns [`RepError::NumericOverflow`] when the value falls outside
    /// the 96-bit/scale-28 envelope `Decimal` can hold.
    pub fn to_decimal(&self) -> Result<Decimal> {
        let overflow = || {
            RepError::NumericOverflow {
                value: self.to_string(),
                target: "decimal",
            }
            .into()
        };

        if self.exponent < 0 {
            let scale = self.exponent.unsigned_abs();
            Decimal::try_from_i128_with_scale(i128::from(self.mantissa), scale)
                .map_err(|_| overflow())
        } else {
            let mut value = Decimal::from(self.mantissa);
            for _ in 0..self.exponent {
                value = value.checked_mul(Decimal::TEN).ok_or_else(overflow)?;
            }
            Ok(value)
        }
    }

    /// Converts to an integer when the value has no fractional part.
    ///
    /// # Errors
    /// Returns [`RepError::DecimalCantConvertToInt`] when a fraction would
    /// be lost, or [`RepError::NumericOverflow`] when the scaled value does
    /// not fit 64 bits.
    pub fn to_i64(&self) -> Result<i64> {
        if self.exponent >= 0 {
            let mut value = self.mantissa;
            for _ in 0..self.exponent {
                value = value.checked_mul(10).ok_or_else(|| RepError::NumericOverflow {
                    value: self.to_string(),
                    target: "i64",
                })?;
            }
            return Ok(value);
        }

        // A 64-bit mantissa has at most 19 digits, so a deeper scale can
        // only be integral when the mantissa is zero.
        let scale = u32::try_from(-i64::from(self.exponent)).unwrap_or(u32::MAX);
        let Some(divisor) = 10i64.checked_pow(scale) else {
            if self.mantissa == 0 {
                return Ok(0);
            }
            return Err(RepError::DecimalCantConvertToInt {
                value: self.to_string(),
            }
            .into());
        };

        if self.mantissa % divisor != 0 {
            return Err(RepError::DecimalCantConvertToInt {
                value: self.to_string(),
            }
            .into());
        }
        Ok(self.mantissa / divisor)
    }

    /// Converts to floating point, rounding once at the end.
    ///
    /// # Errors
    /// Returns [`RepError::NumericOverflow`] when no finite approximation
    /// exists.
    pub fn to_f64(&self) -> Result<f64> {
        match self.to_decimal() {
            Ok(value) => value.to_f64().ok_or_else(|| {
                RepError::NumericOverflow {
                    value: self.to_string(),
                    target: "f64",
                }
                .into()
            }),
            // Exponents beyond Decimal's envelope still have a float form.
            Err(_) => {
                let approx = self.mantissa as f64 * 10f64.powi(self.exponent);
                if approx.is_finite() {
                    Ok(approx)
                } else {
                    Err(RepError::NumericOverflow {
                        value: self.to_string(),
                        target: "f64",
                    }
                    .into())
                }
            }
        }
    }

    /// Returns true when the exponent fits the wire range `[-63, 63]`.
    #[must_use]
    pub const fn exponent_in_range(exponent: i32) -> bool {
        exponent >= Self::MIN_EXPONENT && exponent <= Self::MAX_EXPONENT
    }
}

impl From<i64> for DecimalValue {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}E{}", self.mantissa, self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_decimal_normalizes_trailing_zeros() {
        let value = DecimalValue::from_decimal(Decimal::from_str("9427.55").unwrap()).unwrap();
        assert_eq!(value.mantissa, 942755);
        assert_eq!(value.exponent, -2);

        let value = DecimalValue::from_decimal(Decimal::from_str("100").unwrap()).unwrap();
        assert_eq!(value.mantissa, 1);
        assert_eq!(value.exponent, 2);

        let value = DecimalValue::from_decimal(Decimal::from_str("1.2").unwrap()).unwrap();
        assert_eq!(value.mantissa, 12);
        assert_eq!(value.exponent, -1);

        let value = DecimalValue::from_decimal(Decimal::ZERO).unwrap();
        assert_eq!(value.mantissa, 0);
    }

    #[test]
    fn test_explicit_pair_is_kept() {
        let value = DecimalValue::new(70, 0);
        assert_ne!(value, DecimalValue::new(7, 1));
        assert_eq!(value.mantissa, 70);
        assert_eq!(value.exponent, 0);
    }

    #[test]
    fn test_to_i64_integral() {
        assert_eq!(DecimalValue::new(100, 0).to_i64().unwrap(), 100);
        assert_eq!(DecimalValue::new(1, 2).to_i64().unwrap(), 100);
        assert_eq!(DecimalValue::new(12300, -2).to_i64().unwrap(), 123);
        assert_eq!(DecimalValue::new(0, -40).to_i64().unwrap(), 0);
    }

    #[test]
    fn test_to_i64_rejects_fraction() {
        let err = DecimalValue::new(1001, -1).to_i64().unwrap_err();
        assert!(matches!(
            err,
            crate::error::FastError::Repr(RepError::DecimalCantConvertToInt { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_decimal() {
        let original = Decimal::from_str("10000000000.00000001").unwrap();
        let value = DecimalValue::from_decimal(original).unwrap();
        assert_eq!(value.mantissa, 1000000000000000001);
        assert_eq!(value.exponent, -8);
        assert_eq!(value.to_decimal().unwrap(), original);
    }

    #[test]
    fn test_exponent_range() {
        assert!(DecimalValue::exponent_in_range(63));
        assert!(DecimalValue::exponent_in_range(-63));
        assert!(!DecimalValue::exponent_in_range(64));
        assert!(!DecimalValue::exponent_in_range(-64));
    }

    #[test]
    fn test_to_f64() {
        let value = DecimalValue::new(942755, -2);
        assert!((value.to_f64().unwrap() - 9427.55).abs() < 1e-9);
    }
}
