/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Decimal wire codec.
//!
//! A decimal travels as two stop-bit integers, exponent first, then
//! mantissa. Only the exponent takes part in the nullable scheme: a null
//! exponent stands for the whole value being null and no mantissa follows.

use crate::integer;
use fastwire_core::{DecimalValue, RepError, Result};
use std::io::Read;

fn check_exponent(exponent: i32) -> Result<()> {
    if DecimalValue::exponent_in_range(exponent) {
        Ok(())
    } else {
        Err(RepError::ExponentOutOfRange { exponent }.into())
    }
}

/// Appends a mandatory decimal.
///
/// # Errors
/// [`RepError::ExponentOutOfRange`] outside `[-63, 63]`.
pub fn encode_decimal(buf: &mut Vec<u8>, value: DecimalValue) -> Result<()> {
    check_exponent(value.exponent)?;
    integer::encode_i64(buf, i64::from(value.exponent));
    integer::encode_i64(buf, value.mantissa);
    Ok(())
}

/// Appends a nullable decimal.
///
/// # Errors
/// As [`encode_decimal`].
pub fn encode_decimal_nullable(buf: &mut Vec<u8>, value: Option<DecimalValue>) -> Result<()> {
    match value {
        None => {
            buf.push(0x80);
            Ok(())
        }
        Some(v) => {
            check_exponent(v.exponent)?;
            integer::encode_i64_nullable(buf, Some(i64::from(v.exponent)))?;
            integer::encode_i64(buf, v.mantissa);
            Ok(())
        }
    }
}

/// Reads a mandatory decimal.
///
/// # Errors
/// [`RepError::ExponentOutOfRange`] outside `[-63, 63]`, plus the integer
/// codec failures.
pub fn decode_decimal<R: Read>(reader: &mut R) -> Result<DecimalValue> {
    let exponent = integer::decode_i64(reader)?;
    // Consume the mantissa before the range check so a lenient caller
    // stays aligned with the stream.
    let mantissa = integer::decode_i64(reader)?;
    let exponent = narrow_exponent(exponent)?;
    Ok(DecimalValue::new(mantissa, exponent))
}

/// Reads a nullable decimal. A null exponent consumes no mantissa.
///
/// # Errors
/// As [`decode_decimal`].
pub fn decode_decimal_nullable<R: Read>(reader: &mut R) -> Result<Option<DecimalValue>> {
    let Some(exponent) = integer::decode_i64_nullable(reader)? else {
        return Ok(None);
    };
    let mantissa = integer::decode_i64(reader)?;
    let exponent = narrow_exponent(exponent)?;
    Ok(Some(DecimalValue::new(mantissa, exponent)))
}

fn narrow_exponent(raw: i64) -> Result<i32> {
    let exponent = i32::try_from(raw).map_err(|_| RepError::ExponentOutOfRange {
        exponent: raw.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
    })?;
    check_exponent(exponent)?;
    Ok(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_mandatory_round_trip() {
        let value = DecimalValue::new(942_755, -2);
        let mut buf = Vec::new();
        encode_decimal(&mut buf, value).unwrap();
        // Exponent -2 then mantissa 942755.
        assert_eq!(buf[0], 0xFE);
        let decoded = decode_decimal(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_nullable_null_consumes_single_byte() {
        let mut buf = Vec::new();
        encode_decimal_nullable(&mut buf, None).unwrap();
        assert_eq!(buf, vec![0x80]);

        // A following byte must remain unread.
        let mut cursor = Cursor::new(vec![0x80, 0xAB]);
        assert_eq!(decode_decimal_nullable(&mut cursor).unwrap(), None);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_nullable_shifts_exponent() {
        let value = DecimalValue::new(123, 1);
        let mut buf = Vec::new();
        encode_decimal_nullable(&mut buf, Some(value)).unwrap();
        // Exponent 1 travels as 2 under the nullable shift.
        assert_eq!(buf[0], 0x82);
        let decoded = decode_decimal_nullable(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, Some(value));
    }

    #[test]
    fn test_exponent_range_enforced() {
        let mut buf = Vec::new();
        assert!(encode_decimal(&mut buf, DecimalValue::new(1, 64)).is_err());
        assert!(encode_decimal(&mut buf, DecimalValue::new(1, -64)).is_err());

        let mut wire = Vec::new();
        integer::encode_i64(&mut wire, 70);
        integer::encode_i64(&mut wire, 1);
        assert!(decode_decimal(&mut Cursor::new(wire)).is_err());
    }

    #[test]
    fn test_negative_mantissa() {
        let value = DecimalValue::new(-9_427_550, -3);
        let mut buf = Vec::new();
        encode_decimal(&mut buf, value).unwrap();
        assert_eq!(decode_decimal(&mut Cursor::new(&buf)).unwrap(), value);
    }
}
