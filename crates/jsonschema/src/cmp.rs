//! Structural comparison of JSON values.
//!
//! Numbers compare by value regardless of their representation, so `1`, `1.0` and `-0` / `0`
//! are interchangeable in `enum`, `const` and `uniqueItems`.
use std::cmp::Ordering;

use fraction::{BigFraction, BigUint};
use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

/// Deep equality: object key order is ignored, array order is not.
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => compare(left, right) == Some(Ordering::Equal),
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(left, right)| equal(left, right))
}

fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| equal(value, other)))
}

/// Whether no two items are deeply equal.
pub(crate) fn is_unique(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(idx, item)| items[idx + 1..].iter().all(|other| !equal(item, other)))
}

/// Numeric ordering across `u64`, `i64` and `f64` representations.
pub(crate) fn compare(left: &Number, right: &Number) -> Option<Ordering> {
    if let Some(left) = left.as_u64() {
        compare_with(left, right)
    } else if let Some(left) = left.as_i64() {
        compare_with(left, right)
    } else {
        compare_with(left.as_f64()?, right)
    }
}

fn compare_with<T>(left: T, right: &Number) -> Option<Ordering>
where
    T: NumCmp<u64> + NumCmp<i64> + NumCmp<f64>,
{
    if let Some(right) = right.as_u64() {
        NumCmp::num_cmp(left, right)
    } else if let Some(right) = right.as_i64() {
        NumCmp::num_cmp(left, right)
    } else {
        NumCmp::num_cmp(left, right.as_f64()?)
    }
}

/// Whether `value` is an integral multiple of the (positive) `multiple`.
#[allow(clippy::float_cmp)]
pub(crate) fn is_multiple_of(value: &Number, multiple: &Number) -> bool {
    if let Some(multiple) = multiple.as_u64() {
        if let Some(value) = value.as_u64() {
            return value % multiple == 0;
        }
        if let Some(value) = value.as_i64() {
            return value.unsigned_abs() % multiple == 0;
        }
    }
    let (Some(value_f64), Some(multiple_f64)) = (value.as_f64(), multiple.as_f64()) else {
        return false;
    };
    if multiple_f64.fract() == 0. {
        return value_f64.fract() == 0. && (value_f64 % multiple_f64) == 0.;
    }
    // Fractional divisors are compared exactly, on the decimal text of both numbers
    let (Some(value), Some(multiple)) = (decimal(value), decimal(multiple)) else {
        return false;
    };
    let quotient = value / multiple;
    quotient
        .denom()
        .is_some_and(|denom| denom == &BigUint::from(1_u8))
}

/// Exact absolute value of a JSON number, read from its decimal representation.
fn decimal(number: &Number) -> Option<BigFraction> {
    let text = number.to_string();
    let text = text.trim_start_matches('-');
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");
    let numerator = BigUint::parse_bytes(digits.as_bytes(), 10)?;
    let scale = exponent - i64::try_from(fraction.len()).ok()?;
    let power = BigUint::from(10_u8).pow(u32::try_from(scale.unsigned_abs()).ok()?);
    if scale >= 0 {
        Some(BigFraction::new(numerator * power, BigUint::from(1_u8)))
    } else {
        Some(BigFraction::new(numerator, power))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(&json!(1), &json!(1.0), true; "integer and float")]
    #[test_case(&json!(-1), &json!(-1.0), true; "negative integer and float")]
    #[test_case(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1}), true; "key order")]
    #[test_case(&json!([1, 2]), &json!([2, 1]), false; "array order")]
    #[test_case(&json!({"a": 1}), &json!({"a": 1, "b": 2}), false; "extra key")]
    #[test_case(&json!({"a": [1, {"b": null}]}), &json!({"a": [1.0, {"b": null}]}), true; "nested")]
    #[test_case(&json!(0), &json!(false), false; "zero is not false")]
    #[test_case(&json!(""), &json!(null), false; "empty string is not null")]
    fn test_equal(left: &Value, right: &Value, expected: bool) {
        assert_eq!(equal(left, right), expected);
        assert_eq!(equal(right, left), expected);
    }

    #[test_case(&json!([1, 2, 3]), true)]
    #[test_case(&json!([1, 2, 1.0]), false)]
    #[test_case(&json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}]), false)]
    #[test_case(&json!([[1], [true]]), true)]
    #[test_case(&json!([]), true)]
    fn test_is_unique(items: &Value, expected: bool) {
        let items = items.as_array().expect("Array");
        assert_eq!(is_unique(items), expected);
    }

    #[test_case(&json!(5), &json!(5.0), Some(Ordering::Equal))]
    #[test_case(&json!(-1), &json!(0), Some(Ordering::Less))]
    #[test_case(&json!(u64::MAX), &json!(-1), Some(Ordering::Greater))]
    #[test_case(&json!(2.5), &json!(2), Some(Ordering::Greater))]
    fn test_compare(left: &Value, right: &Value, expected: Option<Ordering>) {
        let (Value::Number(left), Value::Number(right)) = (left, right) else {
            panic!("Numbers expected");
        };
        assert_eq!(compare(left, right), expected);
    }

    #[test_case(&json!(10), &json!(2), true)]
    #[test_case(&json!(-10), &json!(5), true)]
    #[test_case(&json!(7), &json!(2), false)]
    #[test_case(&json!(4.0), &json!(2), true)]
    #[test_case(&json!(4.5), &json!(2), false)]
    #[test_case(&json!(4.5), &json!(1.5), true)]
    #[test_case(&json!(0.0075), &json!(0.0001), true)]
    #[test_case(&json!(0.00751), &json!(0.0001), false)]
    #[test_case(&json!(1e308), &json!(0.123_456_789), false; "float overflow")]
    #[test_case(&json!(0.3), &json!(0.1), true; "decimal tenths")]
    #[test_case(&json!(0.7), &json!(0.1), true; "decimal tenths above half")]
    #[test_case(&json!(1.1), &json!(0.1), true; "decimal above one")]
    #[test_case(&json!(19.99), &json!(0.01), true; "decimal cents")]
    #[test_case(&json!(-0.6), &json!(0.2), true; "negative decimal")]
    #[test_case(&json!(0.35), &json!(0.1), false; "decimal remainder")]
    #[test_case(&json!(3), &json!(0.5), true; "integer and decimal divisor")]
    #[test_case(&json!(1e-7), &json!(1e-8), true; "exponent notation")]
    fn test_is_multiple_of(value: &Value, multiple: &Value, expected: bool) {
        let (Value::Number(value), Value::Number(multiple)) = (value, multiple) else {
            panic!("Numbers expected");
        };
        assert_eq!(is_multiple_of(value, multiple), expected);
    }
}
