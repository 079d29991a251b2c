use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

macro_rules! num_cmp_right {
    ($left:expr, $right:expr, $op:ident) => {
        if let Some(b) = $right.as_u64() {
            NumCmp::$op($left, b)
        } else if let Some(b) = $right.as_i64() {
            NumCmp::$op($left, b)
        } else {
            NumCmp::$op($left, $right.as_f64().expect("Always valid"))
        }
    };
}

macro_rules! num_cmp_numbers {
    ($left:expr, $right:expr, $op:ident) => {
        if let Some(a) = $left.as_u64() {
            num_cmp_right!(a, $right, $op)
        } else if let Some(a) = $left.as_i64() {
            num_cmp_right!(a, $right, $op)
        } else {
            num_cmp_right!($left.as_f64().expect("Always valid"), $right, $op)
        }
    };
}

#[inline]
pub(crate) fn num_eq(left: &Number, right: &Number) -> bool {
    num_cmp_numbers!(left, right, num_eq)
}

#[inline]
pub(crate) fn num_lt(left: &Number, right: &Number) -> bool {
    num_cmp_numbers!(left, right, num_lt)
}

#[inline]
pub(crate) fn num_le(left: &Number, right: &Number) -> bool {
    num_cmp_numbers!(left, right, num_le)
}

#[inline]
pub(crate) fn num_gt(left: &Number, right: &Number) -> bool {
    num_cmp_numbers!(left, right, num_gt)
}

#[inline]
pub(crate) fn num_ge(left: &Number, right: &Number) -> bool {
    num_cmp_numbers!(left, right, num_ge)
}

/// Whether the number is whole, i.e. satisfies the `integer` type across
/// representations (`1.0` counts).
#[inline]
pub(crate) fn is_whole_number(number: &Number) -> bool {
    number.is_u64()
        || number.is_i64()
        || number.as_f64().expect("Always valid").fract() == 0.
}

#[inline]
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => num_eq(left, right),
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[inline]
pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right.iter()).all(|(a, b)| equal(a, b))
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|((ka, va), (kb, vb))| ka == kb && equal(va, vb))
}

#[cfg(test)]
mod tests {
    use super::equal;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!(1), &json!(1.0))]
    #[test_case(&json!([2]), &json!([2.0]))]
    #[test_case(&json!([-3]), &json!([-3.0]))]
    #[test_case(&json!({"a": 1}), &json!({"a": 1.0}))]
    fn are_equal(left: &Value, right: &Value) {
        assert!(equal(left, right))
    }

    #[test_case(&json!(1), &json!(2.0))]
    #[test_case(&json!([]), &json!(["foo"]))]
    #[test_case(&json!([-3]), &json!([-4.0]))]
    #[test_case(&json!({"a": 1}), &json!({"a": 1.0, "b": 2}))]
    fn are_not_equal(left: &Value, right: &Value) {
        assert!(!equal(left, right))
    }
}
