use crate::{
    log::{error_type, Error},
    pipe::to_text,
    script::Operator,
};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Return true if the given [`Value`] is truthy.
///
/// Null, false, zero, the empty string and empty collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(bo) => *bo,
        Value::Number(nu) => nu.as_f64().is_some_and(|n| n != 0.0),
        Value::String(st) => !st.is_empty(),
        Value::Array(ar) => !ar.is_empty(),
        Value::Object(ob) => !ob.is_empty(),
        Value::Null => false,
    }
}

/// Return true if the two values are equal, numbers are compared by their
/// numeric value so that `1` equals `1.0`.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, l)| right.get(key).is_some_and(|r| values_equal(l, r)))
        }
        (left, right) => left == right,
    }
}

/// Return a short description of the type of the [`Value`].
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Return a number [`Value`], whole numbers are stored as integers.
pub fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        return Value::from(value as i64);
    }
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Negate a number.
///
/// # Errors
///
/// Returns an [`Error`] if the value is not a number.
pub fn negate(value: &Value) -> Result<Value, Error> {
    match value.as_f64() {
        Some(n) => Ok(number(-n)),
        None => Err(error_type(format!("cannot negate {}", describe(value)))),
    }
}

/// Apply the given [`Operator`] to the two values.
///
/// `&&` and `||` are expected to be evaluated by the caller, as they do not
/// always evaluate their right side.
///
/// # Errors
///
/// Returns an [`Error`] if the `Operator` cannot be applied to the types of
/// the values, or on division by zero.
pub fn apply(left: &Value, operator: Operator, right: &Value) -> Result<Value, Error> {
    let result = match operator {
        Operator::Equal => Value::Bool(values_equal(left, right)),
        Operator::NotEqual => Value::Bool(!values_equal(left, right)),
        Operator::And => {
            if is_truthy(left) {
                right.clone()
            } else {
                left.clone()
            }
        }
        Operator::Or => {
            if is_truthy(left) {
                left.clone()
            } else {
                right.clone()
            }
        }
        Operator::Greater | Operator::Lesser | Operator::GreaterOrEqual | Operator::LesserOrEqual => {
            let ordering = compare(left, right).ok_or_else(|| incompatible(left, operator, right))?;
            Value::Bool(match operator {
                Operator::Greater => ordering == Ordering::Greater,
                Operator::Lesser => ordering == Ordering::Less,
                Operator::GreaterOrEqual => ordering != Ordering::Less,
                _ => ordering != Ordering::Greater,
            })
        }
        Operator::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => arithmetic(l, operator, r)?,
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", to_text(left), to_text(right)))
            }
            _ => return Err(incompatible(left, operator, right)),
        },
        Operator::Subtract | Operator::Multiply | Operator::Divide | Operator::Remainder => {
            match (left, right) {
                (Value::Number(l), Value::Number(r)) => arithmetic(l, operator, r)?,
                _ => return Err(incompatible(left, operator, right)),
            }
        }
    };

    Ok(result)
}

/// Order two numbers, two strings or two booleans.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

fn arithmetic(left: &Number, operator: Operator, right: &Number) -> Result<Value, Error> {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        let checked = match operator {
            Operator::Add => l.checked_add(r),
            Operator::Subtract => l.checked_sub(r),
            Operator::Multiply => l.checked_mul(r),
            _ => None,
        };
        if let Some(result) = checked {
            return Ok(Value::from(result));
        }
    }

    let (l, r) = match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(error_type("number cannot be represented")),
    };
    if r == 0.0 && matches!(operator, Operator::Divide | Operator::Remainder) {
        return Err(error_type("division by zero"));
    }

    Ok(number(match operator {
        Operator::Add => l + r,
        Operator::Subtract => l - r,
        Operator::Multiply => l * r,
        Operator::Divide => l / r,
        _ => l % r,
    }))
}

fn incompatible(left: &Value, operator: Operator, right: &Value) -> Error {
    error_type(format!(
        "operator `{operator}` cannot be applied to {} and {}",
        describe(left),
        describe(right)
    ))
}

#[cfg(test)]
mod tests {
    use super::{apply, is_truthy, negate, values_equal};
    use crate::script::Operator;
    use serde_json::json;

    #[test]
    fn test_truthy() {
        for value in [json!("lorem"), json!(12), json!(-1), json!(0.5), json!(true), json!([0]), json!({"a": 1})] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
        for value in [json!(""), json!(0), json!(0.0), json!(false), json!([]), json!({}), json!(null)] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_equality() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2}])));
        assert!(!values_equal(&json!("1"), &json!(1)));
        assert!(!values_equal(&json!(null), &json!(false)));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(apply(&json!(2), Operator::Add, &json!(3)).unwrap(), json!(5));
        assert_eq!(apply(&json!(7), Operator::Divide, &json!(2)).unwrap(), json!(3.5));
        assert_eq!(apply(&json!(6), Operator::Divide, &json!(2)).unwrap(), json!(3));
        assert_eq!(apply(&json!(7), Operator::Remainder, &json!(4)).unwrap(), json!(3));
        assert_eq!(apply(&json!(0.5), Operator::Multiply, &json!(3)).unwrap(), json!(1.5));
        assert!(apply(&json!(1), Operator::Divide, &json!(0)).is_err());
        assert!(apply(&json!(true), Operator::Add, &json!(false)).is_err());
        assert_eq!(negate(&json!(4)).unwrap(), json!(-4));
        assert!(negate(&json!("a")).is_err());
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(apply(&json!("a"), Operator::Add, &json!(1)).unwrap(), json!("a1"));
        assert_eq!(apply(&json!(null), Operator::Add, &json!("b")).unwrap(), json!("b"));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(apply(&json!(100), Operator::Greater, &json!(50)).unwrap(), json!(true));
        assert_eq!(apply(&json!("a"), Operator::Lesser, &json!("b")).unwrap(), json!(true));
        assert_eq!(apply(&json!(false), Operator::LesserOrEqual, &json!(true)).unwrap(), json!(true));
        assert_eq!(apply(&json!(2), Operator::GreaterOrEqual, &json!(2.0)).unwrap(), json!(true));
        assert!(apply(&json!("hello"), Operator::Greater, &json!(true)).is_err());
    }

    #[test]
    fn test_logical() {
        assert_eq!(apply(&json!(""), Operator::Or, &json!("x")).unwrap(), json!("x"));
        assert_eq!(apply(&json!(1), Operator::And, &json!(0)).unwrap(), json!(0));
    }
}
