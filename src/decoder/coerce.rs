//! Conversion of JSON leaf values into little-endian elements.

use half::{bf16, f16};
use serde_json::{Number, Value};
use tensorgate_spec::Precision;

use crate::errors::InputErrorReason;

/// Return the integer value of a number, truncating fractions toward zero.
///
/// Values outside the `i128` range saturate. Narrowing the result with `as`
/// then wraps it to the target width.
fn integer_value(n: &Number) -> i128 {
    if let Some(v) = n.as_u64() {
        v as i128
    } else if let Some(v) = n.as_i64() {
        v as i128
    } else {
        n.as_f64().map(|v| v as i128).unwrap_or(0)
    }
}

fn push_number(precision: Precision, n: &Number, out: &mut Vec<u8>) {
    let float = || n.as_f64().unwrap_or(f64::NAN);
    match precision {
        Precision::Fp64 => out.extend(float().to_le_bytes()),
        Precision::Fp32 | Precision::Undefined => out.extend((float() as f32).to_le_bytes()),
        Precision::Fp16 => out.extend(f16::from_f64(float()).to_le_bytes()),
        Precision::Bf16 => out.extend(bf16::from_f64(float()).to_le_bytes()),
        Precision::I64 => out.extend((integer_value(n) as i64).to_le_bytes()),
        Precision::I32 => out.extend((integer_value(n) as i32).to_le_bytes()),
        Precision::I16 => out.extend((integer_value(n) as i16).to_le_bytes()),
        Precision::I8 => out.extend((integer_value(n) as i8).to_le_bytes()),
        Precision::U64 => out.extend((integer_value(n) as u64).to_le_bytes()),
        Precision::U32 => out.extend((integer_value(n) as u32).to_le_bytes()),
        Precision::U16 => out.extend((integer_value(n) as u16).to_le_bytes()),
        Precision::U8 => out.push(integer_value(n) as u8),
        Precision::Bool => out.push((float() != 0.0) as u8),
    }
}

/// Append the element for a numeric or boolean leaf to `out`.
pub(crate) fn push_leaf(
    precision: Precision,
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<(), InputErrorReason> {
    match value {
        Value::Number(n) => {
            push_number(precision, n, out);
            Ok(())
        }
        Value::Bool(b) if precision == Precision::Bool => {
            out.push(*b as u8);
            Ok(())
        }
        Value::Null => Err(InputErrorReason::Null),
        Value::Bool(_) => Err(InputErrorReason::UnsupportedValue { kind: "boolean" }),
        Value::String(_) => Err(InputErrorReason::UnsupportedValue { kind: "string" }),
        Value::Object(_) => Err(InputErrorReason::UnsupportedValue { kind: "object" }),
        Value::Array(_) => Err(InputErrorReason::UnsupportedValue { kind: "array" }),
    }
}
