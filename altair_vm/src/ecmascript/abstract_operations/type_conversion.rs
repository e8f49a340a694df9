// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.1 Type Conversion](https://tc39.es/ecma262/#sec-type-conversion)
//!
//! Only the conversions the indexed storage layer and the array builtins
//! consume. Object-to-primitive coercion protocols are out of scope;
//! coercing an object is a TypeError here.

use crate::{
    ecmascript::{
        execution::{agent::ExceptionType, Agent, JsResult},
        types::Value,
    },
    heap::{indexes::StringIndex, CreateHeapData},
};
use num_traits::ToPrimitive;

/// ### [7.1.2 ToBoolean ( argument )](https://tc39.es/ecma262/#sec-toboolean)
pub fn to_boolean(agent: &Agent, value: Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => b,
        Value::Integer(i) => i != 0,
        Value::Number(n) => {
            let data = agent[n].data;
            !(data == 0.0 || data.is_nan())
        }
        Value::String(s) => !agent[s].is_empty(),
        _ => true,
    }
}

/// ### [7.1.4 ToNumber ( argument )](https://tc39.es/ecma262/#sec-tonumber)
///
/// Returns the converted value directly as an f64.
pub fn to_number_f64(agent: &mut Agent, value: Value) -> JsResult<f64> {
    match value {
        // 3. If argument is undefined, return NaN.
        Value::Undefined => Ok(f64::NAN),
        // 4. If argument is either null or false, return +0𝔽.
        Value::Null => Ok(0.0),
        Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
        // 1. If argument is a Number, return argument.
        Value::Integer(i) => Ok(i as f64),
        Value::Number(n) => Ok(agent[n].data),
        // 6. If argument is a String, return StringToNumber(argument).
        Value::String(s) => {
            let Some(str) = agent[s].as_str() else {
                return Ok(f64::NAN);
            };
            Ok(string_to_number(str))
        }
        // 9. Else: object coercion would run ToPrimitive; unsupported.
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "cannot convert value to number")),
    }
}

/// ### [7.1.4.1.1 StringToNumber ( str )](https://tc39.es/ecma262/#sec-stringtonumber)
fn string_to_number(str: &str) -> f64 {
    let trimmed = str.trim_matches(|c: char| c.is_whitespace());
    if trimmed.is_empty() {
        return 0.0;
    }
    // Non-decimal integer literals sit outside fast-float's grammar.
    if let Some(digits) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return radix_digits_to_number(digits, 16);
    }
    if let Some(digits) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return radix_digits_to_number(digits, 8);
    }
    if let Some(digits) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return radix_digits_to_number(digits, 2);
    }
    fast_float::parse::<f64, _>(trimmed).unwrap_or(f64::NAN)
}

fn radix_digits_to_number(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut result = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(digit) => result = result * radix as f64 + digit as f64,
            None => return f64::NAN,
        }
    }
    result
}

/// ### [7.1.5 ToIntegerOrInfinity ( argument )](https://tc39.es/ecma262/#sec-tointegerorinfinity)
pub fn to_integer_or_infinity(agent: &mut Agent, value: Value) -> JsResult<f64> {
    // 1. Let number be ? ToNumber(argument).
    let number = to_number_f64(agent, value)?;
    // 2. If number is one of NaN, +0𝔽, or -0𝔽, return 0.
    if number.is_nan() || number == 0.0 {
        return Ok(0.0);
    }
    // 3.-4. Infinities pass through.
    // 5. Return truncate(ℝ(number)).
    Ok(number.trunc())
}

/// ### [7.1.7 ToUint32 ( argument )](https://tc39.es/ecma262/#sec-touint32)
pub fn to_uint32(agent: &mut Agent, value: Value) -> JsResult<u32> {
    let number = to_number_f64(agent, value)?;
    if !number.is_finite() {
        return Ok(0);
    }
    let modulus = 4294967296.0;
    let wrapped = number.trunc() % modulus;
    let wrapped = if wrapped < 0.0 {
        wrapped + modulus
    } else {
        wrapped
    };
    Ok(wrapped as u32)
}

/// ### [7.1.20 ToLength ( argument )](https://tc39.es/ecma262/#sec-tolength)
pub fn to_length(agent: &mut Agent, value: Value) -> JsResult<i64> {
    // 1. Let len be ? ToIntegerOrInfinity(argument).
    let len = to_integer_or_infinity(agent, value)?;
    // 2. If len ≤ 0, return +0𝔽.
    if len <= 0.0 {
        return Ok(0);
    }
    // 3. Return 𝔽(min(len, 2**53 - 1)).
    Ok(len
        .min(2f64.powi(53) - 1.0)
        .to_i64()
        .expect("length did not fit an i64"))
}

/// ### [7.1.17 ToString ( argument )](https://tc39.es/ecma262/#sec-tostring)
pub fn to_string(agent: &mut Agent, value: Value) -> JsResult<StringIndex> {
    let string = match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(true) => "true".to_string(),
        Value::Boolean(false) => "false".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => {
            let data = agent[n].data;
            number_to_string(data)
        }
        Value::String(s) => return Ok(s),
        _ => {
            return Err(
                agent.throw_exception(ExceptionType::TypeError, "cannot convert value to string")
            );
        }
    };
    Ok(agent.heap.create(crate::ecmascript::types::StringHeapData::from(string)))
}

/// ### [6.1.6.1.20 Number::toString ( x, radix )](https://tc39.es/ecma262/#sec-numeric-types-number-tostring)
pub(crate) fn number_to_string(data: f64) -> String {
    if data.is_nan() {
        "NaN".to_string()
    } else if data.is_infinite() {
        if data > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        let mut buffer = ryu_js::Buffer::new();
        buffer.format_finite(data).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_number_cases() {
        assert_eq!(string_to_number("  42  "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("   "), 0.0);
        assert_eq!(string_to_number("1.5e3"), 1500.0);
        assert!(string_to_number("12abc").is_nan());
    }

    #[test]
    fn string_to_number_non_decimal_literals() {
        assert_eq!(string_to_number("0x2A"), 42.0);
        assert_eq!(string_to_number("  0XfF  "), 255.0);
        assert_eq!(string_to_number("0o17"), 15.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert!(string_to_number("0x").is_nan());
        assert!(string_to_number("0xg1").is_nan());
        assert!(string_to_number("-0x10").is_nan());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(1e21), "1e+21");
    }

    #[test]
    fn uint32_wrapping() {
        let mut agent = Agent::default();
        assert_eq!(to_uint32(&mut agent, Value::Integer(-1)).unwrap(), u32::MAX);
        assert_eq!(to_uint32(&mut agent, Value::Undefined).unwrap(), 0);
        let big = Value::from_f64(&mut agent, 4294967297.0);
        assert_eq!(to_uint32(&mut agent, big).unwrap(), 1);
    }
}
