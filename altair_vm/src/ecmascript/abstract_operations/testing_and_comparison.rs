// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.2 Testing and Comparison Operations](https://tc39.es/ecma262/#sec-testing-and-comparison-operations)

use crate::ecmascript::{execution::Agent, types::Value};

/// ### [7.2.3 IsCallable ( argument )](https://tc39.es/ecma262/#sec-iscallable)
pub fn is_callable(value: Value) -> bool {
    value.is_function()
}

fn numeric_value(agent: &Agent, value: Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(i as f64),
        Value::Number(n) => Some(agent[n].data),
        _ => None,
    }
}

/// ### [7.2.13 IsStrictlyEqual ( x, y )](https://tc39.es/ecma262/#sec-isstrictlyequal)
pub fn is_strictly_equal(agent: &Agent, x: Value, y: Value) -> bool {
    // 2. If x is a Number, return Number::equal(x, y). NaN is unequal to
    //    everything, and the integer and heap representations of the same
    //    mathematical value are equal.
    if let (Some(x), Some(y)) = (numeric_value(agent, x), numeric_value(agent, y)) {
        return x == y;
    }
    match (x, y) {
        (Value::String(x), Value::String(y)) => {
            x == y || agent[x].as_wtf8() == agent[y].as_wtf8()
        }
        _ => x == y,
    }
}

/// ### [7.2.10 SameValueZero ( x, y )](https://tc39.es/ecma262/#sec-samevaluezero)
///
/// Like strict equality except NaN equals NaN. Used by `includes`.
pub fn same_value_zero(agent: &Agent, x: Value, y: Value) -> bool {
    if let (Some(x), Some(y)) = (numeric_value(agent, x), numeric_value(agent, y)) {
        return x == y || (x.is_nan() && y.is_nan());
    }
    is_strictly_equal(agent, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::types::StringHeapData;
    use crate::heap::CreateHeapData;

    #[test]
    fn numeric_equality_across_representations() {
        let mut agent = Agent::default();
        let heap_two = Value::from_f64(&mut agent, 2.0000000000000004);
        assert!(!is_strictly_equal(&agent, Value::Integer(2), heap_two));
        let nan = Value::from_f64(&mut agent, f64::NAN);
        assert!(!is_strictly_equal(&agent, nan, nan));
        assert!(same_value_zero(&agent, nan, nan));
    }

    #[test]
    fn string_equality_compares_content() {
        let mut agent = Agent::default();
        let a = Value::String(agent.heap.create(StringHeapData::from_str("abc")));
        let b = Value::String(agent.heap.create(StringHeapData::from_str("abc")));
        let c = Value::String(agent.heap.create(StringHeapData::from_str("abd")));
        assert!(is_strictly_equal(&agent, a, b));
        assert!(!is_strictly_equal(&agent, a, c));
    }
}
