// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.3 Operations on Objects](https://tc39.es/ecma262/#sec-operations-on-objects)

use crate::ecmascript::{
    builtins::builtin_function::{builtin_call_or_construct, ArgumentsList, BuiltinFunction},
    execution::{agent::ExceptionType, Agent, JsResult},
    types::Value,
};

/// ### [7.3.14 Call ( F, V \[ , argumentsList \] )](https://tc39.es/ecma262/#sec-call)
pub fn call(
    agent: &mut Agent,
    function: Value,
    this_argument: Value,
    arguments: &[Value],
) -> JsResult<Value> {
    // 2. If IsCallable(F) is false, throw a TypeError exception.
    let Value::BuiltinFunction(index) = function else {
        return Err(agent.throw_exception(ExceptionType::TypeError, "not a function"));
    };
    // 3. Return ? F.[[Call]](V, argumentsList).
    builtin_call_or_construct(
        agent,
        BuiltinFunction(index),
        Some(this_argument),
        ArgumentsList(arguments),
        None,
    )
}

/// ### [7.3.15 Construct ( F \[ , argumentsList \[ , newTarget \] \] )](https://tc39.es/ecma262/#sec-construct)
pub fn construct(agent: &mut Agent, function: Value, arguments: &[Value]) -> JsResult<Value> {
    let Value::BuiltinFunction(index) = function else {
        return Err(agent.throw_exception(ExceptionType::TypeError, "not a constructor"));
    };
    let f = BuiltinFunction(index);
    if !f.is_constructor(agent) {
        return Err(agent.throw_exception(ExceptionType::TypeError, "not a constructor"));
    }
    builtin_call_or_construct(agent, f, None, ArgumentsList(arguments), Some(function))
}
