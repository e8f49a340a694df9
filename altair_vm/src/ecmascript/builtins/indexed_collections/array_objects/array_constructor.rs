// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        builtins::{
            array::array_create,
            builtin_function::{ArgumentsList, Behaviour, Builtin},
        },
        execution::{agent::ExceptionType, Agent, JsResult},
        types::{Object, Value},
    },
    heap::indexed_properties,
};

pub struct ArrayConstructor;

impl Builtin for ArrayConstructor {
    const NAME: &'static str = "Array";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(Self::constructor);
}

impl ArrayConstructor {
    /// ### [23.1.1.1 Array ( ...values )](https://tc39.es/ecma262/#sec-array)
    fn constructor(
        agent: &mut Agent,
        _this_value: Value,
        arguments: ArgumentsList,
        _new_target: Option<Value>,
    ) -> JsResult<Value> {
        // 3. Let numberOfArgs be the number of elements in values.
        // 4. If numberOfArgs = 0, then
        if arguments.is_empty() {
            // a. Return ! ArrayCreate(0, proto).
            return Ok(Value::Array(array_create(agent, 0)));
        }
        // 5. Else if numberOfArgs = 1, then
        if arguments.len() == 1 {
            let len = arguments.get(0);
            // c. If len is not a Number, then
            let length = match len {
                Value::Integer(int) => {
                    // ii. If SameValueZero(intLen, len) is false, throw
                    //     a RangeError exception.
                    u32::try_from(int).map_err(|_| {
                        agent.throw_exception(ExceptionType::RangeError, "Invalid array length")
                    })?
                }
                Value::Number(number) => {
                    let float = agent[number].data;
                    // i. Let intLen be ! ToUint32(len).
                    let int = float as u32;
                    if int as f64 != float {
                        return Err(agent
                            .throw_exception(ExceptionType::RangeError, "Invalid array length"));
                    }
                    int
                }
                // i. Perform ! CreateDataPropertyOrThrow(array, "0", len).
                // ii. Let intLen be 1F.
                _ => {
                    let array = array_create(agent, 1);
                    indexed_properties::put(agent, Object::Array(array), 0, len)?;
                    return Ok(Value::Array(array));
                }
            };
            // iii. Perform ! ArrayCreate(intLen, proto).
            return Ok(Value::Array(array_create(agent, length)));
        }
        // 6. Else,
        // a. Let array be ? ArrayCreate(numberOfArgs, proto).
        let array = array_create(agent, arguments.len() as u32);
        // c. Repeat, while k < numberOfArgs,
        let object = Object::Array(array);
        for (index, &item) in arguments.iter().enumerate() {
            let index = index as u32;
            // ii. Perform ! CreateDataPropertyOrThrow(array, Pk, itemK).
            if indexed_properties::can_put_simple_new(agent, object, index) {
                indexed_properties::put_simple_new(agent, object, index, item);
            } else {
                indexed_properties::put(agent, object, index, item)?;
            }
        }
        // 8. Return array.
        Ok(Value::Array(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::builtins::array::array_length;
    use crate::heap::indexed_properties::get;

    #[test]
    fn no_arguments_makes_an_empty_array() {
        let mut agent = Agent::default();
        let result = ArrayConstructor::constructor(
            &mut agent,
            Value::Undefined,
            ArgumentsList::default(),
            None,
        )
        .unwrap();
        let Value::Array(array) = result else {
            panic!("expected an array");
        };
        assert_eq!(array_length(&agent, array), 0);
    }

    #[test]
    fn single_number_argument_sets_the_length() {
        let mut agent = Agent::default();
        let result = ArrayConstructor::constructor(
            &mut agent,
            Value::Undefined,
            ArgumentsList::new(&[Value::Integer(7)]),
            None,
        )
        .unwrap();
        let Value::Array(array) = result else {
            panic!("expected an array");
        };
        assert_eq!(array_length(&agent, array), 7);
        assert_eq!(get(&mut agent, Object::Array(array), 0).unwrap(), None);
    }

    #[test]
    fn non_integral_length_is_a_range_error() {
        let mut agent = Agent::default();
        let half = Value::from_f64(&mut agent, 1.5);
        assert!(ArrayConstructor::constructor(
            &mut agent,
            Value::Undefined,
            ArgumentsList::new(&[half]),
            None,
        )
        .is_err());
        assert!(ArrayConstructor::constructor(
            &mut agent,
            Value::Undefined,
            ArgumentsList::new(&[Value::Integer(-1)]),
            None,
        )
        .is_err());
    }

    #[test]
    fn single_non_number_argument_becomes_the_element() {
        let mut agent = Agent::default();
        let result = ArrayConstructor::constructor(
            &mut agent,
            Value::Undefined,
            ArgumentsList::new(&[Value::Boolean(true)]),
            None,
        )
        .unwrap();
        let Value::Array(array) = result else {
            panic!("expected an array");
        };
        assert_eq!(array_length(&agent, array), 1);
        assert_eq!(
            get(&mut agent, Object::Array(array), 0).unwrap(),
            Some(Value::Boolean(true))
        );
    }

    #[test]
    fn several_arguments_become_the_elements() {
        let mut agent = Agent::default();
        let result = ArrayConstructor::constructor(
            &mut agent,
            Value::Undefined,
            ArgumentsList::new(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
            None,
        )
        .unwrap();
        let Value::Array(array) = result else {
            panic!("expected an array");
        };
        assert_eq!(array_length(&agent, array), 3);
        assert_eq!(
            get(&mut agent, Object::Array(array), 2).unwrap(),
            Some(Value::Integer(3))
        );
    }
}
