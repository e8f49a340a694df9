// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.1.3 Properties of the Array Prototype Object](https://tc39.es/ecma262/#sec-properties-of-the-array-prototype-object)

use wtf8::Wtf8Buf;

use crate::{
    ecmascript::{
        abstract_operations::{
            testing_and_comparison::{is_strictly_equal, same_value_zero},
            type_conversion::{to_integer_or_infinity, to_string},
        },
        builtins::{
            array::{array_create, array_length, array_set_length, is_simple_array},
            builtin_function::{ArgumentsList, Behaviour, Builtin},
        },
        execution::{agent::ExceptionType, Agent, JsResult},
        types::{Object, StringHeapData, Value},
    },
    heap::{
        indexed_properties::{
            self, chain::ArrayPropertyIterator, iterator::IndexedPropertyIterator,
        },
        indexes::ArrayIndex,
        CreateHeapData,
    },
};

pub struct ArrayPrototype;

pub struct ArrayPrototypePush;
impl Builtin for ArrayPrototypePush {
    const NAME: &'static str = "push";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::push);
}
pub struct ArrayPrototypePop;
impl Builtin for ArrayPrototypePop {
    const NAME: &'static str = "pop";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::pop);
}
pub struct ArrayPrototypeShift;
impl Builtin for ArrayPrototypeShift {
    const NAME: &'static str = "shift";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::shift);
}
pub struct ArrayPrototypeUnshift;
impl Builtin for ArrayPrototypeUnshift {
    const NAME: &'static str = "unshift";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::unshift);
}
pub struct ArrayPrototypeSplice;
impl Builtin for ArrayPrototypeSplice {
    const NAME: &'static str = "splice";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::splice);
}
pub struct ArrayPrototypeJoin;
impl Builtin for ArrayPrototypeJoin {
    const NAME: &'static str = "join";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::join);
}
pub struct ArrayPrototypeIndexOf;
impl Builtin for ArrayPrototypeIndexOf {
    const NAME: &'static str = "indexOf";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::index_of);
}
pub struct ArrayPrototypeLastIndexOf;
impl Builtin for ArrayPrototypeLastIndexOf {
    const NAME: &'static str = "lastIndexOf";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::last_index_of);
}
pub struct ArrayPrototypeIncludes;
impl Builtin for ArrayPrototypeIncludes {
    const NAME: &'static str = "includes";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::includes);
}
pub struct ArrayPrototypeReverse;
impl Builtin for ArrayPrototypeReverse {
    const NAME: &'static str = "reverse";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(ArrayPrototype::reverse);
}

/// The length-mutating methods require an array receiver; there is no
/// generic array-like protocol to fall back to.
fn require_array(agent: &mut Agent, this_value: Value) -> JsResult<ArrayIndex> {
    match this_value {
        Value::Array(array) => Ok(array),
        _ => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Array method called on a non-array receiver",
        )),
    }
}

/// Read-only methods accept any indexed-property owner; a typed array
/// or buffer reports its element count as the length.
fn indexed_receiver(agent: &mut Agent, this_value: Value) -> JsResult<(Object, u32)> {
    let Ok(object) = Object::try_from(this_value) else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Array method called on a receiver without indexed properties",
        ));
    };
    let length = match object {
        Object::Array(array) => array_length(agent, array),
        _ => indexed_properties::get_used(agent, object),
    };
    Ok((object, length))
}

fn put_or_throw(
    agent: &mut Agent,
    object: Object,
    index: u32,
    value: Value,
) -> JsResult<()> {
    if indexed_properties::put(agent, object, index, value)? {
        Ok(())
    } else {
        Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot assign to read only property",
        ))
    }
}

/// Surface a renumber move rejected by a read-only target the same way
/// a rejected put is surfaced.
fn moved_or_throw(agent: &mut Agent, landed: bool) -> JsResult<()> {
    if landed {
        Ok(())
    } else {
        Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot assign to read only property",
        ))
    }
}

fn prototype_chain_has_indexed(agent: &Agent, object: Object) -> bool {
    let mut link = object.prototype(agent);
    while let Some(prototype) = link {
        if indexed_properties::has_indexed_properties(agent, prototype) {
            return true;
        }
        link = prototype.prototype(agent);
    }
    false
}

impl ArrayPrototype {
    /// ### [23.1.3.23 Array.prototype.push ( ...items )](https://tc39.es/ecma262/#sec-array.prototype.push)
    fn push(agent: &mut Agent, this_value: Value, items: ArgumentsList) -> JsResult<Value> {
        let array = require_array(agent, this_value)?;
        // 2. Let len be ? LengthOfArrayLike(O).
        let mut length = array_length(agent, array);
        // 4. If len + argCount > the maximum array index space, throw.
        if items.len() as u64 > u32::MAX as u64 - length as u64 {
            return Err(
                agent.throw_exception(ExceptionType::RangeError, "Invalid array length")
            );
        }
        let object = Object::Array(array);
        let simple = is_simple_array(agent, array);
        // 5. For each element E of items, do
        for &item in items.iter() {
            // a. Perform ? Set(O, ! ToString(F(len)), E, true).
            if simple && indexed_properties::can_put_simple_new(agent, object, length) {
                indexed_properties::put_simple_new(agent, object, length, item);
            } else {
                put_or_throw(agent, object, length, item)?;
            }
            // b. Set len to len + 1.
            length += 1;
        }
        // 6. Perform ? Set(O, "length", F(len), true).
        array_set_length(agent, array, length);
        // 7. Return F(len).
        Ok(Value::from_index(agent, length))
    }

    /// ### [23.1.3.22 Array.prototype.pop ( )](https://tc39.es/ecma262/#sec-array.prototype.pop)
    fn pop(agent: &mut Agent, this_value: Value, _: ArgumentsList) -> JsResult<Value> {
        let array = require_array(agent, this_value)?;
        let length = array_length(agent, array);
        // 3. If len = 0, return undefined.
        if length == 0 {
            return Ok(Value::Undefined);
        }
        let object = Object::Array(array);
        let index = length - 1;
        // 4.b. Let element be ? Get(O, newLen).
        let element = indexed_properties::get_from_chain(agent, object, index)?
            .unwrap_or(Value::Undefined);
        // 4.c. Perform ? DeletePropertyOrThrow(O, newLen). Skipped when
        // the storage holds accessors; truncation through the length
        // write removes the entry either way.
        if !indexed_properties::has_indexed_getters_or_setters(agent, object) {
            indexed_properties::delete(agent, object, index);
        }
        // 4.d. Perform ? Set(O, "length", newLen, true).
        array_set_length(agent, array, index);
        // 4.e. Return element.
        Ok(element)
    }

    /// ### [23.1.3.29 Array.prototype.shift ( )](https://tc39.es/ecma262/#sec-array.prototype.shift)
    fn shift(agent: &mut Agent, this_value: Value, _: ArgumentsList) -> JsResult<Value> {
        let array = require_array(agent, this_value)?;
        let length = array_length(agent, array);
        // 3. If len = 0, return undefined.
        if length == 0 {
            return Ok(Value::Undefined);
        }
        let object = Object::Array(array);
        // 4. Let first be ? Get(O, "0").
        let first = indexed_properties::get_from_chain(agent, object, 0)?
            .unwrap_or(Value::Undefined);
        // Clear index 0 so the renumber moves into a hole.
        let cleared = indexed_properties::has_indexed_getters_or_setters(agent, object)
            || indexed_properties::delete(agent, object, 0);
        // 5-6. Move the remaining entries down by one.
        let landed = if cleared {
            indexed_properties::renumber_for_array(agent, object, 1, length - 1, -1)?
        } else {
            // A dont-delete entry at 0 blocks the wholesale move; shift
            // the entries one at a time, overwriting it.
            let landed = indexed_properties::renumber_special(agent, object, 1, length - 1, -1)?;
            indexed_properties::renumber_from_prototype(agent, object, 1, length - 1, -1)?;
            landed
        };
        moved_or_throw(agent, landed)?;
        // 8. Perform ? Set(O, "length", len - 1, true).
        array_set_length(agent, array, length - 1);
        // 9. Return first.
        Ok(first)
    }

    /// ### [23.1.3.34 Array.prototype.unshift ( ...items )](https://tc39.es/ecma262/#sec-array.prototype.unshift)
    fn unshift(agent: &mut Agent, this_value: Value, items: ArgumentsList) -> JsResult<Value> {
        let array = require_array(agent, this_value)?;
        let length = array_length(agent, array);
        let count = items.len() as u32;
        if length != 0 {
            // 4.a. If len + argCount overflows the index space, throw.
            if count > u32::MAX - length {
                return Err(
                    agent.throw_exception(ExceptionType::RangeError, "Invalid array length")
                );
            }
            // 4.b-c. Move the existing entries up by argCount.
            if count != 0 {
                let landed = indexed_properties::renumber_for_array(
                    agent,
                    Object::Array(array),
                    0,
                    length,
                    count as i64,
                )?;
                moved_or_throw(agent, landed)?;
            }
        }
        // 4.d. Insert items at the front.
        let object = Object::Array(array);
        for (offset, &item) in items.iter().enumerate() {
            put_or_throw(agent, object, offset as u32, item)?;
        }
        // 5. Perform ? Set(O, "length", len + argCount, true).
        let new_length = length + count;
        array_set_length(agent, array, new_length);
        // 6. Return len + argCount.
        Ok(Value::from_index(agent, new_length))
    }

    /// ### [23.1.3.31 Array.prototype.splice ( start, deleteCount, ...items )](https://tc39.es/ecma262/#sec-array.prototype.splice)
    fn splice(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        let array = require_array(agent, this_value)?;
        let length = array_length(agent, array);
        let object = Object::Array(array);
        // 3-4. Let actualStart be the clamped relative start.
        let start = if arguments.is_empty() {
            length
        } else {
            relative_to_absolute(to_integer_or_infinity(agent, arguments.get(0))?, length)
        };
        let items: &[Value] = if arguments.len() > 2 {
            &arguments[2..]
        } else {
            &[]
        };
        let insert_count = items.len() as u32;
        // 5-7. Let actualDeleteCount be the clamped delete count.
        let delete_count = match arguments.len() {
            0 => 0,
            1 => length - start,
            _ => {
                let requested = to_integer_or_infinity(agent, arguments.get(1))?;
                requested.clamp(0.0, (length - start) as f64) as u32
            }
        };
        // 8. If len - actualDeleteCount + itemCount overflows, throw.
        if insert_count as u64 > u32::MAX as u64 - (length - delete_count) as u64 {
            return Err(
                agent.throw_exception(ExceptionType::RangeError, "Invalid array length")
            );
        }
        // 9-11. Let A be a new array with the removed elements.
        let removed = array_create(agent, delete_count.min(255));
        if delete_count != 0 {
            let end = start + delete_count;
            let mut iterator = ArrayPropertyIterator::new(agent, object);
            let mut position = iterator.lower_bound(agent, start);
            while let Some(index) = position {
                if index >= end {
                    break;
                }
                let value = iterator.get_value(agent)?.unwrap_or(Value::Undefined);
                indexed_properties::put(agent, Object::Array(removed), index - start, value)?;
                iterator.flush_cache();
                position = iterator.next(agent);
            }
        }
        array_set_length(agent, removed, delete_count);
        // 12-15. Shift the tail into place.
        if insert_count != delete_count {
            let mut cleared = true;
            if insert_count < delete_count
                && !indexed_properties::has_indexed_getters_or_setters(agent, object)
            {
                // Clear the doomed range so the renumber moves into
                // holes.
                let end = start + delete_count;
                let mut iterator = IndexedPropertyIterator::new(object);
                let mut position = iterator.lower_bound(agent, start + insert_count);
                while let Some(index) = position {
                    if index >= end {
                        break;
                    }
                    cleared &= iterator.delete_value(agent);
                    position = iterator.next(agent);
                }
            }
            let tail_start = start + delete_count;
            let tail_length = length - tail_start;
            let delta = insert_count as i64 - delete_count as i64;
            let landed = if cleared {
                indexed_properties::renumber_for_array(
                    agent, object, tail_start, tail_length, delta,
                )?
            } else {
                // A dont-delete survivor in the removed range blocks the
                // wholesale move.
                let landed = indexed_properties::renumber_special(
                    agent, object, tail_start, tail_length, delta,
                )?;
                indexed_properties::renumber_from_prototype(
                    agent, object, tail_start, tail_length, delta,
                )?;
                landed
            };
            moved_or_throw(agent, landed)?;
        }
        // 16. Insert the new items.
        for (offset, &item) in items.iter().enumerate() {
            put_or_throw(agent, object, start + offset as u32, item)?;
        }
        // 17. Perform ? Set(O, "length", len - actualDeleteCount + itemCount, true).
        array_set_length(agent, array, length - delete_count + insert_count);
        // 18. Return A.
        Ok(Value::Array(removed))
    }

    /// ### [23.1.3.18 Array.prototype.join ( separator )](https://tc39.es/ecma262/#sec-array.prototype.join)
    fn join(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        let (object, length) = indexed_receiver(agent, this_value)?;
        // 3-4. Let sep be "," or ? ToString(separator).
        let separator: Wtf8Buf = if arguments.get(0).is_undefined() {
            Wtf8Buf::from_str(",")
        } else {
            let string = to_string(agent, arguments.get(0))?;
            agent[string].data.clone()
        };
        if length == 0 {
            return Ok(agent.heap.alloc_string(""));
        }
        // 5-6. Concatenate the element strings with len - 1 separators;
        // undefined, null and holes contribute empty strings. The
        // result length is tracked ahead of every push so an overlong
        // result throws before any piece is materialized.
        let separator_length = separator.len() as u64;
        let mut out = Wtf8Buf::new();
        let mut total: u64 = 0;
        let mut separators_emitted: u32 = 0;
        let mut iterator = ArrayPropertyIterator::new(agent, object);
        let mut position = iterator.lower_bound(agent, 0);
        while let Some(index) = position {
            if index >= length {
                break;
            }
            let value = iterator.get_value(agent)?.unwrap_or(Value::Undefined);
            iterator.flush_cache();
            if !value.is_undefined() && !value.is_null() {
                let gap = (index - separators_emitted) as u64;
                let string = to_string(agent, value)?;
                total += gap * separator_length + agent[string].len() as u64;
                if total > StringHeapData::MAX_LENGTH as u64 {
                    return Err(agent.throw_exception(
                        ExceptionType::RangeError,
                        "Invalid string length",
                    ));
                }
                for _ in 0..gap {
                    out.push_wtf8(&separator);
                }
                separators_emitted = index;
                out.push_wtf8(agent[string].as_wtf8());
            }
            position = iterator.next(agent);
        }
        total += (length - 1 - separators_emitted) as u64 * separator_length;
        if total > StringHeapData::MAX_LENGTH as u64 {
            return Err(agent.throw_exception(
                ExceptionType::RangeError,
                "Invalid string length",
            ));
        }
        for _ in separators_emitted..length - 1 {
            out.push_wtf8(&separator);
        }
        Ok(Value::String(
            agent.heap.create(StringHeapData { data: out }),
        ))
    }

    /// ### [23.1.3.17 Array.prototype.indexOf ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-array.prototype.indexof)
    fn index_of(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        let (object, length) = indexed_receiver(agent, this_value)?;
        // 3. If len = 0, return -1.
        if length == 0 {
            return Ok(Value::Integer(-1));
        }
        let search = arguments.get(0);
        // 4. Let n be ? ToIntegerOrInfinity(fromIndex).
        let n = if arguments.len() >= 2 {
            to_integer_or_infinity(agent, arguments.get(1))?
        } else {
            0.0
        };
        // 6. If n >= len, return -1.
        if n >= length as f64 {
            return Ok(Value::Integer(-1));
        }
        // 7-9. Compute the starting index k.
        let start = if n >= 0.0 {
            n as u32
        } else if -n <= length as f64 {
            (length as f64 + n) as u32
        } else {
            0
        };
        // 10. Search forward over the present entries.
        let mut iterator = ArrayPropertyIterator::new(agent, object);
        let mut position = iterator.lower_bound(agent, start);
        while let Some(index) = position {
            if index >= length {
                break;
            }
            let element = iterator.get_value(agent)?.unwrap_or(Value::Undefined);
            if is_strictly_equal(agent, element, search) {
                return Ok(Value::from_index(agent, index));
            }
            position = iterator.next(agent);
        }
        Ok(Value::Integer(-1))
    }

    /// ### [23.1.3.20 Array.prototype.lastIndexOf ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-array.prototype.lastindexof)
    fn last_index_of(
        agent: &mut Agent,
        this_value: Value,
        arguments: ArgumentsList,
    ) -> JsResult<Value> {
        let (object, length) = indexed_receiver(agent, this_value)?;
        if length == 0 {
            return Ok(Value::Integer(-1));
        }
        let search = arguments.get(0);
        // 4. Let n be ? ToIntegerOrInfinity(fromIndex); len - 1 when absent.
        let n = if arguments.len() >= 2 {
            to_integer_or_infinity(agent, arguments.get(1))?
        } else {
            (length - 1) as f64
        };
        // 5-7. Compute the starting index k.
        let start = if n >= 0.0 {
            (n as u64).min((length - 1) as u64) as u32
        } else if -n <= length as f64 {
            (length as f64 + n) as u32
        } else {
            return Ok(Value::Integer(-1));
        };
        // 8. Search backward over the present entries.
        let mut iterator = ArrayPropertyIterator::new(agent, object);
        let mut position = iterator.upper_bound(agent, start);
        while let Some(index) = position {
            let element = iterator.get_value(agent)?.unwrap_or(Value::Undefined);
            if is_strictly_equal(agent, element, search) {
                return Ok(Value::from_index(agent, index));
            }
            position = iterator.previous(agent);
        }
        Ok(Value::Integer(-1))
    }

    /// ### [23.1.3.16 Array.prototype.includes ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-array.prototype.includes)
    ///
    /// Unlike indexOf this uses SameValueZero and treats holes as
    /// undefined, so a search for undefined matches any gap.
    fn includes(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        let (object, length) = indexed_receiver(agent, this_value)?;
        if length == 0 {
            return Ok(Value::Boolean(false));
        }
        let search = arguments.get(0);
        let matches_holes = search.is_undefined();
        // 4-7. Compute the starting index k.
        let n = to_integer_or_infinity(agent, arguments.get(1))?;
        if n == f64::INFINITY {
            return Ok(Value::Boolean(false));
        }
        let start = if n >= 0.0 {
            if n >= length as f64 {
                return Ok(Value::Boolean(false));
            }
            n as u32
        } else {
            ((length as f64 + n).max(0.0)) as u32
        };
        // 8. Walk the present entries, watching the gaps between them.
        let mut expected = start;
        let mut iterator = ArrayPropertyIterator::new(agent, object);
        let mut position = iterator.lower_bound(agent, start);
        while let Some(index) = position {
            if index >= length {
                break;
            }
            if matches_holes && index > expected {
                return Ok(Value::Boolean(true));
            }
            let element = iterator.get_value(agent)?.unwrap_or(Value::Undefined);
            if same_value_zero(agent, element, search) {
                return Ok(Value::Boolean(true));
            }
            expected = index + 1;
            position = iterator.next(agent);
        }
        // A trailing gap below the length also counts.
        Ok(Value::Boolean(matches_holes && expected < length))
    }

    /// ### [23.1.3.26 Array.prototype.reverse ( )](https://tc39.es/ecma262/#sec-array.prototype.reverse)
    fn reverse(agent: &mut Agent, this_value: Value, _: ArgumentsList) -> JsResult<Value> {
        let (object, length) = indexed_receiver(agent, this_value)?;
        // Accessors anywhere, inherited entries, or read-only entries
        // force the observable read-swap-write loop.
        if prototype_chain_has_indexed(agent, object)
            || indexed_properties::has_indexed_getters_or_setters(agent, object)
            || indexed_properties::has_read_only_properties(agent, object)
        {
            for low in 0..length / 2 {
                let high = length - low - 1;
                // 6.d-h. Read both ends before writing either.
                let low_value = indexed_properties::get_from_chain(agent, object, low)?;
                let high_value = indexed_properties::get_from_chain(agent, object, high)?;
                match high_value {
                    Some(value) => put_or_throw(agent, object, low, value)?,
                    None => {
                        indexed_properties::delete(agent, object, low);
                    }
                }
                match low_value {
                    Some(value) => put_or_throw(agent, object, high, value)?,
                    None => {
                        indexed_properties::delete(agent, object, high);
                    }
                }
            }
        } else {
            indexed_properties::reverse(agent, object, length);
        }
        Ok(this_value)
    }
}

/// Clamp a relative index to `[0, length]`, counting from the end when
/// negative.
fn relative_to_absolute(relative: f64, length: u32) -> u32 {
    if relative < 0.0 {
        (length as f64 + relative).max(0.0) as u32
    } else {
        relative.min(length as f64) as u32
    }
}
