// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(feature = "array-buffer")]
use crate::heap::indexes::{ArrayBufferIndex, DataViewIndex, TypedArrayIndex};
use crate::ecmascript::execution::Agent;
use crate::heap::indexes::{
    ArrayIndex, BuiltinFunctionIndex, ErrorIndex, NumberHeapData, NumberIndex, ObjectIndex,
    StringIndex,
};
use crate::heap::CreateHeapData;

/// An ECMAScript language value.
///
/// Small integers live inline in the `Integer` variant; doubles that do
/// not fit it go to the numbers arena. Strings and objects are typed
/// arena handles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(u8)]
pub enum Value {
    #[default]
    Undefined = 1,
    Null,
    Boolean(bool),
    /// An i53-representable integer that fit in 32 bits.
    Integer(i32),
    /// A double-precision number in the numbers arena.
    Number(NumberIndex),
    String(StringIndex),
    Object(ObjectIndex),
    Array(ArrayIndex),
    BuiltinFunction(BuiltinFunctionIndex),
    Error(ErrorIndex),
    #[cfg(feature = "array-buffer")]
    ArrayBuffer(ArrayBufferIndex),
    #[cfg(feature = "array-buffer")]
    TypedArray(TypedArrayIndex),
    #[cfg(feature = "array-buffer")]
    DataView(DataViewIndex),
}

/// We want to guarantee that all handles to JS values are register sized.
const _VALUE_SIZE_IS_WORD: () = assert!(size_of::<Value>() <= size_of::<usize>());

const fn value_discriminant(value: Value) -> u8 {
    // SAFETY: Because `Self` is marked `repr(u8)`, its layout is a
    // `repr(C)` `union` between `repr(C)` structs, each of which has the
    // `u8` discriminant as its first field, so we can read the
    // discriminant without offsetting the pointer.
    unsafe { *(&value as *const Value).cast::<u8>() }
}

pub const UNDEFINED_DISCRIMINANT: u8 = value_discriminant(Value::Undefined);
pub const NULL_DISCRIMINANT: u8 = value_discriminant(Value::Null);
pub const BOOLEAN_DISCRIMINANT: u8 = value_discriminant(Value::Boolean(true));
pub const INTEGER_DISCRIMINANT: u8 = value_discriminant(Value::Integer(0));

impl Value {
    pub fn is_undefined(self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_string(self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_number(self) -> bool {
        matches!(self, Value::Number(_) | Value::Integer(_))
    }

    pub fn is_object(self) -> bool {
        #[cfg(feature = "array-buffer")]
        {
            matches!(
                self,
                Value::Object(_)
                    | Value::Array(_)
                    | Value::BuiltinFunction(_)
                    | Value::Error(_)
                    | Value::ArrayBuffer(_)
                    | Value::TypedArray(_)
                    | Value::DataView(_)
            )
        }
        #[cfg(not(feature = "array-buffer"))]
        {
            matches!(
                self,
                Value::Object(_) | Value::Array(_) | Value::BuiltinFunction(_) | Value::Error(_)
            )
        }
    }

    pub fn is_function(self) -> bool {
        matches!(self, Value::BuiltinFunction(_))
    }

    pub fn from_bool(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Allocate a number value, using the inline integer variant when the
    /// double is an exactly representable 32-bit integer.
    pub fn from_f64(agent: &mut Agent, value: f64) -> Self {
        let int = value as i32;
        if int as f64 == value && !(value == 0.0 && value.is_sign_negative()) {
            Value::Integer(int)
        } else {
            agent.heap.create(NumberHeapData::new(value))
        }
    }

    /// Array indexes exceed i32 range; those spill to the heap.
    pub fn from_index(agent: &mut Agent, index: u32) -> Self {
        match i32::try_from(index) {
            Ok(int) => Value::Integer(int),
            Err(_) => Self::from_f64(agent, index as f64),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}
