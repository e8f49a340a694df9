// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.2 TypedArray Objects](https://tc39.es/ecma262/#sec-typedarray-objects)

use crate::{
    ecmascript::{
        abstract_operations::type_conversion::to_number_f64,
        builtins::array_buffer::{register_view, BufferView},
        execution::{agent::ExceptionType, Agent, JsResult},
        types::{DataBlock, Value, Viewable},
    },
    heap::{
        indexes::{ArrayBufferIndex, TypedArrayIndex},
        CreateHeapData, Heap,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl TypedArrayKind {
    pub const fn element_size(self) -> u32 {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypedArrayHeapData {
    /// None once the viewed buffer has been detached.
    pub(crate) viewed_array_buffer: Option<ArrayBufferIndex>,
    pub(crate) byte_offset: u32,
    /// Element count, not bytes.
    pub(crate) array_length: u32,
    pub(crate) kind: TypedArrayKind,
}

/// Create a typed view over a byte range of a buffer and register it for
/// detach invalidation. The range must lie within the buffer.
pub fn typed_array_create(
    agent: &mut Agent,
    kind: TypedArrayKind,
    buffer: ArrayBufferIndex,
    byte_offset: u32,
    array_length: u32,
) -> JsResult<TypedArrayIndex> {
    let element_size = kind.element_size();
    let byte_length = array_length as u64 * element_size as u64;
    let Some(buffer_data) = agent[buffer].data.as_ref() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "attempting to access detached ArrayBuffer",
        ));
    };
    if byte_offset as u64 + byte_length > buffer_data.len() as u64 {
        return Err(agent.throw_exception(
            ExceptionType::RangeError,
            "typed array does not fit the buffer",
        ));
    }
    let index = agent.heap.create(TypedArrayHeapData {
        viewed_array_buffer: Some(buffer),
        byte_offset,
        array_length,
        kind,
    });
    register_view(agent, buffer, BufferView::TypedArray(index));
    Ok(index)
}

pub fn typed_array_length(agent: &Agent, typed_array: TypedArrayIndex) -> u32 {
    agent[typed_array].array_length
}

pub fn typed_array_kind(agent: &Agent, typed_array: TypedArrayIndex) -> TypedArrayKind {
    agent[typed_array].kind
}

/// ### [10.4.5.15 TypedArrayGetElement ( O, index )](https://tc39.es/ecma262/#sec-typedarraygetelement)
///
/// Out-of-range and detached reads yield None; typed array element access
/// never throws.
pub fn typed_array_get_element(
    agent: &mut Agent,
    typed_array: TypedArrayIndex,
    index: u32,
) -> Option<Value> {
    let view = agent[typed_array];
    let buffer = view.viewed_array_buffer?;
    if index >= view.array_length {
        return None;
    }
    let byte_offset = view.byte_offset + index * view.kind.element_size();
    let block = agent[buffer].data.as_ref()?;
    let element = read_element(block, view.kind, byte_offset);
    Some(Value::from_f64(agent, element))
}

/// ### [10.4.5.16 TypedArraySetElement ( O, index, value )](https://tc39.es/ecma262/#sec-typedarraysetelement)
///
/// The value coercion can run user code and fail; the write itself is
/// silently dropped when the index is out of range or the buffer is
/// detached.
pub fn typed_array_set_element(
    agent: &mut Agent,
    typed_array: TypedArrayIndex,
    index: u32,
    value: Value,
) -> JsResult<()> {
    // 1. If O.[[ContentType]] is number, let numValue be ? ToNumber(value).
    let num_value = to_number_f64(agent, value)?;
    // 3. If IsValidIntegerIndex(O, index) is true, ...
    let view = agent[typed_array];
    let Some(buffer) = view.viewed_array_buffer else {
        return Ok(());
    };
    if index >= view.array_length {
        return Ok(());
    }
    let byte_offset = view.byte_offset + index * view.kind.element_size();
    let Some(block) = agent[buffer].data.as_mut() else {
        return Ok(());
    };
    write_element(block, view.kind, byte_offset, num_value);
    Ok(())
}

fn read_element(block: &DataBlock, kind: TypedArrayKind, byte_offset: u32) -> f64 {
    match kind {
        TypedArrayKind::Int8 => block.get::<i8>(byte_offset).map_or(0.0, Viewable::into_f64),
        TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => {
            block.get::<u8>(byte_offset).map_or(0.0, Viewable::into_f64)
        }
        TypedArrayKind::Int16 => block.get::<i16>(byte_offset).map_or(0.0, Viewable::into_f64),
        TypedArrayKind::Uint16 => block.get::<u16>(byte_offset).map_or(0.0, Viewable::into_f64),
        TypedArrayKind::Int32 => block.get::<i32>(byte_offset).map_or(0.0, Viewable::into_f64),
        TypedArrayKind::Uint32 => block.get::<u32>(byte_offset).map_or(0.0, Viewable::into_f64),
        TypedArrayKind::Float32 => block.get::<f32>(byte_offset).map_or(0.0, Viewable::into_f64),
        TypedArrayKind::Float64 => block.get::<f64>(byte_offset).map_or(0.0, Viewable::into_f64),
    }
}

fn write_element(block: &mut DataBlock, kind: TypedArrayKind, byte_offset: u32, value: f64) {
    match kind {
        TypedArrayKind::Int8 => {
            block.set::<i8>(byte_offset, Viewable::from_f64(value));
        }
        TypedArrayKind::Uint8 => {
            block.set::<u8>(byte_offset, Viewable::from_f64(value));
        }
        TypedArrayKind::Uint8Clamped => {
            block.set::<u8>(byte_offset, clamp_to_uint8(value));
        }
        TypedArrayKind::Int16 => {
            block.set::<i16>(byte_offset, Viewable::from_f64(value));
        }
        TypedArrayKind::Uint16 => {
            block.set::<u16>(byte_offset, Viewable::from_f64(value));
        }
        TypedArrayKind::Int32 => {
            block.set::<i32>(byte_offset, Viewable::from_f64(value));
        }
        TypedArrayKind::Uint32 => {
            block.set::<u32>(byte_offset, Viewable::from_f64(value));
        }
        TypedArrayKind::Float32 => {
            block.set::<f32>(byte_offset, Viewable::from_f64(value));
        }
        TypedArrayKind::Float64 => {
            block.set::<f64>(byte_offset, value);
        }
    }
}

/// In-place element reversal over the viewed range. Detached buffers
/// are a no-op.
pub fn typed_array_reverse(agent: &mut Agent, typed_array: TypedArrayIndex) {
    let view = agent[typed_array];
    let Some(buffer) = view.viewed_array_buffer else {
        return;
    };
    let Some(block) = agent[buffer].data.as_mut() else {
        return;
    };
    let size = view.kind.element_size();
    for low in 0..view.array_length / 2 {
        let high = view.array_length - low - 1;
        let low_offset = view.byte_offset + low * size;
        let high_offset = view.byte_offset + high * size;
        let low_value = read_element(block, view.kind, low_offset);
        let high_value = read_element(block, view.kind, high_offset);
        write_element(block, view.kind, low_offset, high_value);
        write_element(block, view.kind, high_offset, low_value);
    }
}

/// ### [7.1.12 ToUint8Clamp ( argument )](https://tc39.es/ecma262/#sec-touint8clamp)
fn clamp_to_uint8(value: f64) -> u8 {
    // 2. If number is NaN, return +0.
    if value.is_nan() {
        return 0;
    }
    if value <= 0.0 {
        return 0;
    }
    if value >= 255.0 {
        return 255;
    }
    // 6.-9. Round half to even.
    value.round_ties_even() as u8
}

impl CreateHeapData<TypedArrayHeapData, TypedArrayIndex> for Heap {
    fn create(&mut self, data: TypedArrayHeapData) -> TypedArrayIndex {
        self.typed_arrays.push(Some(data));
        TypedArrayIndex::last(&self.typed_arrays)
    }
}
