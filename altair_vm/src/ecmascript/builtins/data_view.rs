// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.3 DataView Objects](https://tc39.es/ecma262/#sec-dataview-objects)

use crate::{
    ecmascript::{
        abstract_operations::type_conversion::to_number_f64,
        builtins::array_buffer::{register_view, BufferView},
        execution::{agent::ExceptionType, Agent, JsResult},
        types::{Value, Viewable},
    },
    heap::{
        indexes::{ArrayBufferIndex, DataViewIndex},
        CreateHeapData, Heap,
    },
};

#[derive(Debug, Clone, Copy)]
pub struct DataViewHeapData {
    /// None once the viewed buffer has been detached.
    pub(crate) viewed_array_buffer: Option<ArrayBufferIndex>,
    pub(crate) byte_offset: u32,
    pub(crate) byte_length: u32,
}

/// ### [25.3.2.1 DataView ( buffer \[ , byteOffset \[ , byteLength \] \] )](https://tc39.es/ecma262/#sec-dataview-buffer-byteoffset-bytelength)
pub fn data_view_create(
    agent: &mut Agent,
    buffer: ArrayBufferIndex,
    byte_offset: u32,
    byte_length: u32,
) -> JsResult<DataViewIndex> {
    let Some(buffer_data) = agent[buffer].data.as_ref() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "attempting to access detached ArrayBuffer",
        ));
    };
    // 4. If offset > bufferByteLength, throw a RangeError exception.
    if byte_offset as u64 + byte_length as u64 > buffer_data.len() as u64 {
        return Err(agent.throw_exception(
            ExceptionType::RangeError,
            "data view does not fit the buffer",
        ));
    }
    let index = agent.heap.create(DataViewHeapData {
        viewed_array_buffer: Some(buffer),
        byte_offset,
        byte_length,
    });
    register_view(agent, buffer, BufferView::DataView(index));
    Ok(index)
}

/// ### [25.3.1.1 GetViewValue ( view, requestIndex, isLittleEndian, type )](https://tc39.es/ecma262/#sec-getviewvalue)
///
/// Unlike typed array element access, a DataView read past the view is a
/// RangeError and a read through a detached buffer is a TypeError.
pub fn get_view_value<T: Viewable>(
    agent: &mut Agent,
    view: DataViewIndex,
    request_index: u32,
    is_little_endian: bool,
) -> JsResult<Value> {
    let view_data = agent[view];
    // 5. If IsDetachedBuffer(buffer) is true, throw a TypeError exception.
    let Some(buffer) = view_data.viewed_array_buffer else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "attempting to access detached ArrayBuffer",
        ));
    };
    // 8. If getIndex + elementSize > viewSize, throw a RangeError exception.
    let element_size = size_of::<T>() as u64;
    if request_index as u64 + element_size > view_data.byte_length as u64 {
        return Err(agent.throw_exception(
            ExceptionType::RangeError,
            "view access out of bounds",
        ));
    }
    // 10. Let bufferIndex be getIndex + viewOffset.
    let byte_offset = view_data.byte_offset + request_index;
    let value = agent[buffer]
        .data
        .as_ref()
        .and_then(|block| block.get_endian::<T>(byte_offset, is_little_endian))
        .map_or(0.0, Viewable::into_f64);
    Ok(Value::from_f64(agent, value))
}

/// ### [25.3.1.2 SetViewValue ( view, requestIndex, isLittleEndian, type, value )](https://tc39.es/ecma262/#sec-setviewvalue)
pub fn set_view_value<T: Viewable>(
    agent: &mut Agent,
    view: DataViewIndex,
    request_index: u32,
    is_little_endian: bool,
    value: Value,
) -> JsResult<()> {
    // 3. Let numberValue be ? ToNumber(value).
    let number_value = to_number_f64(agent, value)?;
    let view_data = agent[view];
    // 6. If IsDetachedBuffer(buffer) is true, throw a TypeError exception.
    let Some(buffer) = view_data.viewed_array_buffer else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "attempting to access detached ArrayBuffer",
        ));
    };
    // 9. If getIndex + elementSize > viewSize, throw a RangeError exception.
    let element_size = size_of::<T>() as u64;
    if request_index as u64 + element_size > view_data.byte_length as u64 {
        return Err(agent.throw_exception(
            ExceptionType::RangeError,
            "view access out of bounds",
        ));
    }
    let byte_offset = view_data.byte_offset + request_index;
    if let Some(block) = agent[buffer].data.as_mut() {
        block.set_endian::<T>(byte_offset, T::from_f64(number_value), is_little_endian);
    }
    Ok(())
}

impl CreateHeapData<DataViewHeapData, DataViewIndex> for Heap {
    fn create(&mut self, data: DataViewHeapData) -> DataViewIndex {
        self.data_views.push(Some(data));
        DataViewIndex::last(&self.data_views)
    }
}
