// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.1 ArrayBuffer Objects](https://tc39.es/ecma262/#sec-arraybuffer-objects)

use crate::{
    ecmascript::{execution::Agent, types::DataBlock},
    heap::{
        indexes::{ArrayBufferIndex, DataViewIndex, TypedArrayIndex},
        CreateHeapData, Heap,
    },
};

/// A typed view or data view registered against a buffer, so that
/// detaching the buffer can invalidate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferView {
    TypedArray(TypedArrayIndex),
    DataView(DataViewIndex),
}

#[derive(Debug, Default)]
pub struct ArrayBufferHeapData {
    /// None once the buffer has been detached.
    pub(crate) data: Option<DataBlock>,
    /// Every live view over this buffer.
    pub(crate) views: Vec<BufferView>,
}

/// ### [25.1.3.1 AllocateArrayBuffer ( constructor, byteLength )](https://tc39.es/ecma262/#sec-allocatearraybuffer)
pub fn allocate_array_buffer(agent: &mut Agent, byte_length: u32) -> ArrayBufferIndex {
    // 2. Let block be ? CreateByteDataBlock(byteLength).
    let block = DataBlock::new(byte_length);
    agent.heap.create(ArrayBufferHeapData {
        data: Some(block),
        views: Vec::new(),
    })
}

/// Allocate a buffer that adopts caller-supplied bytes.
pub fn array_buffer_from_bytes(agent: &mut Agent, bytes: Box<[u8]>) -> ArrayBufferIndex {
    agent.heap.create(ArrayBufferHeapData {
        data: Some(DataBlock::from_bytes(bytes)),
        views: Vec::new(),
    })
}

/// ### [25.1.3.4 IsDetachedBuffer ( arrayBuffer )](https://tc39.es/ecma262/#sec-isdetachedbuffer)
pub fn is_detached_buffer(agent: &Agent, buffer: ArrayBufferIndex) -> bool {
    agent[buffer].data.is_none()
}

pub fn array_buffer_byte_length(agent: &Agent, buffer: ArrayBufferIndex) -> u32 {
    agent[buffer].data.as_ref().map_or(0, |data| data.len())
}

pub(crate) fn register_view(agent: &mut Agent, buffer: ArrayBufferIndex, view: BufferView) {
    agent[buffer].views.push(view);
}

/// ### [25.1.3.3 DetachArrayBuffer ( arrayBuffer )](https://tc39.es/ecma262/#sec-detacharraybuffer)
///
/// Drops the backing bytes and invalidates every registered view by
/// zeroing its extent and clearing its buffer reference.
pub fn detach_array_buffer(agent: &mut Agent, buffer: ArrayBufferIndex) {
    // 3. Set arrayBuffer.[[ArrayBufferData]] to null.
    // 4. Set arrayBuffer.[[ArrayBufferByteLength]] to 0.
    let views = {
        let data = &mut agent[buffer];
        data.data = None;
        std::mem::take(&mut data.views)
    };
    for view in views {
        match view {
            BufferView::TypedArray(index) => {
                let view_data = &mut agent[index];
                view_data.viewed_array_buffer = None;
                view_data.byte_offset = 0;
                view_data.array_length = 0;
            }
            BufferView::DataView(index) => {
                let view_data = &mut agent[index];
                view_data.viewed_array_buffer = None;
                view_data.byte_offset = 0;
                view_data.byte_length = 0;
            }
        }
    }
}

impl CreateHeapData<ArrayBufferHeapData, ArrayBufferIndex> for Heap {
    fn create(&mut self, data: ArrayBufferHeapData) -> ArrayBufferIndex {
        self.array_buffers.push(Some(data));
        ArrayBufferIndex::last(&self.array_buffers)
    }
}
