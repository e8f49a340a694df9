// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::execution::{agent::ExceptionType, Agent},
    heap::indexes::ErrorIndex,
};

#[derive(Debug, Clone, Copy)]
pub struct ErrorHeapData {
    pub kind: ExceptionType,
    pub message: Option<&'static str>,
}

impl ErrorHeapData {
    pub(crate) fn new(kind: ExceptionType, message: Option<&'static str>) -> Self {
        Self { kind, message }
    }
}

impl Index<ErrorIndex> for Agent {
    type Output = ErrorHeapData;

    fn index(&self, index: ErrorIndex) -> &Self::Output {
        &self.heap.errors[index]
    }
}

impl IndexMut<ErrorIndex> for Agent {
    fn index_mut(&mut self, index: ErrorIndex) -> &mut Self::Output {
        &mut self.heap.errors[index]
    }
}

impl Index<ErrorIndex> for Vec<Option<ErrorHeapData>> {
    type Output = ErrorHeapData;

    fn index(&self, index: ErrorIndex) -> &Self::Output {
        self.get(index.into_index())
            .expect("Error out of bounds")
            .as_ref()
            .expect("Error slot empty")
    }
}

impl IndexMut<ErrorIndex> for Vec<Option<ErrorHeapData>> {
    fn index_mut(&mut self, index: ErrorIndex) -> &mut Self::Output {
        self.get_mut(index.into_index())
            .expect("Error out of bounds")
            .as_mut()
            .expect("Error slot empty")
    }
}
