// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{execution::Agent, types::Value},
    heap::{indexes::AccessorIndex, CreateHeapData, Heap},
};

/// A getter/setter pair installed in an indexed property slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor(pub(crate) AccessorIndex);

/// Either half may be absent; reading through a getterless accessor
/// yields undefined, writing through a setterless one is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessorHeapData {
    pub getter: Option<Value>,
    pub setter: Option<Value>,
}

impl Accessor {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub fn getter(self, agent: &Agent) -> Option<Value> {
        agent[self].getter
    }

    pub fn setter(self, agent: &Agent) -> Option<Value> {
        agent[self].setter
    }
}

impl From<AccessorIndex> for Accessor {
    fn from(value: AccessorIndex) -> Self {
        Self(value)
    }
}

impl Index<Accessor> for Agent {
    type Output = AccessorHeapData;

    fn index(&self, index: Accessor) -> &Self::Output {
        &self.heap.accessors[index]
    }
}

impl IndexMut<Accessor> for Agent {
    fn index_mut(&mut self, index: Accessor) -> &mut Self::Output {
        &mut self.heap.accessors[index]
    }
}

impl Index<Accessor> for Vec<Option<AccessorHeapData>> {
    type Output = AccessorHeapData;

    fn index(&self, index: Accessor) -> &Self::Output {
        self.get(index.get_index())
            .expect("Accessor out of bounds")
            .as_ref()
            .expect("Accessor slot empty")
    }
}

impl IndexMut<Accessor> for Vec<Option<AccessorHeapData>> {
    fn index_mut(&mut self, index: Accessor) -> &mut Self::Output {
        self.get_mut(index.get_index())
            .expect("Accessor out of bounds")
            .as_mut()
            .expect("Accessor slot empty")
    }
}

impl CreateHeapData<AccessorHeapData, Accessor> for Heap {
    fn create(&mut self, data: AccessorHeapData) -> Accessor {
        self.accessors.push(Some(data));
        Accessor(AccessorIndex::last(&self.accessors))
    }
}
