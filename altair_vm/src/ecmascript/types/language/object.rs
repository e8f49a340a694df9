// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::value::Value;
use crate::ecmascript::execution::Agent;
#[cfg(feature = "array-buffer")]
use crate::heap::indexes::{ArrayBufferIndex, TypedArrayIndex};
use crate::heap::indexes::{ArrayIndex, ObjectIndex};
use crate::heap::indexed_properties::IndexedProperties;

/// Object variants that carry an indexed property storage cell. Other
/// object-like values (functions, errors, data views) never hold indexed
/// properties and stay plain [`Value`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Object {
    Object(ObjectIndex),
    Array(ArrayIndex),
    #[cfg(feature = "array-buffer")]
    ArrayBuffer(ArrayBufferIndex),
    #[cfg(feature = "array-buffer")]
    TypedArray(TypedArrayIndex),
}

/// An ordinary object, reduced to the surface the indexed storage
/// subsystem consumes: a prototype link and the indexed storage cell.
#[derive(Debug, Clone, Default)]
pub struct ObjectHeapData {
    pub prototype: Option<Object>,
    pub indexed: IndexedProperties,
}

impl Object {
    /// Read this object's indexed storage cell.
    pub fn indexed_properties(self, agent: &Agent) -> IndexedProperties {
        match self {
            Object::Object(index) => agent[index].indexed,
            Object::Array(index) => agent[index].indexed,
            #[cfg(feature = "array-buffer")]
            Object::ArrayBuffer(index) => IndexedProperties::ByteArray(index),
            #[cfg(feature = "array-buffer")]
            Object::TypedArray(index) => IndexedProperties::TypedArray(index),
        }
    }

    /// Write back a (possibly different) storage cell after an operation
    /// that may have transitioned representations.
    pub fn set_indexed_properties(self, agent: &mut Agent, indexed: IndexedProperties) {
        match self {
            Object::Object(index) => agent[index].indexed = indexed,
            Object::Array(index) => agent[index].indexed = indexed,
            #[cfg(feature = "array-buffer")]
            Object::ArrayBuffer(_) | Object::TypedArray(_) => {
                // Fixed-shape storage is terminal; there is never a new
                // cell to store.
                debug_assert_eq!(indexed, self.indexed_properties(agent));
            }
        }
    }

    pub fn prototype(self, agent: &Agent) -> Option<Object> {
        match self {
            Object::Object(index) => agent[index].prototype,
            Object::Array(index) => agent[index].prototype,
            #[cfg(feature = "array-buffer")]
            Object::ArrayBuffer(_) | Object::TypedArray(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Object::Object(index) => Value::Object(index),
            Object::Array(index) => Value::Array(index),
            #[cfg(feature = "array-buffer")]
            Object::ArrayBuffer(index) => Value::ArrayBuffer(index),
            #[cfg(feature = "array-buffer")]
            Object::TypedArray(index) => Value::TypedArray(index),
        }
    }
}

impl TryFrom<Value> for Object {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(index) => Ok(Object::Object(index)),
            Value::Array(index) => Ok(Object::Array(index)),
            #[cfg(feature = "array-buffer")]
            Value::ArrayBuffer(index) => Ok(Object::ArrayBuffer(index)),
            #[cfg(feature = "array-buffer")]
            Value::TypedArray(index) => Ok(Object::TypedArray(index)),
            _ => Err(()),
        }
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        object.into_value()
    }
}
