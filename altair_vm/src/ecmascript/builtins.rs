// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod accessor;
pub mod array;
#[cfg(feature = "array-buffer")]
pub mod array_buffer;
pub mod builtin_function;
#[cfg(feature = "array-buffer")]
pub mod data_view;
pub mod error;
pub mod indexed_collections;
#[cfg(feature = "array-buffer")]
pub mod typed_array;

pub use accessor::{Accessor, AccessorHeapData};
pub use array::{array_create, array_length, array_set_length, ArrayHeapData};
pub use builtin_function::{
    create_builtin, create_builtin_function, ArgumentsList, Behaviour, Builtin, BuiltinFunction,
};
pub use error::ErrorHeapData;
pub use indexed_collections::array_objects::{ArrayConstructor, ArrayPrototype};
