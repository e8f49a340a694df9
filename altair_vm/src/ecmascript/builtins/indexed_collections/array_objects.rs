// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod array_constructor;
mod array_prototype;

pub use array_constructor::ArrayConstructor;
pub use array_prototype::{
    ArrayPrototype, ArrayPrototypeIncludes, ArrayPrototypeIndexOf, ArrayPrototypeJoin,
    ArrayPrototypeLastIndexOf, ArrayPrototypePop, ArrayPrototypePush, ArrayPrototypeReverse,
    ArrayPrototypeShift, ArrayPrototypeSplice, ArrayPrototypeUnshift,
};
