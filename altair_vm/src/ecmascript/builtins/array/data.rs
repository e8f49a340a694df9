// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::Object;
use crate::heap::indexed_properties::IndexedProperties;

#[derive(Debug, Clone, Default)]
pub struct ArrayHeapData {
    pub prototype: Option<Object>,
    pub indexed: IndexedProperties,
    /// The `length` property. Kept outside the indexed storage; storage
    /// top and length often differ.
    pub length: u32,
}
