// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use wtf8::{Wtf8, Wtf8Buf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringHeapData {
    pub data: Wtf8Buf,
}

impl StringHeapData {
    /// Longest string the heap will hold, in WTF-8 bytes. Operations
    /// that concatenate, such as `Array.prototype.join`, must check
    /// their result length against this before building it.
    pub const MAX_LENGTH: u32 = (1 << 31) - 1;

    pub fn from_str(str: &str) -> Self {
        StringHeapData {
            data: Wtf8Buf::from_str(str),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    pub fn as_str(&self) -> Option<&str> {
        self.data.as_str()
    }

    pub fn as_wtf8(&self) -> &Wtf8 {
        &self.data
    }

    pub fn push_wtf8(&mut self, other: &Wtf8) {
        self.data.push_wtf8(other);
    }
}

impl From<&str> for StringHeapData {
    fn from(value: &str) -> Self {
        Self::from_str(value)
    }
}

impl From<String> for StringHeapData {
    fn from(value: String) -> Self {
        StringHeapData {
            data: Wtf8Buf::from_string(value),
        }
    }
}
