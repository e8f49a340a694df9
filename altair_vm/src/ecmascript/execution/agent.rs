// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::{builtins::error::ErrorHeapData, types::Value};
use crate::heap::{indexes::ErrorIndex, Heap};

/// Embedder-facing knobs passed to [`Agent::new`].
#[derive(Debug, Default)]
pub struct Options {
    /// Re-run the sparse storage invariant verifier after every tree
    /// mutation. Expensive; meant for engine debugging and tests.
    pub verify_storage_integrity: bool,
}

pub type JsResult<T> = std::result::Result<T, JsError>;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct JsError(pub(crate) Value);

impl JsError {
    pub(crate) fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(self) -> Value {
        self.0
    }
}

/// An ECMAScript agent: the heap plus the per-agent options. Execution
/// state beyond the heap (contexts, realms) is out of scope here; user
/// code runs only through builtin behaviour functions and accessors.
#[derive(Debug)]
pub struct Agent {
    pub heap: Heap,
    pub(crate) options: Options,
}

impl Agent {
    pub fn new(options: Options) -> Self {
        Self {
            heap: Heap::new(),
            options,
        }
    }

    pub fn throw_exception(&mut self, kind: ExceptionType, message: &'static str) -> JsError {
        self.heap
            .errors
            .push(Some(ErrorHeapData::new(kind, Some(message))));
        let index = ErrorIndex::last(&self.heap.errors);
        JsError(Value::Error(index))
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
}
