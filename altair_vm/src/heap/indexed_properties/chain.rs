// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merged traversal over the indexed properties a receiver can see,
//! own properties and inherited ones alike.
//!
//! One component iterator is kept per prototype-chain object that had
//! indexed properties when the walk began, the receiver always first.
//! When any chain object carries indexed accessors, every prototype is
//! kept as a component even while empty, since a getter may populate
//! it mid-walk.
//! Each step repositions every component with a bound search and takes
//! the minimum (or maximum, going backwards), ties won by the earliest
//! component so own properties shadow inherited ones.

use super::{
    delete, get_through_accessor, iterator::IndexedPropertyIterator, slot::PropertySlot,
};
use crate::ecmascript::{
    execution::{Agent, JsResult},
    types::{Object, Value},
};

#[derive(Debug, Clone)]
pub struct ArrayPropertyIterator {
    components: Vec<IndexedPropertyIterator>,
    /// Component that produced the current index.
    active: usize,
    current: u32,
    started: bool,
}

impl ArrayPropertyIterator {
    pub fn new(agent: &Agent, object: Object) -> Self {
        // A getter anywhere on the chain can add entries to an object
        // that is empty right now, so accessors force every prototype
        // in as a component. An empty component simply yields nothing.
        let mut accessors = super::has_indexed_getters_or_setters(agent, object);
        let mut link = object.prototype(agent);
        while let Some(prototype) = link {
            accessors = accessors || super::has_indexed_getters_or_setters(agent, prototype);
            link = prototype.prototype(agent);
        }
        let mut components = vec![IndexedPropertyIterator::new(object)];
        let mut link = object.prototype(agent);
        while let Some(prototype) = link {
            if accessors || super::has_indexed_properties(agent, prototype) {
                components.push(IndexedPropertyIterator::new(prototype));
            }
            link = prototype.prototype(agent);
        }
        Self {
            components,
            active: 0,
            current: 0,
            started: false,
        }
    }

    /// The receiver the iterator was created for.
    pub fn receiver(&self) -> Object {
        self.components[0].object()
    }

    pub fn current(&self) -> Option<u32> {
        self.started.then_some(self.current)
    }

    pub fn reset(&mut self) {
        self.started = false;
        for component in &mut self.components {
            component.reset();
        }
    }

    pub fn flush_cache(&mut self) {
        for component in &mut self.components {
            component.flush_cache();
        }
    }

    /// Advance to the lowest index above the current position that is
    /// present anywhere on the chain.
    pub fn next(&mut self, agent: &Agent) -> Option<u32> {
        let from = if self.started {
            self.current.checked_add(1)?
        } else {
            0
        };
        let mut best: Option<(u32, usize)> = None;
        for (position, component) in self.components.iter_mut().enumerate() {
            if let Some(index) = component.lower_bound(agent, from) {
                if best.is_none_or(|(found, _)| index < found) {
                    best = Some((index, position));
                }
            }
        }
        let (index, position) = best?;
        self.started = true;
        self.current = index;
        self.active = position;
        Some(index)
    }

    /// Step back to the highest index below the current position that
    /// is present anywhere on the chain.
    pub fn previous(&mut self, agent: &Agent) -> Option<u32> {
        let limit = if self.started {
            self.current.checked_sub(1)?
        } else {
            u32::MAX
        };
        let mut best: Option<(u32, usize)> = None;
        for (position, component) in self.components.iter_mut().enumerate() {
            if let Some(index) = component.upper_bound(agent, limit) {
                if best.is_none_or(|(found, _)| index > found) {
                    best = Some((index, position));
                }
            }
        }
        let (index, position) = best?;
        self.started = true;
        self.current = index;
        self.active = position;
        Some(index)
    }

    /// Position at and return the lowest chain-visible index `>= limit`.
    pub fn lower_bound(&mut self, agent: &Agent, limit: u32) -> Option<u32> {
        if limit == 0 {
            self.started = false;
        } else {
            self.started = true;
            self.current = limit - 1;
        }
        self.next(agent)
    }

    /// Position at and return the highest chain-visible index
    /// `<= limit`.
    pub fn upper_bound(&mut self, agent: &Agent, limit: u32) -> Option<u32> {
        if limit == u32::MAX {
            self.started = false;
        } else {
            self.started = true;
            self.current = limit + 1;
        }
        self.previous(agent)
    }

    /// Read the value at the current index from the shadowing chain
    /// object. An inherited getter runs with the receiver as its this
    /// value.
    pub fn get_value(&mut self, agent: &mut Agent) -> JsResult<Option<Value>> {
        let Some(index) = self.current() else {
            return Ok(None);
        };
        let holder = self.components[self.active].object();
        match super::get_own_slot(agent, holder, index) {
            PropertySlot::Hole => {
                // The shadowing entry vanished; fall back to a full
                // chain lookup.
                self.flush_cache();
                super::get_from_chain(agent, self.receiver(), index)
            }
            PropertySlot::Data(value) => Ok(Some(value)),
            PropertySlot::Accessor(accessor) => {
                self.flush_cache();
                get_through_accessor(agent, self.receiver(), accessor).map(Some)
            }
        }
    }

    /// Delete the receiver's own entry at the current index.
    pub fn delete_value(&mut self, agent: &mut Agent) -> bool {
        let Some(index) = self.current() else {
            return true;
        };
        self.flush_cache();
        delete(agent, self.receiver(), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::types::ObjectHeapData;
    use crate::heap::indexed_properties::put;
    use crate::heap::CreateHeapData;

    fn chain_pair(agent: &mut Agent) -> (Object, Object) {
        let prototype = Object::Object(agent.heap.create(ObjectHeapData::default()));
        let receiver = Object::Object(agent.heap.create(ObjectHeapData {
            prototype: Some(prototype),
            ..Default::default()
        }));
        (receiver, prototype)
    }

    #[test]
    fn merges_own_and_inherited_indices() {
        let mut agent = Agent::default();
        let (receiver, prototype) = chain_pair(&mut agent);
        put(&mut agent, receiver, 0, Value::Integer(10)).unwrap();
        put(&mut agent, receiver, 4, Value::Integer(14)).unwrap();
        put(&mut agent, prototype, 2, Value::Integer(22)).unwrap();
        put(&mut agent, prototype, 4, Value::Integer(24)).unwrap();

        let mut iterator = ArrayPropertyIterator::new(&agent, receiver);
        assert_eq!(iterator.next(&agent), Some(0));
        assert_eq!(iterator.next(&agent), Some(2));
        assert_eq!(
            iterator.get_value(&mut agent).unwrap(),
            Some(Value::Integer(22))
        );
        assert_eq!(iterator.next(&agent), Some(4));
        // The receiver's entry shadows the prototype's.
        assert_eq!(
            iterator.get_value(&mut agent).unwrap(),
            Some(Value::Integer(14))
        );
        assert_eq!(iterator.next(&agent), None);
    }

    #[test]
    fn walks_backwards_over_the_chain() {
        let mut agent = Agent::default();
        let (receiver, prototype) = chain_pair(&mut agent);
        put(&mut agent, receiver, 1, Value::Integer(1)).unwrap();
        put(&mut agent, prototype, 3, Value::Integer(3)).unwrap();

        let mut iterator = ArrayPropertyIterator::new(&agent, receiver);
        assert_eq!(iterator.previous(&agent), Some(3));
        assert_eq!(iterator.previous(&agent), Some(1));
        assert_eq!(iterator.previous(&agent), None);
    }

    #[test]
    fn delete_value_only_touches_the_receiver() {
        let mut agent = Agent::default();
        let (receiver, prototype) = chain_pair(&mut agent);
        put(&mut agent, receiver, 2, Value::Integer(2)).unwrap();
        put(&mut agent, prototype, 2, Value::Integer(-2)).unwrap();

        let mut iterator = ArrayPropertyIterator::new(&agent, receiver);
        assert_eq!(iterator.next(&agent), Some(2));
        assert!(iterator.delete_value(&mut agent));
        // The inherited entry is still visible.
        assert_eq!(
            iterator.get_value(&mut agent).unwrap(),
            Some(Value::Integer(-2))
        );
    }
}
