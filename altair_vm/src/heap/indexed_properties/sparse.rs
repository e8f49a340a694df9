// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::compact::CompactStorage;
use super::slot::{PropertyAttributes, PropertySlot};

/// Node key marking a free-list entry.
const FREE_SENTINEL: u32 = u32::MAX;

/// Nodes are handed out from power-of-two blocks; this is the first
/// block's size.
pub const INITIAL_NODE_BLOCK: u32 = 16;

/// Handle to a node in a [`SparseStorage`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef(u32);

impl NodeRef {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
struct Node {
    /// Property index; [`FREE_SENTINEL`] while the node sits on the
    /// free list.
    index: u32,
    slot: PropertySlot,
    attributes: PropertyAttributes,
    color: Color,
    parent: Option<NodeRef>,
    less: Option<NodeRef>,
    greater: Option<NodeRef>,
}

/// Ordered map from property index to slot, as an arena-allocated
/// red-black tree. Freed nodes go onto a free list threaded through
/// their `less` links; the arena itself never shrinks.
#[derive(Debug, Clone)]
pub struct SparseStorage {
    nodes: Vec<Node>,
    root: Option<NodeRef>,
    free: Option<NodeRef>,
    used: u32,
    has_special: bool,
    has_read_only: bool,
}

impl SparseStorage {
    pub fn new() -> Self {
        let mut storage = Self {
            nodes: Vec::new(),
            root: None,
            free: None,
            used: 0,
            has_special: false,
            has_read_only: false,
        };
        storage.grow_block();
        storage
    }

    /// Build a sparse storage holding every present entry of a compact
    /// one. Returns None when the compact storage is entirely empty.
    pub fn from_compact(compact: &CompactStorage) -> Option<Self> {
        if !compact.has_used(u32::MAX) {
            return None;
        }
        let mut storage = Self::new();
        compact.for_each_present(|index, slot, attributes| {
            storage.insert(index, slot, attributes);
        });
        Some(storage)
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn has_special(&self) -> bool {
        self.has_special
    }

    pub fn has_read_only(&self) -> bool {
        self.has_read_only
    }

    /// True when inserting a new key would need a fresh node block. This
    /// is the decision point for demoting back to compact storage.
    pub fn needs_block(&self) -> bool {
        self.free.is_none()
    }

    pub fn node_index(&self, node: NodeRef) -> u32 {
        self.node(node).index
    }

    pub fn node_slot(&self, node: NodeRef) -> PropertySlot {
        self.node(node).slot
    }

    pub fn node_attributes(&self, node: NodeRef) -> PropertyAttributes {
        self.node(node).attributes
    }

    pub fn set_node_slot(&mut self, node: NodeRef, slot: PropertySlot) {
        if matches!(slot, PropertySlot::Accessor(_)) {
            self.has_special = true;
        }
        self.node_mut(node).slot = slot;
    }

    pub fn set_node_attributes(&mut self, node: NodeRef, attributes: PropertyAttributes) {
        if attributes.is_read_only() {
            self.has_read_only = true;
        }
        self.node_mut(node).attributes = attributes;
    }

    pub fn find(&self, index: u32) -> Option<NodeRef> {
        let mut current = self.root;
        while let Some(node) = current {
            let key = self.node(node).index;
            if index == key {
                return Some(node);
            }
            current = if index < key {
                self.node(node).less
            } else {
                self.node(node).greater
            };
        }
        None
    }

    pub fn get(&self, index: u32) -> PropertySlot {
        self.find(index)
            .map_or(PropertySlot::Hole, |node| self.node(node).slot)
    }

    pub fn attributes(&self, index: u32) -> PropertyAttributes {
        self.find(index)
            .map_or_else(PropertyAttributes::default, |node| {
                self.node(node).attributes
            })
    }

    pub fn has_property(&self, index: u32) -> bool {
        self.find(index).is_some()
    }

    pub fn first(&self) -> Option<NodeRef> {
        self.root.map(|root| self.minimum(root))
    }

    pub fn last(&self) -> Option<NodeRef> {
        self.root.map(|root| self.maximum(root))
    }

    /// Smallest key strictly greater than the given node's key, by
    /// structure rather than by key search.
    pub fn successor(&self, node: NodeRef) -> Option<NodeRef> {
        if let Some(greater) = self.node(node).greater {
            return Some(self.minimum(greater));
        }
        let mut child = node;
        let mut parent = self.node(node).parent;
        while let Some(p) = parent {
            if self.node(p).greater != Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    pub fn predecessor(&self, node: NodeRef) -> Option<NodeRef> {
        if let Some(less) = self.node(node).less {
            return Some(self.maximum(less));
        }
        let mut child = node;
        let mut parent = self.node(node).parent;
        while let Some(p) = parent {
            if self.node(p).less != Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// Node with the smallest key `>= index`.
    pub fn lower_bound(&self, index: u32) -> Option<NodeRef> {
        let mut current = self.root;
        let mut best = None;
        while let Some(node) = current {
            let key = self.node(node).index;
            if key == index {
                return Some(node);
            }
            if key > index {
                best = Some(node);
                current = self.node(node).less;
            } else {
                current = self.node(node).greater;
            }
        }
        best
    }

    /// Node with the largest key `<= index`.
    pub fn upper_bound(&self, index: u32) -> Option<NodeRef> {
        let mut current = self.root;
        let mut best = None;
        while let Some(node) = current {
            let key = self.node(node).index;
            if key == index {
                return Some(node);
            }
            if key < index {
                best = Some(node);
                current = self.node(node).greater;
            } else {
                current = self.node(node).less;
            }
        }
        best
    }

    /// Insert a new key. The key must not already be present; updates in
    /// place go through [`Self::set_node_slot`] instead.
    pub fn insert(&mut self, index: u32, slot: PropertySlot, attributes: PropertyAttributes) {
        debug_assert!(index != FREE_SENTINEL);
        debug_assert!(self.find(index).is_none());
        if matches!(slot, PropertySlot::Accessor(_)) {
            self.has_special = true;
        }
        if attributes.is_read_only() {
            self.has_read_only = true;
        }
        let node = self.allocate_node(index, slot, attributes);
        self.used += 1;

        // Ordinary BST insertion, then the red-black fixup.
        let mut parent = None;
        let mut current = self.root;
        while let Some(c) = current {
            parent = Some(c);
            current = if index < self.node(c).index {
                self.node(c).less
            } else {
                self.node(c).greater
            };
        }
        self.node_mut(node).parent = parent;
        match parent {
            None => self.root = Some(node),
            Some(p) => {
                if index < self.node(p).index {
                    self.node_mut(p).less = Some(node);
                } else {
                    self.node_mut(p).greater = Some(node);
                }
            }
        }
        self.insert_fixup(node);
    }

    /// Remove the entry at `index`. Returns false when the dont-delete
    /// attribute blocks removal.
    pub fn delete(&mut self, index: u32) -> bool {
        let Some(node) = self.find(index) else {
            return true;
        };
        if self.node(node).attributes.is_dont_delete() {
            return false;
        }
        self.remove_node(node);
        true
    }

    /// Remove all deletable entries in `[start, end)`, scanning downward.
    /// Returns the adjusted end, as compact truncation does.
    pub fn truncate(&mut self, start: u32, end: u32) -> u32 {
        if end == 0 {
            return start;
        }
        while let Some(node) = self.upper_bound(end - 1) {
            let key = self.node(node).index;
            if key < start {
                break;
            }
            if self.node(node).attributes.is_dont_delete() {
                return key + 1;
            }
            self.remove_node(node);
            if key == 0 {
                break;
            }
        }
        start
    }

    /// Add `delta` to every key in `[index, index + length)`. The tree
    /// shape is untouched; relative order within the range is preserved
    /// and the caller guarantees the shifted range does not collide with
    /// untouched keys, so search order holds at the end even though it is
    /// violated at intermediate steps.
    pub fn renumber(&mut self, index: u32, length: u32, delta: i64) {
        let end = index.saturating_add(length);
        let mut current = self.lower_bound(index);
        while let Some(node) = current {
            let key = self.node(node).index;
            if key >= end {
                break;
            }
            let next = self.successor(node);
            self.node_mut(node).index = (key as i64 + delta) as u32;
            current = next;
        }
    }

    /// Visit every present entry in ascending index order.
    pub fn for_each_present(&self, mut f: impl FnMut(u32, PropertySlot, PropertyAttributes)) {
        let mut current = self.first();
        while let Some(node) = current {
            let n = self.node(node);
            f(n.index, n.slot, n.attributes);
            current = self.successor(node);
        }
    }

    /// Build the equivalent compact storage. The caller has checked that
    /// the result is acceptably dense.
    pub fn to_compact(&self) -> CompactStorage {
        let capacity = self.last().map_or(0, |node| self.node(node).index + 1);
        let mut compact = CompactStorage::new(capacity);
        self.for_each_present(|index, slot, attributes| {
            if attributes.is_default() {
                compact.put(index, slot);
            } else {
                compact.put_with_attributes(index, slot, attributes);
            }
        });
        compact
    }

    /// Exhaustively check the red-black invariants: the root is black, no
    /// red node has a red child, every root-to-leaf path carries the same
    /// number of black nodes, keys are in search order, and parent links
    /// are consistent. Panics on violation.
    pub fn verify(&self) {
        if let Some(root) = self.root {
            assert!(self.node(root).color == Color::Black, "root must be black");
            assert!(self.node(root).parent.is_none());
            self.verify_node(root, None, None);
        }
        let mut counted = 0;
        let mut current = self.first();
        while let Some(node) = current {
            counted += 1;
            current = self.successor(node);
        }
        assert_eq!(counted, self.used, "used count out of sync");
    }

    fn verify_node(&self, node: NodeRef, low: Option<u32>, high: Option<u32>) -> u32 {
        let n = self.node(node);
        assert!(n.index != FREE_SENTINEL, "free node reachable from root");
        if let Some(low) = low {
            assert!(n.index > low, "key order violated");
        }
        if let Some(high) = high {
            assert!(n.index < high, "key order violated");
        }
        let mut less_height = 1;
        let mut greater_height = 1;
        if let Some(less) = n.less {
            assert_eq!(self.node(less).parent, Some(node));
            if n.color == Color::Red {
                assert!(self.node(less).color == Color::Black, "red-red edge");
            }
            less_height = self.verify_node(less, low, Some(n.index));
        }
        if let Some(greater) = n.greater {
            assert_eq!(self.node(greater).parent, Some(node));
            if n.color == Color::Red {
                assert!(self.node(greater).color == Color::Black, "red-red edge");
            }
            greater_height = self.verify_node(greater, Some(n.index), high);
        }
        assert_eq!(less_height, greater_height, "black height mismatch");
        less_height + if n.color == Color::Black { 1 } else { 0 }
    }

    fn node(&self, node: NodeRef) -> &Node {
        &self.nodes[node.index()]
    }

    fn node_mut(&mut self, node: NodeRef) -> &mut Node {
        &mut self.nodes[node.index()]
    }

    fn minimum(&self, mut node: NodeRef) -> NodeRef {
        while let Some(less) = self.node(node).less {
            node = less;
        }
        node
    }

    fn maximum(&self, mut node: NodeRef) -> NodeRef {
        while let Some(greater) = self.node(node).greater {
            node = greater;
        }
        node
    }

    fn grow_block(&mut self) {
        let block = (self.nodes.len() as u32).max(INITIAL_NODE_BLOCK);
        let start = self.nodes.len() as u32;
        self.nodes.reserve_exact(block as usize);
        for offset in 0..block {
            self.nodes.push(Node {
                index: FREE_SENTINEL,
                slot: PropertySlot::Hole,
                attributes: PropertyAttributes::default(),
                color: Color::Red,
                parent: None,
                less: self.free,
                greater: None,
            });
            self.free = Some(NodeRef(start + offset));
        }
    }

    fn allocate_node(
        &mut self,
        index: u32,
        slot: PropertySlot,
        attributes: PropertyAttributes,
    ) -> NodeRef {
        if self.free.is_none() {
            self.grow_block();
        }
        let node = self.free.unwrap();
        self.free = self.node(node).less;
        *self.node_mut(node) = Node {
            index,
            slot,
            attributes,
            color: Color::Red,
            parent: None,
            less: None,
            greater: None,
        };
        node
    }

    fn free_node(&mut self, node: NodeRef) {
        let head = self.free;
        let n = self.node_mut(node);
        n.index = FREE_SENTINEL;
        n.slot = PropertySlot::Hole;
        n.attributes = PropertyAttributes::default();
        n.parent = None;
        n.greater = None;
        n.less = head;
        self.free = Some(node);
    }

    fn rotate_left(&mut self, node: NodeRef) {
        let pivot = self.node(node).greater.unwrap();
        let pivot_less = self.node(pivot).less;
        self.node_mut(node).greater = pivot_less;
        if let Some(child) = pivot_less {
            self.node_mut(child).parent = Some(node);
        }
        let parent = self.node(node).parent;
        self.node_mut(pivot).parent = parent;
        match parent {
            None => self.root = Some(pivot),
            Some(p) => {
                if self.node(p).less == Some(node) {
                    self.node_mut(p).less = Some(pivot);
                } else {
                    self.node_mut(p).greater = Some(pivot);
                }
            }
        }
        self.node_mut(pivot).less = Some(node);
        self.node_mut(node).parent = Some(pivot);
    }

    fn rotate_right(&mut self, node: NodeRef) {
        let pivot = self.node(node).less.unwrap();
        let pivot_greater = self.node(pivot).greater;
        self.node_mut(node).less = pivot_greater;
        if let Some(child) = pivot_greater {
            self.node_mut(child).parent = Some(node);
        }
        let parent = self.node(node).parent;
        self.node_mut(pivot).parent = parent;
        match parent {
            None => self.root = Some(pivot),
            Some(p) => {
                if self.node(p).greater == Some(node) {
                    self.node_mut(p).greater = Some(pivot);
                } else {
                    self.node_mut(p).less = Some(pivot);
                }
            }
        }
        self.node_mut(pivot).greater = Some(node);
        self.node_mut(node).parent = Some(pivot);
    }

    fn color_of(&self, node: Option<NodeRef>) -> Color {
        node.map_or(Color::Black, |n| self.node(n).color)
    }

    fn insert_fixup(&mut self, mut node: NodeRef) {
        while let Some(parent) = self.node(node).parent {
            if self.node(parent).color == Color::Black {
                break;
            }
            // A red parent always has a parent of its own.
            let grandparent = self.node(parent).parent.unwrap();
            if Some(parent) == self.node(grandparent).less {
                let uncle = self.node(grandparent).greater;
                if self.color_of(uncle) == Color::Red {
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(uncle.unwrap()).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    node = grandparent;
                } else {
                    if Some(node) == self.node(parent).greater {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let parent = self.node(node).parent.unwrap();
                    let grandparent = self.node(parent).parent.unwrap();
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.node(grandparent).less;
                if self.color_of(uncle) == Color::Red {
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(uncle.unwrap()).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    node = grandparent;
                } else {
                    if Some(node) == self.node(parent).less {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = self.node(node).parent.unwrap();
                    let grandparent = self.node(parent).parent.unwrap();
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root.unwrap();
        self.node_mut(root).color = Color::Black;
    }

    /// Replace the subtree rooted at `node` with the one rooted at
    /// `replacement` in the parent linkage.
    fn transplant(&mut self, node: NodeRef, replacement: Option<NodeRef>) {
        let parent = self.node(node).parent;
        match parent {
            None => self.root = replacement,
            Some(p) => {
                if self.node(p).less == Some(node) {
                    self.node_mut(p).less = replacement;
                } else {
                    self.node_mut(p).greater = replacement;
                }
            }
        }
        if let Some(r) = replacement {
            self.node_mut(r).parent = parent;
        }
    }

    fn remove_node(&mut self, node: NodeRef) {
        self.used -= 1;
        let less = self.node(node).less;
        let greater = self.node(node).greater;
        let mut removed_color = self.node(node).color;
        let fixup_node;
        let fixup_parent;
        match (less, greater) {
            (None, _) => {
                fixup_node = greater;
                fixup_parent = self.node(node).parent;
                self.transplant(node, greater);
            }
            (_, None) => {
                fixup_node = less;
                fixup_parent = self.node(node).parent;
                self.transplant(node, less);
            }
            (Some(less), Some(greater)) => {
                // Splice out an adjacent node from whichever side has the
                // smaller index gap to the removed key; that side tends to
                // hold the denser cluster and the shallower walk.
                let key = self.node(node).index;
                let less_gap = key - self.node(less).index;
                let greater_gap = self.node(greater).index - key;
                let splice = if less_gap < greater_gap {
                    self.maximum(less)
                } else {
                    self.minimum(greater)
                };
                removed_color = self.node(splice).color;
                if less_gap < greater_gap {
                    // Predecessor: it has no greater child.
                    fixup_node = self.node(splice).less;
                    if self.node(splice).parent == Some(node) {
                        fixup_parent = Some(splice);
                    } else {
                        fixup_parent = self.node(splice).parent;
                        self.transplant(splice, fixup_node);
                        self.node_mut(splice).less = Some(less);
                        self.node_mut(less).parent = Some(splice);
                    }
                    self.transplant(node, Some(splice));
                    self.node_mut(splice).greater = Some(greater);
                    self.node_mut(greater).parent = Some(splice);
                } else {
                    // Successor: it has no less child.
                    fixup_node = self.node(splice).greater;
                    if self.node(splice).parent == Some(node) {
                        fixup_parent = Some(splice);
                    } else {
                        fixup_parent = self.node(splice).parent;
                        self.transplant(splice, fixup_node);
                        self.node_mut(splice).greater = Some(greater);
                        self.node_mut(greater).parent = Some(splice);
                    }
                    self.transplant(node, Some(splice));
                    self.node_mut(splice).less = Some(less);
                    self.node_mut(less).parent = Some(splice);
                }
                let color = self.node(node).color;
                self.node_mut(splice).color = color;
            }
        }
        self.free_node(node);
        if removed_color == Color::Black {
            self.delete_fixup(fixup_node, fixup_parent);
        }
    }

    fn delete_fixup(&mut self, mut node: Option<NodeRef>, mut parent: Option<NodeRef>) {
        while node != self.root && self.color_of(node) == Color::Black {
            let Some(p) = parent else {
                break;
            };
            if self.node(p).less == node {
                let mut sibling = self.node(p).greater.unwrap();
                if self.node(sibling).color == Color::Red {
                    self.node_mut(sibling).color = Color::Black;
                    self.node_mut(p).color = Color::Red;
                    self.rotate_left(p);
                    sibling = self.node(p).greater.unwrap();
                }
                if self.color_of(self.node(sibling).less) == Color::Black
                    && self.color_of(self.node(sibling).greater) == Color::Black
                {
                    self.node_mut(sibling).color = Color::Red;
                    node = Some(p);
                    parent = self.node(p).parent;
                } else {
                    if self.color_of(self.node(sibling).greater) == Color::Black {
                        if let Some(less) = self.node(sibling).less {
                            self.node_mut(less).color = Color::Black;
                        }
                        self.node_mut(sibling).color = Color::Red;
                        self.rotate_right(sibling);
                        sibling = self.node(p).greater.unwrap();
                    }
                    let parent_color = self.node(p).color;
                    self.node_mut(sibling).color = parent_color;
                    self.node_mut(p).color = Color::Black;
                    if let Some(greater) = self.node(sibling).greater {
                        self.node_mut(greater).color = Color::Black;
                    }
                    self.rotate_left(p);
                    node = self.root;
                    break;
                }
            } else {
                let mut sibling = self.node(p).less.unwrap();
                if self.node(sibling).color == Color::Red {
                    self.node_mut(sibling).color = Color::Black;
                    self.node_mut(p).color = Color::Red;
                    self.rotate_right(p);
                    sibling = self.node(p).less.unwrap();
                }
                if self.color_of(self.node(sibling).less) == Color::Black
                    && self.color_of(self.node(sibling).greater) == Color::Black
                {
                    self.node_mut(sibling).color = Color::Red;
                    node = Some(p);
                    parent = self.node(p).parent;
                } else {
                    if self.color_of(self.node(sibling).less) == Color::Black {
                        if let Some(greater) = self.node(sibling).greater {
                            self.node_mut(greater).color = Color::Black;
                        }
                        self.node_mut(sibling).color = Color::Red;
                        self.rotate_left(sibling);
                        sibling = self.node(p).less.unwrap();
                    }
                    let parent_color = self.node(p).color;
                    self.node_mut(sibling).color = parent_color;
                    self.node_mut(p).color = Color::Black;
                    if let Some(less) = self.node(sibling).less {
                        self.node_mut(less).color = Color::Black;
                    }
                    self.rotate_right(p);
                    node = self.root;
                    break;
                }
            }
        }
        if let Some(n) = node {
            self.node_mut(n).color = Color::Black;
        }
    }
}

impl Default for SparseStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::types::Value;

    fn data(value: i32) -> PropertySlot {
        PropertySlot::Data(Value::Integer(value))
    }

    fn put(storage: &mut SparseStorage, index: u32, value: i32) {
        match storage.find(index) {
            Some(node) => storage.set_node_slot(node, data(value)),
            None => storage.insert(index, data(value), PropertyAttributes::default()),
        }
    }

    #[test]
    fn insert_find_delete() {
        let mut storage = SparseStorage::new();
        for index in [5u32, 1, 9, 3, 7, 1000000, 0] {
            put(&mut storage, index, index as i32);
            storage.verify();
        }
        assert_eq!(storage.used(), 7);
        assert_eq!(storage.get(1000000), data(1000000));
        assert_eq!(storage.get(2), PropertySlot::Hole);
        assert!(storage.delete(3));
        storage.verify();
        assert!(!storage.has_property(3));
        assert_eq!(storage.used(), 6);
    }

    #[test]
    fn ordered_traversal() {
        let mut storage = SparseStorage::new();
        let mut indices = [44u32, 2, 97, 13, 8, 60, 21, 5, 77, 34];
        for &index in &indices {
            put(&mut storage, index, index as i32);
        }
        indices.sort_unstable();
        let mut seen = Vec::new();
        storage.for_each_present(|index, _, _| seen.push(index));
        assert_eq!(seen, indices);

        let mut backwards = Vec::new();
        let mut current = storage.last();
        while let Some(node) = current {
            backwards.push(storage.node_index(node));
            current = storage.predecessor(node);
        }
        backwards.reverse();
        assert_eq!(backwards, indices);
    }

    #[test]
    fn bounds() {
        let mut storage = SparseStorage::new();
        for index in [10u32, 20, 30] {
            put(&mut storage, index, 0);
        }
        assert_eq!(storage.lower_bound(15).map(|n| storage.node_index(n)), Some(20));
        assert_eq!(storage.lower_bound(20).map(|n| storage.node_index(n)), Some(20));
        assert_eq!(storage.lower_bound(31), None);
        assert_eq!(storage.upper_bound(15).map(|n| storage.node_index(n)), Some(10));
        assert_eq!(storage.upper_bound(30).map(|n| storage.node_index(n)), Some(30));
        assert_eq!(storage.upper_bound(9), None);
    }

    #[test]
    fn invariants_under_churn() {
        let mut storage = SparseStorage::new();
        // Deterministic pseudo-random churn.
        let mut state = 0x2545f491u32;
        let mut live = Vec::new();
        for _ in 0..500 {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            let index = state % 4096;
            if state & 0x10000 != 0 && !live.is_empty() {
                let victim = live.swap_remove((state as usize) % live.len());
                assert!(storage.delete(victim));
            } else if !storage.has_property(index) {
                put(&mut storage, index, index as i32);
                live.push(index);
            }
            storage.verify();
        }
        live.sort_unstable();
        let mut seen = Vec::new();
        storage.for_each_present(|index, _, _| seen.push(index));
        assert_eq!(seen, live);
    }

    #[test]
    fn renumber_shifts_range() {
        let mut storage = SparseStorage::new();
        for index in [2u32, 4, 6, 100] {
            put(&mut storage, index, index as i32);
        }
        storage.renumber(2, 5, 10);
        storage.verify();
        let mut seen = Vec::new();
        storage.for_each_present(|index, _, _| seen.push(index));
        assert_eq!(seen, vec![12, 14, 16, 100]);
        assert_eq!(storage.get(14), data(4));
    }

    #[test]
    fn truncate_reports_blocked_index() {
        let mut storage = SparseStorage::new();
        for index in [1u32, 5, 9, 13] {
            put(&mut storage, index, 0);
        }
        let node = storage.find(5).unwrap();
        storage.set_node_attributes(node, PropertyAttributes::new(PropertyAttributes::DONT_DELETE));
        assert_eq!(storage.truncate(0, 20), 6);
        storage.verify();
        assert!(storage.has_property(1));
        assert!(storage.has_property(5));
        assert!(!storage.has_property(9));
        assert!(!storage.has_property(13));
    }

    #[test]
    fn compact_round_trip() {
        let mut compact = CompactStorage::new(8);
        compact.put(0, data(1));
        compact.put_with_attributes(
            5,
            data(2),
            PropertyAttributes::new(PropertyAttributes::DONT_ENUM),
        );
        let sparse = SparseStorage::from_compact(&compact).unwrap();
        sparse.verify();
        assert_eq!(sparse.used(), 2);
        assert_eq!(sparse.get(5), data(2));
        assert!(sparse.attributes(5).is_dont_enum());
        let back = sparse.to_compact();
        assert_eq!(back.get(0), data(1));
        assert_eq!(back.get(5), data(2));
        assert!(back.attributes(5).is_dont_enum());
        assert_eq!(back.get_used(), 2);
    }
}
