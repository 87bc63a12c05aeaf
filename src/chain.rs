//! Arena-backed singly-linked chain: the collision bucket of the map.
//!
//! Nodes do not own their successors through pointers; every node lives in
//! one `SlotMap` arena shared by the whole table, and links are generational
//! `NodeKey`s. Unlinking a node frees its arena slot, so a stale key can
//! never resolve to a reused slot.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational key of one chain node in the table's arena.
    pub(crate) struct NodeKey;
}

/// A stored key/value pair. The key is immutable once inserted; only the
/// value is ever overwritten in place.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) entry: Entry<K, V>,
    pub(crate) next: Option<NodeKey>,
}

pub(crate) type Arena<K, V> = SlotMap<NodeKey, Node<K, V>>;

/// One bucket: head/tail of a null-terminated singly-linked node sequence
/// plus a node counter. An empty chain (`head == None`) is the empty-bucket
/// marker; it is three words and never heap-allocates.
///
/// The chain performs no key comparison itself; callers pass a predicate so
/// the table can run borrowed (`Borrow<Q>`) lookups without constructing a
/// `K`. Duplicate suppression is the table's responsibility.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Chain {
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    len: usize,
}

impl Chain {
    pub(crate) const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Append a new entry at the tail. O(1) via the cached tail key.
    pub(crate) fn push_back<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        key: K,
        value: V,
    ) -> NodeKey {
        let node = arena.insert(Node {
            entry: Entry { key, value },
            next: None,
        });
        match self.tail {
            Some(tail) => arena[tail].next = Some(node),
            None => {
                debug_assert!(self.head.is_none());
                self.head = Some(node);
            }
        }
        self.tail = Some(node);
        self.len += 1;
        node
    }

    /// Linear scan from the head; first node whose key satisfies the
    /// predicate wins. With unique keys at most one node can match.
    pub(crate) fn find<K, V, F>(&self, arena: &Arena<K, V>, mut matches: F) -> Option<NodeKey>
    where
        F: FnMut(&K) -> bool,
    {
        let mut cursor = self.head;
        while let Some(key) = cursor {
            let node = &arena[key];
            if matches(&node.entry.key) {
                return Some(key);
            }
            cursor = node.next;
        }
        None
    }

    /// Scan with predecessor tracking; on a match, unlink the node, free its
    /// arena slot, and return the owned entry. Head and tail are updated when
    /// the match is the first/last node. No match (including an empty chain)
    /// is `None`, never an error.
    pub(crate) fn remove<K, V, F>(
        &mut self,
        arena: &mut Arena<K, V>,
        mut matches: F,
    ) -> Option<Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let mut prev: Option<NodeKey> = None;
        let mut cursor = self.head;
        while let Some(key) = cursor {
            if matches(&arena[key].entry.key) {
                let node = arena.remove(key)?;
                match prev {
                    Some(p) => arena[p].next = node.next,
                    None => self.head = node.next,
                }
                if self.tail == Some(key) {
                    debug_assert!(node.next.is_none());
                    self.tail = prev;
                }
                self.len -= 1;
                return Some(node.entry);
            }
            prev = cursor;
            cursor = arena[key].next;
        }
        None
    }

    /// Walk the live node keys from head to tail.
    pub(crate) fn nodes<'a, K, V>(
        &self,
        arena: &'a Arena<K, V>,
    ) -> impl Iterator<Item = NodeKey> + 'a {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let key = cursor?;
            cursor = arena[key].next;
            Some(key)
        })
    }
}
