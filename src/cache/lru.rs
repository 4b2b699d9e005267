//! LRU List Module
//!
//! Recency ordering for cache entries as a doubly-linked list stored in an
//! arena. Nodes are addressed by [`SlotId`] handles that stay valid until the
//! node is removed, so the index can point straight at an entry.

use crate::cache::CacheEntry;

// == Slot Handle ==
/// Stable handle to a node in an [`LruList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

#[derive(Debug)]
struct Node<K, V> {
    entry: CacheEntry<K, V>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

// == LRU List ==
/// Entries ordered by access time.
///
/// - Front (head) = Most recently used
/// - Back (tail) = Least recently used
///
/// Every operation is O(1). Vacated slots are reused by later inserts.
#[derive(Debug)]
pub struct LruList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl<K, V> LruList<K, V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Push Front ==
    /// Inserts an entry as the most recently used and returns its handle.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) -> SlotId {
        let node = Node {
            entry,
            prev: None,
            next: None,
        };

        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                SlotId(self.slots.len() - 1)
            }
        };

        self.link_front(id);
        self.len += 1;
        id
    }

    // == Move To Front ==
    /// Marks an entry as most recently used.
    pub fn move_to_front(&mut self, id: SlotId) {
        if self.head == Some(id) || self.node(id).is_none() {
            return;
        }
        self.unlink(id);
        self.link_front(id);
    }

    // == Remove ==
    /// Unlinks and returns the entry behind `id`, freeing its slot.
    pub fn remove(&mut self, id: SlotId) -> Option<CacheEntry<K, V>> {
        self.node(id)?;
        self.unlink(id);

        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id);
        self.len -= 1;
        Some(node.entry)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Accessors ==
    pub fn get(&self, id: SlotId) -> Option<&CacheEntry<K, V>> {
        self.node(id).map(|node| &node.entry)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut CacheEntry<K, V>> {
        self.node_mut(id).map(|node| &mut node.entry)
    }

    /// Handle of the least recently used entry.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Walks the list from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Drops every entry and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Linking ==
    fn node(&self, id: SlotId) -> Option<&Node<K, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: SlotId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn link_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(node) = self.node_mut(head) {
                    node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn unlink(&mut self, id: SlotId) {
        let (prev, next) = match self.node(id) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_id) => {
                if let Some(node) = self.node_mut(prev_id) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next_id) => {
                if let Some(node) = self.node_mut(next_id) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
    }
}

impl<K, V> Default for LruList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Front-to-back iterator over `(handle, entry)` pairs.
pub struct Iter<'a, K, V> {
    list: &'a LruList<K, V>,
    cursor: Option<SlotId>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (SlotId, &'a CacheEntry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.node(id)?;
        self.cursor = node.next;
        Some((id, &node.entry))
    }
}
