//! A linked list that flattens all its nodes onto a Vec for storage, gaining
//! data locality and O(1) removal through handles at the expense of ever
//! giving memory back before `clear`.

/// Alias for the index of a node in the linked list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// A node that lives in a linked list.
#[derive(Clone)]
struct Node<T> {
    /// The value being stored. `None` once the node has been freelisted.
    value: Option<T>,

    /// The index of the node previous to this one.
    prev: NodeHandle,

    /// The index of the next node in the list.
    next: NodeHandle,
}

/// A circular list kept in a single contiguous Vec of nodes, addressed by
/// their position in the Vec. Removed nodes are freelisted and reused by
/// later pushes; there is no compaction.
///
/// Handles leak out of the list on purpose: [`OrderedMap`] keeps the handle
/// for each key next to its value, so a key can be unlinked from the order
/// sequence without scanning for it. Unlinking only rewires the neighbours,
/// which keeps the relative order of every other node intact.
///
/// [`OrderedMap`]: crate::OrderedMap
#[derive(Clone)]
pub(crate) struct LinkedList<T> {
    /// The nodes in the list.
    store: Vec<Node<T>>,

    /// Entries in the list which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// The first node in the list. Its `prev` is the last node.
    head: Option<NodeHandle>,
}

impl<T> LinkedList<T> {
    /// Creates a new linked list with a specific capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
        }
    }

    /// The length of this linked list.
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    /// Gets an element from the list, if the handle still points at a live
    /// node.
    #[cfg(test)]
    pub(crate) fn get(&self, node: NodeHandle) -> Option<&T> {
        self.store.get(node.0).and_then(|node| node.value.as_ref())
    }

    /// Appends t to the back of the list and returns a handle to the node.
    pub(crate) fn push_back(&mut self, t: T) -> NodeHandle {
        // use the first available location in the storage vec, or infer what
        // the next location will be on push.
        let idx = self
            .free
            .pop()
            .unwrap_or_else(|| NodeHandle(self.store.len()));

        let mut n = Node {
            value: Some(t),
            prev: idx,
            next: idx,
        };

        if let Some(head) = self.head {
            // the new node sits between the current tail and the head
            let tail = self.store[head.0].prev;
            n.prev = tail;
            n.next = head;

            self.store[tail.0].next = idx;
            self.store[head.0].prev = idx;
        } else {
            self.head = Some(idx);
        }

        if self.store.len() <= idx.0 {
            self.store.push(n);
        } else {
            self.store[idx.0] = n;
        }

        idx
    }

    /// Remove an arbitrary node from the list, handing back its value.
    /// Removing a node twice is a no-op that returns `None`.
    pub(crate) fn remove_node(&mut self, node: NodeHandle) -> Option<T> {
        let value = self.store.get_mut(node.0)?.value.take()?;

        if self.len() == 1 {
            // just reset head and freelist the node
            self.head = None;
        } else {
            let prev = self.store[node.0].prev;
            let next = self.store[node.0].next;

            if self.head == Some(node) {
                self.head = Some(next);
            }

            // link prev to next and next to prev so node doesn't exist in the
            // chain anymore; it'll get overwritten at some later push by
            // placing its handle on the freelist
            self.store[prev.0].next = next;
            self.store[next.0].prev = prev;
        }

        self.free.push(node);
        Some(value)
    }

    /// Walks the list from front to back.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Clears this linked list. Does not free the underlying buffers.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.head = None;
    }
}

/// Front-to-back iterator over a [`LinkedList`].
pub(crate) struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    cursor: Option<NodeHandle>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // the list is circular, so stop by count rather than by wrapping
        if self.remaining == 0 {
            return None;
        }

        let list = self.list;
        let node = &list.store[self.cursor?.0];
        self.remaining -= 1;
        self.cursor = Some(node.next);
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
