//! Nodes and the slot arena that owns them.

/// Handle to a node slot inside a list's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A key/value slot with one forward link per level it participates in.
///
/// `forward[i]` is the next node at level `i`, so a node of height `h` holds
/// `h + 1` links and is present on every level `0..=h`.
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) forward: Vec<Option<NodeId>>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, height: usize) -> Self {
        Self {
            key,
            value,
            forward: vec![None; height + 1],
        }
    }

    /// Highest level this node participates in.
    pub(crate) fn height(&self) -> usize {
        self.forward.len().saturating_sub(1)
    }

    /// Successor at `level`, or `None` past the end or above this node's height.
    pub(crate) fn next(&self, level: usize) -> Option<NodeId> {
        self.forward.get(level).copied().flatten()
    }

    pub(crate) fn set_next(&mut self, level: usize, next: Option<NodeId>) {
        if let Some(link) = self.forward.get_mut(level) {
            *link = next;
        }
    }
}

/// Slot storage for nodes. Removed slots are recycled by later inserts.
#[derive(Debug, Clone)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Move the node out of its slot, releasing it.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(node)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Number of live nodes.
    pub(crate) fn occupied(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
