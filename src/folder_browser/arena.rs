use std::cmp::Ordering;

/// Stable handle to a tree node. Handles of removed nodes never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Arena of nodes addressed by generational [`NodeId`]s.
#[derive(Debug)]
pub struct Tree<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live node count.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert_root(&mut self, value: T) -> NodeId {
        self.allocate(Node {
            value,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Append a child; `None` when `parent` is gone.
    pub fn append(&mut self, parent: NodeId, value: T) -> Option<NodeId> {
        self.node(parent)?;
        let id = self.allocate(Node {
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.node_mut(parent)?.children.push(id);
        Some(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// `id` and its ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), |current| {
            self.parent(*current)
        })
    }

    /// Free every descendant of `id`, keeping `id` itself. Returns how many were freed.
    pub fn clear_children(&mut self, id: NodeId) -> usize {
        let Some(node) = self.node_mut(id) else {
            return 0;
        };
        let mut pending = std::mem::take(&mut node.children);
        let mut freed = 0;
        while let Some(child) = pending.pop() {
            if let Some(node) = self.release(child) {
                pending.extend(node.children);
                freed += 1;
            }
        }
        freed
    }

    /// Free `id` and all its descendants, detaching it from its parent.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let freed = self.clear_children(id);
        if let Some(parent) = self.parent(id)
            && let Some(parent) = self.node_mut(parent)
        {
            parent.children.retain(|child| *child != id);
        }
        self.release(id);
        freed + 1
    }

    pub fn sort_children_by<F>(&mut self, id: NodeId, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let mut children = std::mem::take(&mut node.children);
        children.sort_by(|a, b| match (self.get(*a), self.get(*b)) {
            (Some(a), Some(b)) => compare(a, b),
            _ => Ordering::Equal,
        });
        if let Some(node) = self.node_mut(id) {
            node.children = children;
        }
    }

    fn allocate(&mut self, node: Node<T>) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, id: NodeId) -> Option<Node<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node)
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }
}
