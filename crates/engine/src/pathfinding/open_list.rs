use super::node::{NodeId, NodeMap};

/// Binary min-heap of open node ids keyed by F, then H, then insertion order.
///
/// Each node records its own heap slot (`AStarNode::heap_index`), so a key
/// decrease repositions the node without scanning the heap.
#[derive(Debug, Clone, Default)]
pub struct OpenList {
    heap: Vec<NodeId>,
}

impl OpenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, nodes: &mut NodeMap, id: NodeId) {
        debug_assert!(nodes.get(id).heap_index.is_none(), "node already open");
        let slot = self.heap.len();
        self.heap.push(id);
        nodes.get_mut(id).heap_index = Some(slot);
        self.sift_up(nodes, slot);
    }

    pub fn pop_min(&mut self, nodes: &mut NodeMap) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(nodes, 0, last);
        let min = self.heap.pop()?;
        nodes.get_mut(min).heap_index = None;
        if !self.heap.is_empty() {
            self.sift_down(nodes, 0);
        }
        Some(min)
    }

    /// Restores heap order after the key of an already-open node decreased.
    pub fn decrease_key(&mut self, nodes: &mut NodeMap, id: NodeId) {
        let Some(slot) = nodes.get(id).heap_index else {
            return;
        };
        self.sift_up(nodes, slot);
    }

    fn less(nodes: &NodeMap, a: NodeId, b: NodeId) -> bool {
        let node_a = nodes.get(a);
        let node_b = nodes.get(b);
        (node_a.f(), node_a.h, a) < (node_b.f(), node_b.h, b)
    }

    fn swap(&mut self, nodes: &mut NodeMap, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.heap.swap(i, j);
        nodes.get_mut(self.heap[i]).heap_index = Some(i);
        nodes.get_mut(self.heap[j]).heap_index = Some(j);
    }

    fn sift_up(&mut self, nodes: &mut NodeMap, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !Self::less(nodes, self.heap[slot], self.heap[parent]) {
                break;
            }
            self.swap(nodes, slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, nodes: &mut NodeMap, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && Self::less(nodes, self.heap[left], self.heap[smallest]) {
                smallest = left;
            }
            if right < len && Self::less(nodes, self.heap[right], self.heap[smallest]) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(nodes, slot, smallest);
            slot = smallest;
        }
    }
}
