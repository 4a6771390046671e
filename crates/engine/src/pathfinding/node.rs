use std::collections::HashMap;

use crate::grid::{Cost, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AStarNode {
    pub position: Position,
    /// Back-reference into the owning `NodeMap`; `None` for seeds.
    pub parent: Option<NodeId>,
    pub g: Cost,
    pub h: Cost,
    pub closed: bool,
    pub(crate) heap_index: Option<usize>,
}

impl AStarNode {
    pub fn seed(position: Position, h: Cost) -> Self {
        Self {
            position,
            parent: None,
            g: 0,
            h,
            closed: false,
            heap_index: None,
        }
    }

    pub fn f(&self) -> Cost {
        self.g.saturating_add(self.h)
    }

    pub fn is_open(&self) -> bool {
        self.heap_index.is_some()
    }
}

/// Every node a search has seen, addressable by id or by position.
#[derive(Debug, Clone, Default)]
pub struct NodeMap {
    nodes: Vec<AStarNode>,
    index_by_position: HashMap<Position, NodeId>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: AStarNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.index_by_position.insert(node.position, id);
        self.nodes.push(node);
        id
    }

    pub fn find(&self, position: Position) -> Option<NodeId> {
        self.index_by_position.get(&position).copied()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.index_by_position.contains_key(&position)
    }

    pub fn get(&self, id: NodeId) -> &AStarNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut AStarNode {
        &mut self.nodes[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AStarNode> {
        self.nodes.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.nodes.iter().map(|node| node.position)
    }

    /// Node ids from `id` up through its parents to the seed it grew from.
    pub fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.get(cursor).parent {
            chain.push(parent);
            cursor = parent;
        }
        chain
    }
}
