use super::{Node, NodeId, NodeType};
use crate::config::NodeSizes;
use crate::error::RegistryError;
use crate::layout::Cursor;
use ahash::AHashMap;

/// Owns node identity, attributes and positions for one conversion.
///
/// Ids are `"{type}_{counter}"`, suffixed with the registry's namespace when one is set, so
/// that several function subgraphs can be merged into one flowchart without collisions.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    index: AHashMap<NodeId, usize>,
    counter: usize,
    namespace: Option<String>,
    sizes: NodeSizes,
}

impl NodeRegistry {
    pub fn new(sizes: NodeSizes) -> Self {
        Self {
            nodes: Vec::new(),
            index: AHashMap::new(),
            counter: 0,
            namespace: None,
            sizes,
        }
    }

    pub fn with_namespace(sizes: NodeSizes, namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::new(sizes)
        }
    }

    fn next_id(&mut self, node_type: NodeType) -> NodeId {
        let id = match &self.namespace {
            Some(ns) => format!("{}_{}_{}", node_type.as_str(), self.counter, ns),
            None => format!("{}_{}", node_type.as_str(), self.counter),
        };
        self.counter += 1;
        NodeId::new(id)
    }

    /// Creates and stores a node at `position` with the fixed size of its type.
    pub fn create_node(&mut self, node_type: NodeType, text: &str, position: Cursor) -> &Node {
        let id = self.next_id(node_type);
        let size = self.sizes.for_type(node_type);
        let slot = self.nodes.len();
        self.index.insert(id.clone(), slot);
        self.nodes.push(Node {
            id,
            node_type,
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
            text: text.to_string(),
        });
        &self.nodes[slot]
    }

    pub fn get(&self, id: &NodeId) -> Result<&Node, RegistryError> {
        self.index
            .get(id)
            .map(|&slot| &self.nodes[slot])
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in creation order.
    pub fn all(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Shifts every node by the same offset. Used when subgraphs are arranged side by side.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for node in &mut self.nodes {
            node.x += dx;
            node.y += dy;
        }
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}
