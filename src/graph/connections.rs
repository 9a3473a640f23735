use super::{Connection, ConnectionPoint, NodeId, NodeRegistry, NodeType};
use crate::error::RegistryError;
use ahash::AHashSet;

/// Result of a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The exact (start, start point, end, end point) tuple already existed; nothing changed.
    Duplicate,
}

/// Owns the directed edges of one conversion. Append-only.
///
/// Duplicate requests are accepted silently so that processors can issue reconnection
/// requests without checking for an existing edge first.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    connections: Vec<Connection>,
    seen: AHashSet<(NodeId, ConnectionPoint, NodeId, ConnectionPoint)>,
    true_label: String,
    false_label: String,
}

impl ConnectionManager {
    pub fn new(true_label: impl Into<String>, false_label: impl Into<String>) -> Self {
        Self {
            connections: Vec::new(),
            seen: AHashSet::new(),
            true_label: true_label.into(),
            false_label: false_label.into(),
        }
    }

    /// Adds an edge after checking both endpoints exist in `nodes`.
    ///
    /// When `label` is `None` and the start node is a decision, the label is derived from the
    /// start point: `down` is the false branch, `left`/`right` the true branch.
    pub fn add(
        &mut self,
        nodes: &NodeRegistry,
        start: &NodeId,
        start_point: ConnectionPoint,
        end: &NodeId,
        end_point: ConnectionPoint,
        label: Option<String>,
    ) -> Result<AddOutcome, RegistryError> {
        let start_node = nodes
            .get(start)
            .map_err(|_| RegistryError::InvalidEndpoint {
                start: start.clone(),
                end: end.clone(),
                missing: start.clone(),
            })?;
        if !nodes.contains(end) {
            return Err(RegistryError::InvalidEndpoint {
                start: start.clone(),
                end: end.clone(),
                missing: end.clone(),
            });
        }

        let key = (start.clone(), start_point, end.clone(), end_point);
        if self.seen.contains(&key) {
            return Ok(AddOutcome::Duplicate);
        }

        let label = label.or_else(|| match (start_node.node_type, start_point) {
            (NodeType::Decision, ConnectionPoint::Down) => Some(self.false_label.clone()),
            (NodeType::Decision, ConnectionPoint::Left | ConnectionPoint::Right) => {
                Some(self.true_label.clone())
            }
            _ => None,
        });

        self.seen.insert(key);
        self.connections.push(Connection {
            start_item_id: start.clone(),
            start_point,
            end_item_id: end.clone(),
            end_point,
            label,
        });
        Ok(AddOutcome::Added)
    }

    /// Whether any edge runs from `start` to `end`, regardless of points and label.
    pub fn exists(&self, start: &NodeId, end: &NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| &c.start_item_id == start && &c.end_item_id == end)
    }

    /// All edges in insertion order.
    pub fn all(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn into_connections(self) -> Vec<Connection> {
        self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeSizes;
    use crate::layout::Cursor;

    fn registry_with(types: &[NodeType]) -> (NodeRegistry, Vec<NodeId>) {
        let mut nodes = NodeRegistry::new(NodeSizes::default());
        let ids = types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                nodes
                    .create_node(*t, "n", Cursor { x: 0.0, y: i as f64 * 125.0 })
                    .id
                    .clone()
            })
            .collect();
        (nodes, ids)
    }

    #[test]
    fn duplicate_tuple_is_a_noop() {
        let (nodes, ids) = registry_with(&[NodeType::Process, NodeType::Process]);
        let mut manager = ConnectionManager::new("yes", "no");

        let first = manager.add(&nodes, &ids[0], ConnectionPoint::Down, &ids[1], ConnectionPoint::Up, None);
        let second = manager.add(&nodes, &ids[0], ConnectionPoint::Down, &ids[1], ConnectionPoint::Up, None);

        assert_eq!(first, Ok(AddOutcome::Added));
        assert_eq!(second, Ok(AddOutcome::Duplicate));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn different_points_are_distinct_edges() {
        let (nodes, ids) = registry_with(&[NodeType::Decision, NodeType::Process]);
        let mut manager = ConnectionManager::new("yes", "no");

        manager
            .add(&nodes, &ids[0], ConnectionPoint::Down, &ids[1], ConnectionPoint::Up, None)
            .unwrap();
        manager
            .add(&nodes, &ids[0], ConnectionPoint::Right, &ids[1], ConnectionPoint::Up, None)
            .unwrap();

        assert_eq!(manager.len(), 2);
        assert!(manager.exists(&ids[0], &ids[1]));
        assert!(!manager.exists(&ids[1], &ids[0]));
    }

    #[test]
    fn decision_labels_follow_the_start_point() {
        let (nodes, ids) = registry_with(&[NodeType::Decision, NodeType::Process, NodeType::Process]);
        let mut manager = ConnectionManager::new("yes", "no");

        manager
            .add(&nodes, &ids[0], ConnectionPoint::Right, &ids[1], ConnectionPoint::Up, None)
            .unwrap();
        manager
            .add(&nodes, &ids[0], ConnectionPoint::Down, &ids[2], ConnectionPoint::Up, None)
            .unwrap();
        manager
            .add(&nodes, &ids[1], ConnectionPoint::Down, &ids[2], ConnectionPoint::Up, None)
            .unwrap();

        let labels: Vec<_> = manager.all().iter().map(|c| c.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("yes"), Some("no"), None]);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let (nodes, ids) = registry_with(&[NodeType::Process]);
        let mut manager = ConnectionManager::new("yes", "no");
        let ghost = NodeId::from("process_99");

        let err = manager
            .add(&nodes, &ids[0], ConnectionPoint::Down, &ghost, ConnectionPoint::Up, None)
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::InvalidEndpoint {
                start: ids[0].clone(),
                end: ghost.clone(),
                missing: ghost,
            }
        );
        assert!(manager.is_empty());
    }
}
