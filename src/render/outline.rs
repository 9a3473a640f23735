use crate::graph::{Connection, Flowchart, Node};
use itertools::Itertools;
use std::fmt;

/// Formats a flowchart as a plain-text listing of its nodes and connections.
///
/// Nodes appear in creation order, connections grouped by their source node in the same order,
/// so two identical flowcharts always render identically.
pub struct Outline<'a> {
    pub flowchart: &'a Flowchart,
}

impl<'a> Outline<'a> {
    pub fn new(flowchart: &'a Flowchart) -> Self {
        Self { flowchart }
    }

    fn fmt_node(&self, node: &Node, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {} [{}] at ({}, {}): {}",
            node.id,
            node.node_type.as_str(),
            node.x,
            node.y,
            node.text
        )
    }

    fn fmt_connection(&self, connection: &Connection, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  {}({}) -> {}({})",
            connection.start_item_id,
            connection.start_point,
            connection.end_item_id,
            connection.end_point
        )?;
        match &connection.label {
            Some(label) => writeln!(f, " [{}]", label),
            None => writeln!(f),
        }
    }
}

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chart = self.flowchart;
        writeln!(f, "flowchart v{}", chart.version)?;

        writeln!(f, "nodes ({}):", chart.items.len())?;
        for node in &chart.items {
            self.fmt_node(node, f)?;
        }

        writeln!(f, "connections ({}):", chart.connections.len())?;
        let order: ahash::AHashMap<_, _> = chart
            .items
            .iter()
            .enumerate()
            .map(|(i, n)| (&n.id, i))
            .collect();
        let grouped = chart
            .connections
            .iter()
            .enumerate()
            .sorted_by_key(|(i, c)| (order.get(&c.start_item_id).copied().unwrap_or(usize::MAX), *i))
            .map(|(_, c)| c);
        for connection in grouped {
            self.fmt_connection(connection, f)?;
        }
        Ok(())
    }
}

/// Renders the outline of `flowchart` to a string.
pub fn outline(flowchart: &Flowchart) -> String {
    Outline::new(flowchart).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ConnectionPoint, NodeId, NodeType};

    fn node(id: &str, node_type: NodeType, y: f64, text: &str) -> Node {
        Node {
            id: NodeId::from(id),
            node_type,
            x: 0.0,
            y,
            width: 125.0,
            height: 75.0,
            text: text.to_string(),
        }
    }

    #[test]
    fn lists_nodes_then_connections_by_source() {
        let chart = Flowchart {
            items: vec![
                node("start_0", NodeType::Start, 0.0, "Start"),
                node("decision_1", NodeType::Decision, 125.0, "n > 0"),
                node("process_2", NodeType::Process, 275.0, "pos"),
            ],
            connections: vec![
                Connection {
                    start_item_id: NodeId::from("decision_1"),
                    start_point: ConnectionPoint::Right,
                    end_item_id: NodeId::from("process_2"),
                    end_point: ConnectionPoint::Up,
                    label: Some("yes".to_string()),
                },
                Connection {
                    start_item_id: NodeId::from("start_0"),
                    start_point: ConnectionPoint::Down,
                    end_item_id: NodeId::from("decision_1"),
                    end_point: ConnectionPoint::Up,
                    label: None,
                },
            ],
            ..Flowchart::default()
        };

        let text = outline(&chart);
        let expected = "\
flowchart v1.0
nodes (3):
  start_0 [start] at (0, 0): Start
  decision_1 [decision] at (0, 125): n > 0
  process_2 [process] at (0, 275): pos
connections (2):
  start_0(down) -> decision_1(up)
  decision_1(right) -> process_2(up) [yes]
";
        assert_eq!(text, expected);
    }
}
