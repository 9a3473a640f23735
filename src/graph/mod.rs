use serde::{Deserialize, Serialize};
use std::fmt;

pub mod connections;
pub mod nodes;

pub use connections::{AddOutcome, ConnectionManager};
pub use nodes::NodeRegistry;

/// Format version written into every exported flowchart.
pub const FLOWCHART_VERSION: &str = "1.0";

/// Identity of a node within one conversion result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The graphical shape a node is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Rounded capsule opening a function.
    Start,
    /// Rounded capsule closing a path (`return`, or the appended function end).
    End,
    /// Rectangle.
    Process,
    /// Parallelogram.
    #[serde(alias = "input")]
    Io,
    /// Diamond, used for both conditions and loop tests.
    Decision,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::End => "end",
            NodeType::Process => "process",
            NodeType::Io => "io",
            NodeType::Decision => "decision",
        }
    }
}

/// One of the four attachment points on a node's border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPoint {
    Up,
    Down,
    Left,
    Right,
}

impl fmt::Display for ConnectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionPoint::Up => "up",
            ConnectionPoint::Down => "down",
            ConnectionPoint::Left => "left",
            ConnectionPoint::Right => "right",
        };
        f.write_str(name)
    }
}

/// A positioned flowchart node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
}

impl Node {
    /// Rightmost x covered by this node.
    pub fn right_edge(&self) -> f64 {
        self.x + self.width
    }
}

/// A directed edge between two node attachment points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub start_item_id: NodeId,
    #[serde(rename = "start_point_type", alias = "start_point")]
    pub start_point: ConnectionPoint,
    pub end_item_id: NodeId,
    #[serde(rename = "end_point_type", alias = "end_point")]
    pub end_point: ConnectionPoint,
    #[serde(default)]
    pub label: Option<String>,
}

/// The finished output of a conversion, in the editor's exchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flowchart {
    pub version: String,
    pub items: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl Default for Flowchart {
    fn default() -> Self {
        Self {
            version: FLOWCHART_VERSION.to_string(),
            items: Vec::new(),
            connections: Vec::new(),
        }
    }
}

impl Flowchart {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.items.iter().find(|n| &n.id == id)
    }

    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .iter()
            .filter(move |c| &c.start_item_id == id)
    }

    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| &c.end_item_id == id)
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.items.iter().filter(move |n| n.node_type == node_type)
    }

    /// Finds the first node whose text matches exactly.
    pub fn find_by_text(&self, text: &str) -> Option<&Node> {
        self.items.iter().find(|n| n.text == text)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
