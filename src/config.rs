use crate::error::ConfigError;
use crate::graph::NodeType;
use crate::layout::LayoutConfig;
use serde::{Deserialize, Serialize};

/// Everything a conversion can be tuned with.
///
/// Every field has a default matching the flowchart editor's conventions, and deserialization
/// fills in whatever a partial JSON document leaves out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowchartConfig {
    pub layout: LayoutConfig,
    pub node_sizes: NodeSizes,
    pub labels: Labels,
    pub end_node: EndNodePolicy,
}

impl FlowchartConfig {
    /// Parses a (possibly partial) JSON configuration and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FlowchartConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would produce overlapping or degenerate layouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        check_finite("layout.origin_x", layout.origin_x)?;
        check_finite("layout.origin_y", layout.origin_y)?;
        check_positive("layout.level_height", layout.level_height)?;
        check_positive("layout.condition_offset_x", layout.condition_offset_x)?;
        check_positive("layout.condition_offset_y", layout.condition_offset_y)?;
        check_positive("layout.loop_offset_x", layout.loop_offset_x)?;
        check_positive("layout.loop_offset_y", layout.loop_offset_y)?;
        check_positive("layout.function_offset_x", layout.function_offset_x)?;

        for (name, size) in self.node_sizes.iter() {
            check_positive(&format!("node_sizes.{name}.width"), size.width)?;
            check_positive(&format!("node_sizes.{name}.height"), size.height)?;
        }
        Ok(())
    }
}

fn check_finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("expected a finite number, got {value}"),
        })
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("expected a positive number, got {value}"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

impl NodeSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

const DEFAULT_NODE_SIZE: NodeSize = NodeSize::new(125.0, 75.0);

/// Fixed width/height per node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSizes {
    pub start: NodeSize,
    pub end: NodeSize,
    pub process: NodeSize,
    pub io: NodeSize,
    pub decision: NodeSize,
}

impl Default for NodeSizes {
    fn default() -> Self {
        Self {
            start: DEFAULT_NODE_SIZE,
            end: DEFAULT_NODE_SIZE,
            process: DEFAULT_NODE_SIZE,
            io: DEFAULT_NODE_SIZE,
            decision: DEFAULT_NODE_SIZE,
        }
    }
}

impl NodeSizes {
    pub fn for_type(&self, node_type: NodeType) -> NodeSize {
        match node_type {
            NodeType::Start => self.start,
            NodeType::End => self.end,
            NodeType::Process => self.process,
            NodeType::Io => self.io,
            NodeType::Decision => self.decision,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, NodeSize)> {
        [
            ("start", self.start),
            ("end", self.end),
            ("process", self.process),
            ("io", self.io),
            ("decision", self.decision),
        ]
        .into_iter()
    }
}

/// Texts the converter writes on its own, as opposed to texts copied from statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub start_text: String,
    pub end_text: String,
    /// Label of edges leaving a decision through `left`/`right`.
    pub true_label: String,
    /// Label of edges leaving a decision through `down`.
    pub false_label: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            start_text: "Start".to_string(),
            end_text: "End".to_string(),
            true_label: "yes".to_string(),
            false_label: "no".to_string(),
        }
    }
}

/// When a function gets an appended end node for its fall-through exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndNodePolicy {
    /// Only when the function's top-level sequence holds a `return`.
    #[default]
    OnReturn,
    /// Whenever any path reaches the end of the function.
    Always,
}
