//! The conversion engine: block trees in, positioned flowcharts out.

mod branch;
pub mod context;
mod engine;
mod looping;

use crate::config::{EndNodePolicy, FlowchartConfig, Labels, NodeSizes};
use crate::error::{ConfigError, ConvertError};
use crate::graph::{Flowchart, NodeId};
use crate::layout::LayoutConfig;
use crate::statement::{IntoProgram, Program, SourceProgram, SourceStatement};
use ahash::{AHashMap, AHashSet};
use engine::FunctionConverter;
use itertools::Itertools;

/// Where each function ended up in a converted flowchart.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSummary {
    pub name: String,
    pub start: NodeId,
    /// The appended end node, if the end-node policy produced one.
    pub end: Option<NodeId>,
    /// First node created for each converted statement, keyed by statement index.
    pub statement_nodes: AHashMap<usize, NodeId>,
}

/// A flowchart together with per-function bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub flowchart: Flowchart,
    pub functions: Vec<FunctionSummary>,
}

/// A builder for configuring and creating a `Converter`.
#[derive(Debug, Clone, Default)]
pub struct ConverterBuilder {
    config: FlowchartConfig,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: FlowchartConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn with_node_sizes(mut self, node_sizes: NodeSizes) -> Self {
        self.config.node_sizes = node_sizes;
        self
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.config.labels = labels;
        self
    }

    pub fn with_end_node_policy(mut self, policy: EndNodePolicy) -> Self {
        self.config.end_node = policy;
        self
    }

    /// Validates the configuration and builds the converter.
    pub fn build(self) -> Result<Converter, ConfigError> {
        self.config.validate()?;
        Ok(Converter {
            config: self.config,
        })
    }
}

/// Converts programs into flowcharts.
///
/// Holds only configuration: every call builds its own registries and context, so one
/// converter can serve any number of conversions, from any thread.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: FlowchartConfig,
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn config(&self) -> &FlowchartConfig {
        &self.config
    }

    pub fn convert(&self, program: &Program) -> Result<Flowchart, ConvertError> {
        Ok(self.convert_detailed(program)?.flowchart)
    }

    /// Structures and converts a single function's statement list.
    pub fn convert_statements(&self, statements: &[SourceStatement]) -> Result<Flowchart, ConvertError> {
        self.convert(&statements.into_program()?)
    }

    pub fn convert_source(&self, source: SourceProgram) -> Result<Flowchart, ConvertError> {
        self.convert(&source.into_program()?)
    }

    /// Converts every function and arranges the subgraphs side by side, in program order.
    pub fn convert_detailed(&self, program: &Program) -> Result<Conversion, ConvertError> {
        let layout = &self.config.layout;
        let mut flowchart = Flowchart::default();
        let mut functions = Vec::with_capacity(program.functions.len());
        let mut namespaces = AHashSet::new();
        let mut right_edge: Option<f64> = None;

        for (i, function) in program.functions.iter().enumerate() {
            let namespace = (i > 0).then(|| unique_namespace(&function.name, i, &mut namespaces));
            let mut graph = FunctionConverter::new(&self.config, function, namespace).run()?;

            // Every function starts on the origin row, so arranging only moves x.
            if let Some(edge) = right_edge {
                let min_x = graph
                    .nodes
                    .all()
                    .iter()
                    .map(|n| n.x)
                    .minmax_by(f64::total_cmp)
                    .into_option()
                    .map_or(layout.origin_x, |(min, _)| min);
                let dx = edge + layout.function_offset_x - min_x;
                graph.nodes.translate(dx, 0.0);
                tracing::debug!(function = %function.name, dx, "arranged function subgraph");
            }

            let function_edge = graph
                .nodes
                .all()
                .iter()
                .map(|n| n.right_edge())
                .max_by(f64::total_cmp);
            right_edge = match (right_edge, function_edge) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };

            functions.push(FunctionSummary {
                name: function.name.clone(),
                start: graph.start,
                end: graph.end,
                statement_nodes: graph.statement_nodes,
            });
            flowchart.items.extend(graph.nodes.into_nodes());
            flowchart
                .connections
                .extend(graph.connections.into_connections());
        }

        tracing::debug!(
            functions = functions.len(),
            nodes = flowchart.items.len(),
            connections = flowchart.connections.len(),
            "conversion finished"
        );
        Ok(Conversion {
            flowchart,
            functions,
        })
    }
}

/// A node-id suffix derived from a function name, unique within one conversion.
fn unique_namespace(name: &str, position: usize, used: &mut AHashSet<String>) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    let base = if sanitized.is_empty() {
        format!("func_{}", position)
    } else {
        sanitized
    };
    let mut candidate = base.clone();
    let mut n = 1;
    while !used.insert(candidate.clone()) {
        n += 1;
        candidate = format!("{}_{}", base, n);
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converter_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }

    #[test]
    fn builder_rejects_invalid_layouts() {
        let layout = LayoutConfig {
            level_height: -1.0,
            ..LayoutConfig::default()
        };
        assert!(Converter::builder().with_layout(layout).build().is_err());
    }

    #[test]
    fn namespaces_are_sanitized_and_unique() {
        let mut used = AHashSet::new();
        assert_eq!(unique_namespace("helper", 1, &mut used), "helper");
        assert_eq!(unique_namespace("helper", 2, &mut used), "helper_2");
        assert_eq!(unique_namespace("a-b c", 3, &mut used), "abc");
        assert_eq!(unique_namespace("()", 4, &mut used), "func_4");
    }
}
