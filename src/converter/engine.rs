use super::context::{
    Awaits, ContextTracker, PendingReconnect, ReconnectKind, Scope, ScopeId, ScopeKind,
};
use crate::config::{EndNodePolicy, FlowchartConfig};
use crate::error::ConvertError;
use crate::graph::{ConnectionManager, ConnectionPoint, NodeId, NodeRegistry, NodeType};
use crate::layout::Cursor;
use crate::statement::{Block, Construct, ControlKind, FunctionDefinition, Statement, Tag};
use ahash::AHashMap;
use std::fmt;

/// The converted subgraph of one function, before arrangement.
#[derive(Debug)]
pub(crate) struct FunctionGraph {
    pub nodes: NodeRegistry,
    pub connections: ConnectionManager,
    pub start: NodeId,
    pub end: Option<NodeId>,
    pub statement_nodes: AHashMap<usize, NodeId>,
}

/// Converts a single function's block tree in one top-to-bottom pass.
///
/// Placing a node resolves whatever awaits the current scope's successor, so edges are created
/// as soon as both ends are known and never revisited.
pub(crate) struct FunctionConverter<'c> {
    pub(super) config: &'c FlowchartConfig,
    function: &'c FunctionDefinition,
    pub(super) nodes: NodeRegistry,
    pub(super) connections: ConnectionManager,
    pub(super) context: ContextTracker,
    current_index: usize,
}

impl<'c> FunctionConverter<'c> {
    pub fn new(
        config: &'c FlowchartConfig,
        function: &'c FunctionDefinition,
        namespace: Option<String>,
    ) -> Self {
        let sizes = config.node_sizes.clone();
        let nodes = match namespace {
            Some(ns) => NodeRegistry::with_namespace(sizes, ns),
            None => NodeRegistry::new(sizes),
        };
        Self {
            config,
            function,
            nodes,
            connections: ConnectionManager::new(
                config.labels.true_label.clone(),
                config.labels.false_label.clone(),
            ),
            context: ContextTracker::new(),
            current_index: 0,
        }
    }

    pub fn run(mut self) -> Result<FunctionGraph, ConvertError> {
        let config = self.config;
        let function = self.function;
        let origin = config.layout.origin();
        let start = self
            .nodes
            .create_node(NodeType::Start, &config.labels.start_text, origin)
            .id
            .clone();
        tracing::debug!(function = %function.name, start = %start, "converting function");

        let scope = self
            .context
            .enter_scope(ScopeKind::Function, Some(start.clone()));
        self.context.add_pending(PendingReconnect::new(
            ReconnectKind::Sequential,
            start.clone(),
            ConnectionPoint::Down,
            Awaits::Successor(scope),
        ));

        let cursor = self.convert_block(&function.body, config.layout.below(origin), scope)?;

        self.current_index = function.statement_count;
        let end = self.finish(scope, cursor)?;
        self.exit_scope()?;

        if !self.context.is_empty() {
            return Err(self.internal(format!(
                "{} pending reconnect(s) left after the last statement",
                self.context.pending_count()
            )));
        }

        tracing::debug!(
            function = %function.name,
            nodes = self.nodes.len(),
            connections = self.connections.len(),
            "converted function"
        );

        Ok(FunctionGraph {
            statement_nodes: self.context.first_nodes().clone(),
            nodes: self.nodes,
            connections: self.connections,
            start,
            end,
        })
    }

    /// Applies the end-node policy to whatever still falls through the function body.
    fn finish(&mut self, scope: ScopeId, cursor: Cursor) -> Result<Option<NodeId>, ConvertError> {
        if !self.context.has_pending(Awaits::Successor(scope)) {
            return Ok(None);
        }

        let append = match self.config.end_node {
            EndNodePolicy::Always => true,
            EndNodePolicy::OnReturn => self.function.returns_at_top_level(),
        };
        if append {
            let end = self
                .nodes
                .create_node(NodeType::End, &self.config.labels.end_text, cursor)
                .id
                .clone();
            self.resolve(Awaits::Successor(scope), &end, ConnectionPoint::Up)?;
            return Ok(Some(end));
        }

        let dropped = self.context.take_pending(Awaits::Successor(scope));
        tracing::warn!(
            function = %self.function.name,
            exits = dropped.len(),
            "function falls off the end without an end node"
        );
        Ok(None)
    }

    /// Converts the constructs of `block` in order, starting at `cursor`, and returns the cursor
    /// below the last one.
    pub(super) fn convert_block(
        &mut self,
        block: &Block,
        cursor: Cursor,
        scope: ScopeId,
    ) -> Result<Cursor, ConvertError> {
        let mut cursor = cursor;
        for construct in block {
            self.current_index = construct.index();
            if !self.context.has_pending(Awaits::Successor(scope)) {
                tracing::warn!(
                    function = %self.function.name,
                    index = construct.index(),
                    "skipping unreachable statement"
                );
                continue;
            }
            cursor = self.convert_construct(construct, cursor, scope)?;
        }
        Ok(cursor)
    }

    fn convert_construct(
        &mut self,
        construct: &Construct,
        cursor: Cursor,
        scope: ScopeId,
    ) -> Result<Cursor, ConvertError> {
        match construct {
            Construct::Simple { index, statement } => {
                let node_type = match statement.tag {
                    Tag::Io => NodeType::Io,
                    _ => NodeType::Process,
                };
                let id = self.place(node_type, statement.display_text(), cursor, scope, *index)?;
                self.context.add_pending(PendingReconnect::new(
                    ReconnectKind::Sequential,
                    id,
                    ConnectionPoint::Down,
                    Awaits::Successor(scope),
                ));
                Ok(self.config.layout.below(cursor))
            }
            Construct::Control {
                index,
                statement,
                kind,
            } => self.convert_control(*index, statement, *kind, cursor, scope),
            Construct::If {
                index,
                statement,
                then_arm,
                else_arm,
            } => self.convert_if(*index, statement, then_arm, else_arm.as_ref(), cursor, scope),
            Construct::Loop {
                index,
                statement,
                body,
            } => self.convert_loop(*index, statement, body, cursor, scope),
        }
    }

    fn convert_control(
        &mut self,
        index: usize,
        statement: &Statement,
        kind: ControlKind,
        cursor: Cursor,
        scope: ScopeId,
    ) -> Result<Cursor, ConvertError> {
        let text = statement.display_text();
        match kind {
            ControlKind::Return => {
                let text = if text.is_empty() {
                    self.config.labels.end_text.clone()
                } else {
                    text.to_string()
                };
                self.place(NodeType::End, &text, cursor, scope, index)?;
            }
            ControlKind::Break => {
                let target = self.enclosing_loop(kind)?;
                let id = self.place(NodeType::Process, text, cursor, scope, index)?;
                self.context.add_pending(PendingReconnect::new(
                    ReconnectKind::BreakJump,
                    id,
                    ConnectionPoint::Left,
                    Awaits::LoopExit(target),
                ));
            }
            ControlKind::Continue => {
                let target = self.enclosing_loop(kind)?;
                let id = self.place(NodeType::Process, text, cursor, scope, index)?;
                self.context.add_pending(PendingReconnect::new(
                    ReconnectKind::ContinueJump,
                    id,
                    ConnectionPoint::Right,
                    Awaits::LoopCondition(target),
                ));
                let condition = self
                    .context
                    .loop_condition_of(target)
                    .cloned()
                    .map_err(|e| self.internal(e))?;
                self.resolve(Awaits::LoopCondition(target), &condition, ConnectionPoint::Up)?;
            }
        }
        Ok(self.config.layout.below(cursor))
    }

    fn enclosing_loop(&self, kind: ControlKind) -> Result<ScopeId, ConvertError> {
        self.context
            .enclosing_loop()
            .ok_or_else(|| ConvertError::MalformedInput {
                function: self.function.name.clone(),
                index: self.current_index,
                reason: format!("'{}' outside of a loop", kind),
            })
    }

    /// Creates a node, connects everything awaiting the scope's successor to it, and records it
    /// as the first node of statement `index`.
    pub(super) fn place(
        &mut self,
        node_type: NodeType,
        text: &str,
        cursor: Cursor,
        scope: ScopeId,
        index: usize,
    ) -> Result<NodeId, ConvertError> {
        let id = self.nodes.create_node(node_type, text, cursor).id.clone();
        tracing::trace!(
            id = %id,
            index,
            x = cursor.x,
            y = cursor.y,
            "placed node"
        );
        self.resolve(Awaits::Successor(scope), &id, ConnectionPoint::Up)?;
        self.context.register_first_node(index, id.clone());
        Ok(id)
    }

    pub(super) fn resolve(
        &mut self,
        awaits: Awaits,
        target: &NodeId,
        target_point: ConnectionPoint,
    ) -> Result<usize, ConvertError> {
        self.context
            .resolve_pending(
                awaits,
                target,
                target_point,
                &self.nodes,
                &mut self.connections,
            )
            .map_err(|e| self.internal(e))
    }

    pub(super) fn exit_scope(&mut self) -> Result<Scope, ConvertError> {
        self.context.exit_scope().map_err(|e| self.internal(e))
    }

    pub(super) fn internal(&self, detail: impl fmt::Display) -> ConvertError {
        ConvertError::InternalInvariant {
            function: self.function.name.clone(),
            index: self.current_index,
            detail: detail.to_string(),
        }
    }
}
