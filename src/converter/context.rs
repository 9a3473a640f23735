use crate::error::{ContextError, RegistryError};
use crate::graph::{ConnectionManager, ConnectionPoint, NodeId, NodeRegistry};
use ahash::AHashMap;

pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Function,
    LoopBody,
    ThenArm,
    ElseArm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// The node that opened the scope: start node, loop condition, or branch decision.
    pub anchor: Option<NodeId>,
    /// Innermost loop body this scope sits in, the scope itself for a loop body.
    pub enclosing_loop: Option<ScopeId>,
    /// Index of the loop statement that opened a loop body scope.
    pub loop_statement: Option<usize>,
}

/// What a pending reconnect is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Awaits {
    /// The next node placed in the scope, or after it once forwarded outward.
    Successor(ScopeId),
    /// The condition node of a loop body scope.
    LoopCondition(ScopeId),
    /// The first node after a loop body scope's loop.
    LoopExit(ScopeId),
}

impl Awaits {
    pub fn scope(&self) -> ScopeId {
        match self {
            Awaits::Successor(scope) | Awaits::LoopCondition(scope) | Awaits::LoopExit(scope) => {
                *scope
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconnectKind {
    Sequential,
    IfElseConvergence,
    LoopBack,
    LoopExit,
    BreakJump,
    ContinueJump,
}

impl ReconnectKind {
    /// Ordinary end-of-path exits, as opposed to jumps and loop exits.
    pub fn is_fall_through(&self) -> bool {
        matches!(
            self,
            ReconnectKind::Sequential | ReconnectKind::IfElseConvergence
        )
    }
}

/// An edge whose source is known but whose target has not been placed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReconnect {
    pub kind: ReconnectKind,
    pub source: NodeId,
    pub source_point: ConnectionPoint,
    pub awaits: Awaits,
}

impl PendingReconnect {
    pub fn new(kind: ReconnectKind, source: NodeId, source_point: ConnectionPoint, awaits: Awaits) -> Self {
        Self {
            kind,
            source,
            source_point,
            awaits,
        }
    }
}

/// Scope stack, per-statement lookups and the pending-reconnect table of one function.
#[derive(Debug, Default)]
pub struct ContextTracker {
    stack: Vec<Scope>,
    next_scope: ScopeId,
    pending: Vec<PendingReconnect>,
    first_nodes: AHashMap<usize, NodeId>,
    loop_conditions: AHashMap<usize, NodeId>,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self, kind: ScopeKind, anchor: Option<NodeId>) -> ScopeId {
        self.push_scope(kind, anchor, None)
    }

    /// Opens the body scope of the loop at `statement_index`, whose condition node becomes the
    /// body's `continue` target.
    pub fn enter_loop_body(&mut self, statement_index: usize, condition: NodeId) -> ScopeId {
        self.register_loop_condition_node(statement_index, condition.clone());
        self.push_scope(ScopeKind::LoopBody, Some(condition), Some(statement_index))
    }

    fn push_scope(
        &mut self,
        kind: ScopeKind,
        anchor: Option<NodeId>,
        loop_statement: Option<usize>,
    ) -> ScopeId {
        let id = self.next_scope;
        self.next_scope += 1;
        let enclosing_loop = match kind {
            ScopeKind::LoopBody => Some(id),
            _ => self.stack.last().and_then(|s| s.enclosing_loop),
        };
        tracing::trace!(scope = id, ?kind, depth = self.stack.len(), "enter scope");
        self.stack.push(Scope {
            id,
            kind,
            anchor,
            enclosing_loop,
            loop_statement,
        });
        id
    }

    /// Pops the innermost scope. Nothing may still be waiting on it.
    pub fn exit_scope(&mut self) -> Result<Scope, ContextError> {
        let scope = self.stack.pop().ok_or(ContextError::EmptyScopeStack)?;
        let count = self
            .pending
            .iter()
            .filter(|p| p.awaits.scope() == scope.id)
            .count();
        if count > 0 {
            return Err(ContextError::UnresolvedPending {
                scope: scope.id,
                count,
            });
        }
        tracing::trace!(scope = scope.id, kind = ?scope.kind, "exit scope");
        Ok(scope)
    }

    /// The innermost loop body scope that a `break` or `continue` would target.
    pub fn enclosing_loop(&self) -> Option<ScopeId> {
        self.stack.last().and_then(|s| s.enclosing_loop)
    }

    /// The condition node of an open loop body scope.
    pub fn loop_condition_of(&self, scope: ScopeId) -> Result<&NodeId, ContextError> {
        self.stack
            .iter()
            .rev()
            .find(|s| s.id == scope && s.kind == ScopeKind::LoopBody)
            .and_then(|s| s.loop_statement)
            .and_then(|index| self.loop_condition_node(index))
            .ok_or(ContextError::NotALoop(scope))
    }

    pub fn register_first_node(&mut self, statement_index: usize, node: NodeId) {
        self.first_nodes.entry(statement_index).or_insert(node);
    }

    pub fn first_node(&self, statement_index: usize) -> Option<&NodeId> {
        self.first_nodes.get(&statement_index)
    }

    pub fn first_nodes(&self) -> &AHashMap<usize, NodeId> {
        &self.first_nodes
    }

    pub fn register_loop_condition_node(&mut self, statement_index: usize, node: NodeId) {
        self.loop_conditions.insert(statement_index, node);
    }

    pub fn loop_condition_node(&self, statement_index: usize) -> Option<&NodeId> {
        self.loop_conditions.get(&statement_index)
    }

    pub fn add_pending(&mut self, pending: PendingReconnect) {
        tracing::trace!(
            kind = ?pending.kind,
            source = %pending.source,
            point = %pending.source_point,
            awaits = ?pending.awaits,
            "pending reconnect"
        );
        self.pending.push(pending);
    }

    pub fn has_pending(&self, awaits: Awaits) -> bool {
        self.pending.iter().any(|p| p.awaits == awaits)
    }

    pub fn pending_mut(&mut self, awaits: Awaits) -> impl Iterator<Item = &mut PendingReconnect> {
        self.pending.iter_mut().filter(move |p| p.awaits == awaits)
    }

    /// Connects every pending reconnect awaiting `awaits` to `target` and drops them from the
    /// table, in the order they were added. Returns how many were resolved.
    pub fn resolve_pending(
        &mut self,
        awaits: Awaits,
        target: &NodeId,
        target_point: ConnectionPoint,
        nodes: &NodeRegistry,
        connections: &mut ConnectionManager,
    ) -> Result<usize, RegistryError> {
        let resolved = self.take_pending(awaits);
        for pending in &resolved {
            connections.add(
                nodes,
                &pending.source,
                pending.source_point,
                target,
                target_point,
                None,
            )?;
            tracing::trace!(
                kind = ?pending.kind,
                source = %pending.source,
                target = %target,
                "resolved reconnect"
            );
        }
        Ok(resolved.len())
    }

    /// Re-keys pendings from `from` to `to`. With `promote`, fall-through pendings take the new
    /// kind; jumps keep theirs.
    pub fn forward_pending(&mut self, from: Awaits, to: Awaits, promote: Option<ReconnectKind>) {
        for pending in self.pending.iter_mut().filter(|p| p.awaits == from) {
            pending.awaits = to;
            if let Some(kind) = promote {
                if pending.kind.is_fall_through() {
                    pending.kind = kind;
                }
            }
        }
    }

    /// Removes and returns the pendings awaiting `awaits`, without connecting them.
    pub fn take_pending(&mut self, awaits: Awaits) -> Vec<PendingReconnect> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.awaits == awaits);
        self.pending = kept;
        taken
    }

    /// True when no scope is open and nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty() && self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeSizes;
    use crate::graph::NodeType;
    use crate::layout::Cursor;

    fn node(nodes: &mut NodeRegistry, node_type: NodeType) -> NodeId {
        nodes.create_node(node_type, "n", Cursor::default()).id.clone()
    }

    #[test]
    fn loop_scopes_are_visible_to_nested_arms() {
        let mut context = ContextTracker::new();
        let function = context.enter_scope(ScopeKind::Function, None);
        assert_eq!(context.enclosing_loop(), None);

        let body = context.enter_loop_body(0, NodeId::from("decision_1"));
        context.enter_scope(ScopeKind::ThenArm, None);
        assert_eq!(context.enclosing_loop(), Some(body));
        assert_eq!(context.loop_condition_of(body).unwrap().as_str(), "decision_1");
        assert_eq!(context.loop_condition_of(function), Err(ContextError::NotALoop(function)));

        context.exit_scope().unwrap();
        context.exit_scope().unwrap();
        context.exit_scope().unwrap();
        assert!(context.is_empty());
        assert_eq!(context.exit_scope(), Err(ContextError::EmptyScopeStack));
    }

    #[test]
    fn exit_fails_while_something_awaits_the_scope() {
        let mut context = ContextTracker::new();
        let scope = context.enter_scope(ScopeKind::Function, None);
        context.add_pending(PendingReconnect::new(
            ReconnectKind::Sequential,
            NodeId::from("start_0"),
            ConnectionPoint::Down,
            Awaits::Successor(scope),
        ));
        assert_eq!(
            context.exit_scope(),
            Err(ContextError::UnresolvedPending { scope, count: 1 })
        );
    }

    #[test]
    fn resolve_connects_and_consumes() {
        let mut nodes = NodeRegistry::new(NodeSizes::default());
        let mut connections = ConnectionManager::new("yes", "no");
        let a = node(&mut nodes, NodeType::Process);
        let b = node(&mut nodes, NodeType::Process);
        let c = node(&mut nodes, NodeType::Process);

        let mut context = ContextTracker::new();
        let scope = context.enter_scope(ScopeKind::Function, None);
        for source in [&a, &b] {
            context.add_pending(PendingReconnect::new(
                ReconnectKind::Sequential,
                source.clone(),
                ConnectionPoint::Down,
                Awaits::Successor(scope),
            ));
        }

        let resolved = context
            .resolve_pending(Awaits::Successor(scope), &c, ConnectionPoint::Up, &nodes, &mut connections)
            .unwrap();

        assert_eq!(resolved, 2);
        assert!(connections.exists(&a, &c));
        assert!(connections.exists(&b, &c));
        assert!(!context.has_pending(Awaits::Successor(scope)));
    }

    #[test]
    fn forwarding_promotes_only_fall_through() {
        let mut context = ContextTracker::new();
        let outer = context.enter_scope(ScopeKind::Function, None);
        let body = context.enter_loop_body(2, NodeId::from("decision_2"));
        context.add_pending(PendingReconnect::new(
            ReconnectKind::IfElseConvergence,
            NodeId::from("process_2"),
            ConnectionPoint::Down,
            Awaits::Successor(body),
        ));
        context.add_pending(PendingReconnect::new(
            ReconnectKind::BreakJump,
            NodeId::from("process_3"),
            ConnectionPoint::Left,
            Awaits::Successor(body),
        ));

        context.forward_pending(
            Awaits::Successor(body),
            Awaits::LoopCondition(body),
            Some(ReconnectKind::LoopBack),
        );
        let kinds: Vec<_> = context
            .take_pending(Awaits::LoopCondition(body))
            .into_iter()
            .map(|p| p.kind)
            .collect();
        assert_eq!(kinds, vec![ReconnectKind::LoopBack, ReconnectKind::BreakJump]);
        assert!(!context.has_pending(Awaits::Successor(outer)));
    }

    #[test]
    fn first_node_keeps_the_earliest_registration() {
        let mut context = ContextTracker::new();
        context.register_first_node(4, NodeId::from("decision_5"));
        context.register_first_node(4, NodeId::from("process_6"));
        context.register_loop_condition_node(4, NodeId::from("decision_5"));

        assert_eq!(context.first_node(4).unwrap().as_str(), "decision_5");
        assert_eq!(context.loop_condition_node(4).unwrap().as_str(), "decision_5");
        assert_eq!(context.first_node(5), None);
    }
}
