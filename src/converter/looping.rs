use super::context::{Awaits, PendingReconnect, ReconnectKind, ScopeId};
use super::engine::FunctionConverter;
use crate::error::ConvertError;
use crate::graph::{ConnectionPoint, NodeType};
use crate::layout::Cursor;
use crate::statement::{Block, Statement};

impl FunctionConverter<'_> {
    /// Converts a for/while loop.
    ///
    /// The body hangs off the condition's `right` point. Paths that fall through the body loop
    /// back into the condition's `up` point; `break` paths and the condition's `down` point
    /// continue with the loop's successor.
    pub(super) fn convert_loop(
        &mut self,
        index: usize,
        statement: &Statement,
        body: &Block,
        cursor: Cursor,
        scope: ScopeId,
    ) -> Result<Cursor, ConvertError> {
        let config = self.config;
        let layout = &config.layout;
        let condition = self.place(NodeType::Decision, statement.display_text(), cursor, scope, index)?;
        let body_scope = self.context.enter_loop_body(index, condition.clone());
        self.context.add_pending(PendingReconnect::new(
            ReconnectKind::Sequential,
            condition.clone(),
            ConnectionPoint::Right,
            Awaits::Successor(body_scope),
        ));

        let body_end = self.convert_block(body, layout.loop_body_origin(cursor), body_scope)?;

        // Loop-back edges leave plain nodes sideways; decisions keep their labeled exit.
        for pending in self.context.pending_mut(Awaits::Successor(body_scope)) {
            let is_decision = self
                .nodes
                .get(&pending.source)
                .is_ok_and(|node| node.node_type == NodeType::Decision);
            if pending.source_point == ConnectionPoint::Down && !is_decision {
                pending.source_point = ConnectionPoint::Right;
            }
        }
        self.context.forward_pending(
            Awaits::Successor(body_scope),
            Awaits::LoopCondition(body_scope),
            Some(ReconnectKind::LoopBack),
        );
        let back_edges = self.resolve(
            Awaits::LoopCondition(body_scope),
            &condition,
            ConnectionPoint::Up,
        )?;

        self.context.forward_pending(
            Awaits::LoopExit(body_scope),
            Awaits::Successor(scope),
            None,
        );
        self.exit_scope()?;

        self.context.add_pending(PendingReconnect::new(
            ReconnectKind::LoopExit,
            condition.clone(),
            ConnectionPoint::Down,
            Awaits::Successor(scope),
        ));

        tracing::trace!(condition = %condition, index, back_edges, "converted loop");
        Ok(layout.after_loop(cursor, body_end))
    }
}
