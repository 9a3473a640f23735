use super::context::{Awaits, PendingReconnect, ReconnectKind, ScopeId, ScopeKind};
use super::engine::FunctionConverter;
use crate::error::ConvertError;
use crate::graph::{ConnectionPoint, NodeId, NodeType};
use crate::layout::Cursor;
use crate::statement::{Block, Statement};

impl FunctionConverter<'_> {
    /// Converts an if/else.
    ///
    /// The true arm leaves the decision through `right` and is laid out to the right of the
    /// false arm, which leaves through `down` and stays on the decision's column. Whatever falls
    /// through either arm converges on the construct's successor in the enclosing scope.
    pub(super) fn convert_if(
        &mut self,
        index: usize,
        statement: &Statement,
        then_arm: &Block,
        else_arm: Option<&Block>,
        cursor: Cursor,
        scope: ScopeId,
    ) -> Result<Cursor, ConvertError> {
        let config = self.config;
        let layout = &config.layout;
        let decision = self.place(NodeType::Decision, statement.display_text(), cursor, scope, index)?;

        let empty = Block::new();
        let else_arm = else_arm.unwrap_or(&empty);
        let false_extent = layout.extent(else_arm);

        let then_end = self.convert_arm(
            ScopeKind::ThenArm,
            &decision,
            ConnectionPoint::Right,
            then_arm,
            layout.true_arm_origin(cursor, false_extent),
            scope,
        )?;
        let else_end = self.convert_arm(
            ScopeKind::ElseArm,
            &decision,
            ConnectionPoint::Down,
            else_arm,
            layout.false_arm_origin(cursor),
            scope,
        )?;

        tracing::trace!(decision = %decision, index, "converted if/else");
        Ok(layout.after_branches(cursor, then_end, else_end))
    }

    fn convert_arm(
        &mut self,
        kind: ScopeKind,
        decision: &NodeId,
        exit_point: ConnectionPoint,
        block: &Block,
        origin: Cursor,
        parent: ScopeId,
    ) -> Result<Cursor, ConvertError> {
        let arm = self.context.enter_scope(kind, Some(decision.clone()));
        self.context.add_pending(PendingReconnect::new(
            ReconnectKind::Sequential,
            decision.clone(),
            exit_point,
            Awaits::Successor(arm),
        ));

        let end = self.convert_block(block, origin, arm)?;

        self.context.forward_pending(
            Awaits::Successor(arm),
            Awaits::Successor(parent),
            Some(ReconnectKind::IfElseConvergence),
        );
        self.exit_scope()?;
        Ok(end)
    }
}
