//! Position calculation.
//!
//! Everything here is a pure function of a [`Cursor`] and the [`LayoutConfig`]: the converter
//! threads cursors through its recursion instead of mutating a shared position.

use crate::statement::{Block, Construct};
use serde::{Deserialize, Serialize};

/// Top-left position of the next node to place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

impl Cursor {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub origin_x: f64,
    pub origin_y: f64,
    /// Vertical distance between two sequential nodes.
    pub level_height: f64,
    /// Horizontal gap between the false arm's extent and the true arm.
    pub condition_offset_x: f64,
    /// Vertical distance from a decision to the first node of either arm.
    pub condition_offset_y: f64,
    pub loop_offset_x: f64,
    pub loop_offset_y: f64,
    /// Horizontal gap between two function subgraphs.
    pub function_offset_x: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: -4600.0,
            origin_y: -4800.0,
            level_height: 125.0,
            condition_offset_x: 200.0,
            condition_offset_y: 150.0,
            loop_offset_x: 120.0,
            loop_offset_y: 120.0,
            function_offset_x: 250.0,
        }
    }
}

impl LayoutConfig {
    pub fn origin(&self) -> Cursor {
        Cursor::new(self.origin_x, self.origin_y)
    }

    /// The next sequential slot under `cursor`.
    pub fn below(&self, cursor: Cursor) -> Cursor {
        Cursor::new(cursor.x, cursor.y + self.level_height)
    }

    /// Origin of a decision's true arm. It clears the false arm, which is `false_extent` wide.
    pub fn true_arm_origin(&self, decision: Cursor, false_extent: f64) -> Cursor {
        Cursor::new(
            decision.x + false_extent + self.condition_offset_x,
            decision.y + self.condition_offset_y,
        )
    }

    /// Origin of a decision's false arm, which stays on the decision's column.
    pub fn false_arm_origin(&self, decision: Cursor) -> Cursor {
        Cursor::new(decision.x, decision.y + self.condition_offset_y)
    }

    pub fn loop_body_origin(&self, condition: Cursor) -> Cursor {
        Cursor::new(
            condition.x + self.loop_offset_x,
            condition.y + self.loop_offset_y,
        )
    }

    /// Where the node following an if/else goes: back on the decision's column, below both arms.
    pub fn after_branches(&self, decision: Cursor, then_end: Cursor, else_end: Cursor) -> Cursor {
        let y = then_end
            .y
            .max(else_end.y)
            .max(decision.y + self.level_height);
        Cursor::new(decision.x, y)
    }

    /// Where the node following a loop goes: back on the condition's column, below the body.
    pub fn after_loop(&self, condition: Cursor, body_end: Cursor) -> Cursor {
        Cursor::new(
            condition.x,
            body_end.y.max(condition.y + self.level_height),
        )
    }

    /// How far right of its own column a block reaches, measured to the left edge of its
    /// rightmost node.
    pub fn extent(&self, block: &Block) -> f64 {
        block
            .iter()
            .map(|construct| self.construct_extent(construct))
            .fold(0.0, f64::max)
    }

    fn construct_extent(&self, construct: &Construct) -> f64 {
        match construct {
            Construct::Simple { .. } | Construct::Control { .. } => 0.0,
            Construct::If {
                then_arm, else_arm, ..
            } => {
                let false_extent = else_arm.as_ref().map_or(0.0, |arm| self.extent(arm));
                false_extent + self.condition_offset_x + self.extent(then_arm)
            }
            Construct::Loop { body, .. } => {
                if body.is_empty() {
                    0.0
                } else {
                    self.loop_offset_x + self.extent(body)
                }
            }
        }
    }
}
