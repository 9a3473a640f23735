//! The converter's input: tagged statements, and the block tree built from them.

pub mod program;
pub mod source;
pub mod structure;

pub use program::{
    Block, Construct, ControlKind, FunctionDefinition, IntoProgram, Program, Statement, Tag,
};
pub use source::{SourceBlock, SourceFunction, SourceProgram, SourceStatement};
pub use structure::structure_function;
