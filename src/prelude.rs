//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the zushiki crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use zushiki::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/statements.json")?;
//! let source = SourceProgram::from_json_str(&json)?;
//!
//! let flowchart = Converter::builder().build()?.convert_source(source)?;
//! std::fs::write("flowchart.json", flowchart.to_json_string(true)?)?;
//! # Ok(())
//! # }
//! ```

// Conversion
pub use crate::converter::{Conversion, Converter, ConverterBuilder, FunctionSummary};

// Configuration
pub use crate::config::{EndNodePolicy, FlowchartConfig, Labels, NodeSize, NodeSizes};
pub use crate::layout::{Cursor, LayoutConfig};

// Input model
pub use crate::statement::{
    Block, Construct, ControlKind, FunctionDefinition, IntoProgram, Program, SourceBlock,
    SourceFunction, SourceProgram, SourceStatement, Statement, Tag,
};

// Output model
pub use crate::graph::{Connection, ConnectionPoint, Flowchart, Node, NodeId, NodeType};

// Rendering
pub use crate::render::outline;

// Error types
pub use crate::error::{ConfigError, ConvertError, ErrorKind, InputError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
