//! # Zushiki - Statement to Flowchart Conversion Engine
//!
//! **Zushiki** turns a linear, tagged list of program statements into a flowchart: positioned
//! start/end capsules, process rectangles, I/O parallelograms and decision diamonds, wired
//! together with labeled connections. Nested if/else chains, loops, `break`, `continue` and
//! `return` are all resolved into explicit edges, and every node gets a layout position so the
//! result can be opened in a flowchart editor without manual arrangement.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Statements**: Deserialize the tagged statement JSON into [`statement::SourceProgram`],
//!     or build a [`statement::Program`] yourself.
//! 2.  **Structure**: Implement or use the `IntoProgram` trait to turn statements into a block tree.
//!     Block markers (`{` / `}`) and the nested `children` form are both understood.
//! 3.  **Convert**: Use `Converter::builder` to configure layout, labels and the end-node policy,
//!     then call `convert`.
//! 4.  **Export**: Serialize the resulting [`graph::Flowchart`] with serde, or print an outline.
//!
//! ## Quick Start
//!
//! ```rust
//! use zushiki::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = r#"[
//!         { "tag": "condition", "translated": "n > 0", "original_unit": "if (n > 0)" },
//!         { "tag": "process", "translated": "pos" },
//!         { "tag": "branch", "translated": "else", "original_unit": "else" },
//!         { "tag": "process", "translated": "neg" }
//!     ]"#;
//!
//!     let source = SourceProgram::from_json_str(json)?;
//!     let converter = Converter::builder()
//!         .with_end_node_policy(EndNodePolicy::Always)
//!         .build()?;
//!
//!     let flowchart = converter.convert_source(source)?;
//!     assert_eq!(flowchart.nodes_of_type(NodeType::Decision).count(), 1);
//!
//!     println!("{}", outline(&flowchart));
//!     let _json = flowchart.to_json_string(true)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod graph;
pub mod layout;
pub mod prelude;
pub mod render;
pub mod statement;
