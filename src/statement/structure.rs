//! Turns a function's statement list into a block tree.
//!
//! Two input shapes are understood. The flat form marks bodies with `block` statements
//! (`{` / `}`); the nested form attaches bodies to their owner through `children`. A function
//! uses the nested form as soon as one of its top-level statements carries children, in which
//! case block markers are ignored.
//!
//! Statement indices are pre-order positions over the whole input tree, which for the flat form
//! is simply the position in the list.

use super::program::{Block, Construct, ControlKind, FunctionDefinition, Statement, Tag};
use super::source::{SourceBlock, SourceStatement};
use crate::error::ConvertError;

const UNSUPPORTED_KEYWORDS: &[&str] = &["switch", "case", "default", "do", "goto"];

const IF_BODIES: &[&str] = &["if_block"];
const ELSE_BODIES: &[&str] = &["else_block"];
/// An `else` or `else if` owns its body under either name.
const ELSE_IF_BODIES: &[&str] = &["if_block", "else_block"];
const LOOP_BODIES: &[&str] = &[
    "for_block",
    "while_block",
    "while_true_block",
    "for_true_block",
    "body",
];

/// What a statement means structurally, before bodies are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Simple,
    Control(ControlKind),
    If,
    Else,
    ElseIf,
    Loop,
    Open,
    Close,
}

/// Builds the block tree of one function.
pub fn structure_function(
    name: &str,
    statements: &[SourceStatement],
) -> Result<FunctionDefinition, ConvertError> {
    let statement_count = statements.iter().map(subtree_size).sum();
    let structurer = Structurer { function: name };

    // Reject anything we cannot express before looking at structure.
    structurer.check_supported(statements, 0)?;

    let nested = statements.iter().any(|s| !s.children.is_empty());
    let body = if nested {
        tracing::trace!(function = name, "structuring nested statement form");
        structurer.nested_block(statements, 0)?
    } else {
        tracing::trace!(function = name, "structuring flat statement form");
        let shaped = statements
            .iter()
            .enumerate()
            .map(|(index, source)| structurer.classify(index, source))
            .collect::<Result<Vec<_>, _>>()?;
        FlatParser {
            structurer: &structurer,
            items: &shaped,
            pos: 0,
        }
        .parse_top_level()?
    };

    tracing::debug!(
        function = name,
        statements = statement_count,
        constructs = body.len(),
        "structured function"
    );

    Ok(FunctionDefinition {
        name: name.to_string(),
        body,
        statement_count,
    })
}

fn subtree_size(statement: &SourceStatement) -> usize {
    1 + statement
        .children
        .iter()
        .flat_map(|block| block.children.iter())
        .map(subtree_size)
        .sum::<usize>()
}

struct Structurer<'a> {
    function: &'a str,
}

impl Structurer<'_> {
    fn malformed(&self, index: usize, reason: impl Into<String>) -> ConvertError {
        ConvertError::MalformedInput {
            function: self.function.to_string(),
            index,
            reason: reason.into(),
        }
    }

    fn unsupported(&self, index: usize, construct: impl Into<String>) -> ConvertError {
        ConvertError::UnsupportedConstruct {
            function: self.function.to_string(),
            index,
            construct: construct.into(),
        }
    }

    /// Walks the whole tree in pre-order and fails on the first unsupported statement.
    fn check_supported(&self, statements: &[SourceStatement], base: usize) -> Result<usize, ConvertError> {
        let mut index = base;
        for source in statements {
            self.classify(index, source)?;
            let mut next = index + 1;
            for block in &source.children {
                if block.block_type == "case_block" {
                    return Err(self.unsupported(index, "'switch' statement"));
                }
                next = self.check_supported(&block.children, next)?;
            }
            index = next;
        }
        Ok(index)
    }

    fn classify(&self, index: usize, source: &SourceStatement) -> Result<(usize, Statement, Shape), ConvertError> {
        let tag: Tag = source
            .tag
            .parse()
            .map_err(|e: String| self.unsupported(index, e))?;
        let statement = Statement::with_original(tag, source.translated.clone(), source.original_unit.clone());

        let words = statement.leading_words(2);
        let first = words.first().copied().unwrap_or_default();
        let second = words.get(1).copied().unwrap_or_default();

        // Display-only io/process text is prose, not source.
        let keyword_checked = statement.has_source() || !matches!(tag, Tag::Io | Tag::Process);
        if keyword_checked && UNSUPPORTED_KEYWORDS.contains(&first) {
            return Err(self.unsupported(index, format!("'{}' statement", first)));
        }

        let translated = statement.translated.trim();
        let shape = match tag {
            Tag::Loop => Shape::Loop,
            Tag::Condition | Tag::Branch => match first {
                "for" | "while" => Shape::Loop,
                "else" if second == "if" => Shape::ElseIf,
                "else" => Shape::Else,
                _ if translated == "else" || translated == "否则" => Shape::Else,
                _ if translated.starts_with("否则") => Shape::ElseIf,
                _ => Shape::If,
            },
            Tag::Io | Tag::Process => match first {
                "break" => Shape::Control(ControlKind::Break),
                "continue" => Shape::Control(ControlKind::Continue),
                "return" => Shape::Control(ControlKind::Return),
                _ if translated.ends_with("break;") => Shape::Control(ControlKind::Break),
                _ if translated.ends_with("continue;") => Shape::Control(ControlKind::Continue),
                _ if translated.starts_with("返回") => Shape::Control(ControlKind::Return),
                _ => Shape::Simple,
            },
            Tag::Block => self.block_marker(index, &statement)?,
        };
        Ok((index, statement, shape))
    }

    fn block_marker(&self, index: usize, statement: &Statement) -> Result<Shape, ConvertError> {
        let marker = statement.original_unit.trim();
        let marker = if marker.is_empty() {
            statement.translated.trim()
        } else {
            marker
        };
        match marker {
            "{" => Ok(Shape::Open),
            "}" => Ok(Shape::Close),
            other => Err(self.malformed(
                index,
                format!("block marker must be '{{' or '}}', got '{}'", other),
            )),
        }
    }

    fn leaf(index: usize, statement: Statement, shape: Shape) -> Construct {
        match shape {
            Shape::Control(kind) => Construct::Control {
                index,
                statement,
                kind,
            },
            _ => Construct::Simple { index, statement },
        }
    }

    /// Converts one list of the nested form, starting at pre-order index `base`.
    fn nested_block(&self, statements: &[SourceStatement], base: usize) -> Result<Block, ConvertError> {
        let mut indices = Vec::with_capacity(statements.len());
        let mut next = base;
        for source in statements {
            indices.push(next);
            next += subtree_size(source);
        }

        let mut block = Block::new();
        let mut i = 0;
        while i < statements.len() {
            let (index, statement, shape) = self.classify(indices[i], &statements[i])?;
            let source = &statements[i];
            i += 1;
            match shape {
                Shape::Open | Shape::Close => {
                    tracing::warn!(
                        function = self.function,
                        index,
                        "ignoring block marker in nested statement form; bodies come from 'children'"
                    );
                }
                Shape::Simple | Shape::Control(_) => {
                    if !source.children.is_empty() {
                        return Err(self.malformed(index, "a plain statement cannot own a body"));
                    }
                    block.push(Self::leaf(index, statement, shape));
                }
                Shape::Else | Shape::ElseIf => {
                    return Err(self.malformed(index, "'else' without a preceding 'if'"));
                }
                Shape::Loop => {
                    let body = self.nested_body(source, index, LOOP_BODIES, &[])?;
                    block.push(Construct::Loop {
                        index,
                        statement,
                        body,
                    });
                }
                Shape::If => {
                    let then_arm = self.nested_body(source, index, IF_BODIES, ELSE_BODIES)?;
                    let own_else = self.nested_optional_body(source, index, ELSE_BODIES)?;
                    let following = self.nested_else(statements, &indices, &mut i)?;
                    let else_arm = match (own_else, following) {
                        (Some(_), Some(_)) => {
                            return Err(self.malformed(index, "'if' has more than one 'else'"));
                        }
                        (own, following) => own.or(following),
                    };
                    block.push(Construct::If {
                        index,
                        statement,
                        then_arm,
                        else_arm,
                    });
                }
            }
        }
        Ok(block)
    }

    /// Consumes an `else` / `else if` chain following an `if` among its siblings.
    fn nested_else(
        &self,
        statements: &[SourceStatement],
        indices: &[usize],
        i: &mut usize,
    ) -> Result<Option<Block>, ConvertError> {
        let Some(source) = statements.get(*i) else {
            return Ok(None);
        };
        let (index, statement, shape) = self.classify(indices[*i], source)?;
        match shape {
            Shape::Else => {
                *i += 1;
                Ok(Some(self.nested_body(source, index, ELSE_IF_BODIES, &[])?))
            }
            Shape::ElseIf => {
                *i += 1;
                let then_arm = self.nested_body(source, index, ELSE_IF_BODIES, &[])?;
                let else_arm = self.nested_else(statements, indices, i)?;
                Ok(Some(vec![Construct::If {
                    index,
                    statement,
                    then_arm,
                    else_arm,
                }]))
            }
            _ => Ok(None),
        }
    }

    /// Child blocks of `source` paired with the pre-order index of their first statement.
    fn child_blocks<'s>(source: &'s SourceStatement, index: usize) -> Vec<(&'s SourceBlock, usize)> {
        let mut base = index + 1;
        source
            .children
            .iter()
            .map(|block| {
                let start = base;
                base += block.children.iter().map(subtree_size).sum::<usize>();
                (block, start)
            })
            .collect()
    }

    /// The body of `source` among `kinds`. Blocks listed in `ignored` belong to someone else;
    /// anything else is malformed. A statement without children has an empty body.
    fn nested_body(
        &self,
        source: &SourceStatement,
        index: usize,
        kinds: &[&str],
        ignored: &[&str],
    ) -> Result<Block, ConvertError> {
        let mut found: Option<Block> = None;
        for (block, base) in Self::child_blocks(source, index) {
            let kind = block.block_type.as_str();
            if ignored.contains(&kind) {
                continue;
            }
            if !kinds.contains(&kind) {
                return Err(self.malformed(index, format!("unexpected '{}' body", kind)));
            }
            if found.is_some() {
                return Err(self.malformed(index, format!("more than one '{}' body", kind)));
            }
            found = Some(self.nested_block(&block.children, base)?);
        }
        Ok(found.unwrap_or_default())
    }

    fn nested_optional_body(
        &self,
        source: &SourceStatement,
        index: usize,
        kinds: &[&str],
    ) -> Result<Option<Block>, ConvertError> {
        let mut found = None;
        for (block, base) in Self::child_blocks(source, index) {
            if kinds.contains(&block.block_type.as_str()) {
                if found.is_some() {
                    return Err(self.malformed(index, "more than one 'else' body"));
                }
                found = Some(self.nested_block(&block.children, base)?);
            }
        }
        Ok(found)
    }
}

/// Recursive descent over the flat, brace-delimited form.
struct FlatParser<'p, 'a> {
    structurer: &'p Structurer<'a>,
    items: &'p [(usize, Statement, Shape)],
    pos: usize,
}

impl FlatParser<'_, '_> {
    fn parse_top_level(&mut self) -> Result<Block, ConvertError> {
        self.parse_sequence(None)
    }

    fn peek_shape(&self) -> Option<Shape> {
        self.items.get(self.pos).map(|(_, _, shape)| *shape)
    }

    fn current_index(&self) -> usize {
        self.items
            .get(self.pos)
            .map_or(self.items.len(), |(index, _, _)| *index)
    }

    /// Parses constructs until the end of input or, inside a group, its closing `}`.
    fn parse_sequence(&mut self, open: Option<usize>) -> Result<Block, ConvertError> {
        let mut block = Block::new();
        loop {
            let Some(shape) = self.peek_shape() else {
                return match open {
                    Some(open_index) => Err(self
                        .structurer
                        .malformed(open_index, "'{' is never closed")),
                    None => Ok(block),
                };
            };
            match shape {
                Shape::Close => {
                    if open.is_none() {
                        return Err(self
                            .structurer
                            .malformed(self.current_index(), "'}' without a matching '{'"));
                    }
                    self.pos += 1;
                    return Ok(block);
                }
                Shape::Open => {
                    // A bare group adds no control flow of its own.
                    let open_index = self.current_index();
                    self.pos += 1;
                    block.extend(self.parse_sequence(Some(open_index))?);
                }
                Shape::Else | Shape::ElseIf => {
                    return Err(self
                        .structurer
                        .malformed(self.current_index(), "'else' without a preceding 'if'"));
                }
                _ => block.push(self.parse_construct()?),
            }
        }
    }

    fn parse_construct(&mut self) -> Result<Construct, ConvertError> {
        let (index, statement, shape) = self.items[self.pos].clone();
        self.pos += 1;
        match shape {
            Shape::Simple | Shape::Control(_) => Ok(Structurer::leaf(index, statement, shape)),
            Shape::Loop => {
                let body = self.parse_body(index)?;
                Ok(Construct::Loop {
                    index,
                    statement,
                    body,
                })
            }
            Shape::If | Shape::ElseIf => {
                let then_arm = self.parse_body(index)?;
                let else_arm = self.parse_else()?;
                Ok(Construct::If {
                    index,
                    statement,
                    then_arm,
                    else_arm,
                })
            }
            Shape::Else | Shape::Open | Shape::Close => Err(self
                .structurer
                .malformed(index, "block boundary where a statement was expected")),
        }
    }

    /// A braced group, or the single construct that follows its owner.
    fn parse_body(&mut self, owner: usize) -> Result<Block, ConvertError> {
        match self.peek_shape() {
            None | Some(Shape::Close) | Some(Shape::Else) | Some(Shape::ElseIf) => Err(self
                .structurer
                .malformed(owner, "condition or loop has no body")),
            Some(Shape::Open) => {
                let open_index = self.current_index();
                self.pos += 1;
                self.parse_sequence(Some(open_index))
            }
            Some(_) => Ok(vec![self.parse_construct()?]),
        }
    }

    fn parse_else(&mut self) -> Result<Option<Block>, ConvertError> {
        match self.peek_shape() {
            Some(Shape::Else) => {
                let index = self.current_index();
                self.pos += 1;
                Ok(Some(self.parse_body(index)?))
            }
            Some(Shape::ElseIf) => Ok(Some(vec![self.parse_construct()?])),
            _ => Ok(None),
        }
    }
}
