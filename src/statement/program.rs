use crate::error::ConvertError;
use std::fmt;
use std::str::FromStr;

/// The closed set of statement tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Io,
    Process,
    Condition,
    Branch,
    Loop,
    /// A `{` or `}` marker in the tag-sequenced form.
    Block,
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "io" | "i/o" | "input" | "output" => Ok(Tag::Io),
            "process" | "statement" => Ok(Tag::Process),
            "condition" => Ok(Tag::Condition),
            "branch" => Ok(Tag::Branch),
            "loop" => Ok(Tag::Loop),
            "block" => Ok(Tag::Block),
            other => Err(format!("unknown statement tag '{}'", other)),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Io => "io",
            Tag::Process => "process",
            Tag::Condition => "condition",
            Tag::Branch => "branch",
            Tag::Loop => "loop",
            Tag::Block => "block",
        };
        f.write_str(name)
    }
}

/// One input statement after its tag has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub tag: Tag,
    /// Display text, usually a natural-language rendering of the source.
    pub translated: String,
    /// The source text the statement was parsed from.
    pub original_unit: String,
}

impl Statement {
    /// A statement whose source text equals its display text.
    pub fn new(tag: Tag, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            tag,
            translated: text.clone(),
            original_unit: text,
        }
    }

    pub fn with_original(tag: Tag, translated: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            tag,
            translated: translated.into(),
            original_unit: original.into(),
        }
    }

    /// Text placed on the statement's node.
    pub fn display_text(&self) -> &str {
        let translated = self.translated.trim();
        if translated.is_empty() {
            self.original_unit.trim()
        } else {
            translated
        }
    }

    /// Whether a source text was given, as opposed to display text alone.
    pub(crate) fn has_source(&self) -> bool {
        !self.original_unit.trim().trim_start_matches('}').trim().is_empty()
    }

    /// The source text with any leading closing brace stripped, falling back to the display
    /// text when no source was given.
    pub(crate) fn source_text(&self) -> &str {
        let original = self.original_unit.trim().trim_start_matches('}').trim_start();
        if original.is_empty() {
            self.translated.trim()
        } else {
            original
        }
    }

    /// The first `n` identifier-like words of the source text.
    pub(crate) fn leading_words(&self, n: usize) -> Vec<&str> {
        self.source_text()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
            .take(n)
            .collect()
    }
}

/// Statements that end or redirect the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Break,
    Continue,
    Return,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::Break => write!(f, "break"),
            ControlKind::Continue => write!(f, "continue"),
            ControlKind::Return => write!(f, "return"),
        }
    }
}

/// A node of the block tree. `index` is the statement's position in its function's flat
/// input sequence and is what errors and lookups refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    Simple {
        index: usize,
        statement: Statement,
    },
    Control {
        index: usize,
        statement: Statement,
        kind: ControlKind,
    },
    If {
        index: usize,
        statement: Statement,
        then_arm: Block,
        /// `else if` chains are a nested `If` as the only construct of this arm.
        else_arm: Option<Block>,
    },
    Loop {
        index: usize,
        statement: Statement,
        body: Block,
    },
}

impl Construct {
    pub fn index(&self) -> usize {
        match self {
            Construct::Simple { index, .. }
            | Construct::Control { index, .. }
            | Construct::If { index, .. }
            | Construct::Loop { index, .. } => *index,
        }
    }

    pub fn statement(&self) -> &Statement {
        match self {
            Construct::Simple { statement, .. }
            | Construct::Control { statement, .. }
            | Construct::If { statement, .. }
            | Construct::Loop { statement, .. } => statement,
        }
    }

    /// Whether a `return` appears anywhere in this construct.
    pub fn contains_return(&self) -> bool {
        match self {
            Construct::Simple { .. } => false,
            Construct::Control { kind, .. } => *kind == ControlKind::Return,
            Construct::If {
                then_arm, else_arm, ..
            } => {
                then_arm.iter().any(Construct::contains_return)
                    || else_arm
                        .iter()
                        .flatten()
                        .any(Construct::contains_return)
            }
            Construct::Loop { body, .. } => body.iter().any(Construct::contains_return),
        }
    }
}

pub type Block = Vec<Construct>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: String,
    pub body: Block,
    /// Length of the function's flat input sequence, block markers included.
    pub statement_count: usize,
}

impl FunctionDefinition {
    pub fn contains_return(&self) -> bool {
        self.body.iter().any(Construct::contains_return)
    }

    /// Whether the function's own statement sequence, outside any arm or loop body, holds a
    /// `return`.
    pub fn returns_at_top_level(&self) -> bool {
        self.body.iter().any(|construct| {
            matches!(
                construct,
                Construct::Control {
                    kind: ControlKind::Return,
                    ..
                }
            )
        })
    }
}

/// The canonical input of the converter: one block tree per function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub functions: Vec<FunctionDefinition>,
}

impl Program {
    pub fn single(function: FunctionDefinition) -> Self {
        Self {
            functions: vec![function],
        }
    }
}

/// Converts a caller's own statement representation into a [`Program`].
///
/// Implemented for the JSON input model in [`crate::statement::source`]; parsers that already
/// produce a block tree can implement it directly.
pub trait IntoProgram {
    fn into_program(self) -> Result<Program, ConvertError>;
}

impl IntoProgram for Program {
    fn into_program(self) -> Result<Program, ConvertError> {
        Ok(self)
    }
}
