use super::program::{IntoProgram, Program};
use super::structure::structure_function;
use crate::error::{ConvertError, InputError};
use serde::{Deserialize, Serialize};

/// A statement as it appears in the JSON input.
///
/// `tag` is kept as a string here so that an unknown tag is reported as an unsupported
/// construct at its statement index rather than as a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatement {
    pub tag: String,
    #[serde(default)]
    pub translated: String,
    #[serde(default, alias = "original")]
    pub original_unit: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SourceBlock>,
}

impl SourceStatement {
    /// A statement with display text only. Classification reads the display text until a
    /// source text is attached with [`SourceStatement::with_original`].
    pub fn new(tag: impl Into<String>, translated: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            translated: translated.into(),
            original_unit: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original_unit = original.into();
        self
    }

    pub fn with_child(mut self, block_type: impl Into<String>, children: Vec<SourceStatement>) -> Self {
        self.children.push(SourceBlock {
            block_type: block_type.into(),
            children,
        });
        self
    }
}

/// A nested body attached to a statement, e.g. `{ "type": "if_block", "children": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub children: Vec<SourceStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFunction {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<SourceStatement>,
}

/// The two accepted document shapes: a bare statement list, or `main` plus named functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceProgram {
    Single(Vec<SourceStatement>),
    Multi {
        #[serde(default)]
        main: Vec<SourceStatement>,
        #[serde(default)]
        functions: Vec<SourceFunction>,
    },
}

impl SourceProgram {
    pub fn from_json_str(json: &str) -> Result<Self, InputError> {
        let program: SourceProgram =
            serde_json::from_str(json).map_err(|e| InputError::JsonParseError(e.to_string()))?;
        if let SourceProgram::Multi { main, functions } = &program {
            if main.is_empty() && functions.iter().all(|f| f.nodes.is_empty()) {
                return Err(InputError::ValidationError(
                    "multi-function input contains no statements".to_string(),
                ));
            }
        }
        Ok(program)
    }

    /// Parses a document that must use the `{ main, functions }` shape.
    pub fn from_json_str_multi(json: &str) -> Result<Self, InputError> {
        match Self::from_json_str(json)? {
            SourceProgram::Single(_) => Err(InputError::ValidationError(
                "expected an object with 'main' and 'functions'".to_string(),
            )),
            multi => Ok(multi),
        }
    }
}

impl IntoProgram for SourceProgram {
    fn into_program(self) -> Result<Program, ConvertError> {
        match self {
            SourceProgram::Single(statements) => statements.into_program(),
            SourceProgram::Multi { main, functions } => {
                let mut program = Program::default();
                if !main.is_empty() {
                    program.functions.push(structure_function("main", &main)?);
                }
                for (i, function) in functions.iter().enumerate() {
                    if function.nodes.is_empty() {
                        tracing::debug!(function = %function.name, "skipping empty function");
                        continue;
                    }
                    let name = if function.name.trim().is_empty() {
                        format!("func_{}", i)
                    } else {
                        function.name.clone()
                    };
                    program
                        .functions
                        .push(structure_function(&name, &function.nodes)?);
                }
                Ok(program)
            }
        }
    }
}

impl IntoProgram for Vec<SourceStatement> {
    fn into_program(self) -> Result<Program, ConvertError> {
        self.as_slice().into_program()
    }
}

impl IntoProgram for &[SourceStatement] {
    fn into_program(self) -> Result<Program, ConvertError> {
        Ok(Program::single(structure_function("main", self)?))
    }
}
