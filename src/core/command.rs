//! Commands and segments: the emission layer between handlers and source text.
//!
//! A handler never concatenates target code itself. It returns commands:
//! a format with `%s` placeholders plus ordered arguments. Serialization and
//! string quoting live here and nowhere else.

use super::error::{CompileError, NodePath};
use std::borrow::Cow;
use std::fmt;

/// Compiled target-language source for one sub-expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment(String);

impl Segment {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One placeholder argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Recursively compiled child
    Segment(Segment),
    /// Text produced by the handler itself
    Literal(String),
}

impl Arg {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// A quoted string literal.
    pub fn string(value: &str) -> Self {
        Self::Literal(quote_str(value))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Segment(s) => s.as_str(),
            Self::Literal(s) => s,
        }
    }
}

impl From<Segment> for Arg {
    fn from(s: Segment) -> Self {
        Self::Segment(s)
    }
}

/// One emittable statement: format text plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    format: Cow<'static, str>,
    args: Vec<Arg>,
}

impl Command {
    pub fn new(format: impl Into<Cow<'static, str>>, args: Vec<Arg>) -> Self {
        Self {
            format: format.into(),
            args,
        }
    }

    /// A command that emits a segment unchanged.
    pub fn verbatim(segment: Segment) -> Self {
        Self::new("%s", vec![Arg::Segment(segment)])
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Number of `%s` placeholders in the format (`%%` excluded).
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut chars = self.format.chars();
        while let Some(c) = chars.next() {
            if c == '%' {
                if let Some('s') = chars.next() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Substitute arguments into the format, left to right.
    pub fn serialize(&self) -> Result<String, CompileError> {
        let expected = self.placeholder_count();
        if expected != self.args.len() {
            return Err(CompileError::MalformedCommand {
                path: NodePath::default(),
                format: self.format.to_string(),
                expected,
                found: self.args.len(),
            });
        }

        let extra: usize = self.args.iter().map(|a| a.as_str().len()).sum();
        let mut out = String::with_capacity(self.format.len() + extra);
        let mut args = self.args.iter();
        let mut chars = self.format.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('s') => {
                    if let Some(arg) = args.next() {
                        out.push_str(arg.as_str());
                    }
                }
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        Ok(out)
    }
}

/// Serialize commands in order, one per line.
pub fn serialize_all(commands: &[Command]) -> Result<String, CompileError> {
    let mut lines = Vec::with_capacity(commands.len());
    for command in commands {
        lines.push(command.serialize()?);
    }
    Ok(lines.join("\n"))
}

/// Quote a string as a target-language string literal.
pub fn quote_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
