//! Expression handlers: constants, variable names, and hash literals.
//!
//! These produce expression segments (no trailing `;`) for use as
//! arguments of statement handlers such as `print` and `include`.
//!
//! Integer constants must fit the target's exact integer range
//! (`±(2^53 - 1)`); larger values are rejected rather than rounded.

use super::Handler;
use crate::core::command::{quote_str, Arg, Command};
use crate::core::compiler::{Compiler, CONTEXT_VAR};
use crate::core::error::CompileError;
use crate::core::types::{Attribute, Node};
use crate::handlers::tags;

/// Largest integer the target number type represents exactly.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// `value` attribute as a target literal.
pub struct ConstantHandler;

impl Handler for ConstantHandler {
    fn compile(&self, node: &Node, _compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        let literal = match node.attr("value") {
            None | Some(Attribute::Null) => "null".to_string(),
            Some(Attribute::Bool(b)) => b.to_string(),
            Some(Attribute::Int(n)) if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(n) => {
                n.to_string()
            }
            Some(Attribute::Int(n)) => {
                return Err(CompileError::not_implemented(
                    &node.node_type,
                    format!("with integer {} outside the exact range", n),
                ))
            }
            Some(Attribute::Float(x)) if x.is_finite() => x.to_string(),
            Some(Attribute::Float(x)) => {
                return Err(CompileError::not_implemented(
                    &node.node_type,
                    format!("with non-finite value {}", x),
                ))
            }
            Some(Attribute::Str(s)) => quote_str(s),
        };
        Ok(vec![Command::new("%s", vec![Arg::Literal(literal)])])
    }
}

/// Variable lookup in the current scope.
pub struct NameHandler;

impl Handler for NameHandler {
    fn compile(&self, node: &Node, _compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        let name = node.attr("name").and_then(Attribute::as_str).ok_or_else(|| {
            CompileError::not_implemented(&node.node_type, "without a string 'name' attribute")
        })?;
        Ok(vec![Command::new(
            format!("{}[%s]", CONTEXT_VAR),
            vec![Arg::string(name)],
        )])
    }
}

/// Mapping literal; children alternate key, value. Constant keys are
/// emitted as-is, any other key expression as a computed key `[k]`.
pub struct HashHandler;

impl Handler for HashHandler {
    fn compile(&self, node: &Node, compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        let count = node.children.len();
        if count % 2 != 0 {
            return Err(CompileError::not_implemented(
                &node.node_type,
                format!("with {} children (key without value)", count),
            ));
        }

        let mut args = Vec::with_capacity(count);
        let mut pairs = Vec::with_capacity(count / 2);
        for (i, (name, child)) in node.children.iter().enumerate() {
            if i % 2 == 0 {
                pairs.push(if child.node_type == tags::CONSTANT {
                    "%s: %s"
                } else {
                    "[%s]: %s"
                });
            }
            args.push(Arg::Segment(compiler.compile_named(name, child)?));
        }
        let format = format!("{{{}}}", pairs.join(", "));
        Ok(vec![Command::new(format, args)])
    }
}
