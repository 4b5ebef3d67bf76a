//! Text handler: raw template text appended to the output.

use super::Handler;
use crate::core::command::{Arg, Command};
use crate::core::compiler::Compiler;
use crate::core::error::CompileError;
use crate::core::types::{Attribute, Node};

pub struct TextHandler;

impl Handler for TextHandler {
    fn compile(&self, node: &Node, _compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        let data = match node.attr("data") {
            Some(Attribute::Str(s)) => s,
            Some(other) => {
                return Err(CompileError::not_implemented(
                    &node.node_type,
                    format!("with {} data", other.kind()),
                ))
            }
            None => {
                return Err(CompileError::not_implemented(
                    &node.node_type,
                    "without data",
                ))
            }
        };
        Ok(vec![Command::new("html += %s;", vec![Arg::string(data)])])
    }
}
