//! Node handlers: translate one syntax node type into commands.
//!
//! Each handler:
//! 1. Reads its node's children and attributes (never mutates them)
//! 2. Compiles sub-expressions through the [`Compiler`] it is given
//! 3. Returns the ordered commands for this node
//!
//! Handlers hold no state, so one instance serves every compilation.

pub mod body;
pub mod expression;
pub mod include;
pub mod print;
pub mod text;

use crate::core::command::Command;
use crate::core::compiler::Compiler;
use crate::core::error::CompileError;
use crate::core::types::Node;

/// Compile capability shared by every node type.
pub trait Handler: Send + Sync {
    /// Map one node to its commands, in emission order.
    fn compile(&self, node: &Node, compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError>;
}

impl<F> Handler for F
where
    F: Fn(&Node, &Compiler<'_>) -> Result<Vec<Command>, CompileError> + Send + Sync,
{
    fn compile(&self, node: &Node, compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        self(node, compiler)
    }
}

/// Node type tags of the standard handler set.
pub mod tags {
    pub const BODY: &str = "body";
    pub const TEXT: &str = "text";
    pub const PRINT: &str = "print";
    pub const INCLUDE: &str = "include";
    pub const CONSTANT: &str = "constant";
    pub const NAME: &str = "name";
    pub const HASH: &str = "hash";
}
