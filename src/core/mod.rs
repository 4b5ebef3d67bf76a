//! Compiler core: tree types, commands, registry, dispatch, tree loading.

pub mod command;
pub mod compiler;
pub mod error;
pub mod parser;
pub mod registry;
pub mod types;
