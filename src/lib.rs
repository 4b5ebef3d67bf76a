//! tmplc: template syntax trees compiled to render functions.
//!
//! Per-node handlers emit commands, commands serialize to statements, and
//! the statements form a function the render runtime executes. Templates
//! are compiled once instead of re-interpreted on every render.

pub mod cli;
pub mod core;
pub mod handlers;
pub mod runtime;
