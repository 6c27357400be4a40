//! Prybar CLI - pluggable command dispatch.
//!
//! The binary wires the `prybar-core` engine to a compiled-in table of
//! built-in commands and the extension packages installed under
//! `~/.prybar/extensions`.

pub mod cli;
pub mod commands;
