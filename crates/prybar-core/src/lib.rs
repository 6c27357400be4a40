//! # Prybar Core
//!
//! Discovery and dispatch engine for the `prybar` CLI.
//!
//! Extension packages installed under the extensions directory contribute
//! commands next to the compiled-in ones; a raw argument vector is
//! canonicalized (command tokens first, multi-word command names collapsed,
//! flags last with their values) before a simple positional parser binds it
//! to the resolved command's argument holder.
//!
//! Data flow:
//!
//! ```text
//! Extensions -> CommandSpec set -> FlagClassifier + multi-word names
//!     -> sort_args -> ArgMatches::parse -> Command::execute
//! ```
//!
//! All fallible operations return [`Result`]; nothing here panics.

pub mod command;
pub mod error;
pub mod extensions;
pub mod flags;
pub mod sort;

pub use command::{ArgMatches, Command, CommandArgs, CommandSpec, FlagSpec, GlobalArgs};
pub use error::{Error, Result};
pub use extensions::{CommandMap, CommandProvider, Extensions};
pub use flags::FlagClassifier;
pub use sort::{multi_word_names, sort_args};
