//! Flag classification derived from the command metadata model.
//!
//! The sorter needs one answer per token: is it a flag, and does it consume
//! the next token? The classifier is built once over every declared flag of
//! every loaded command (plus the global flag set) and answers in O(1).

use std::collections::HashSet;

use crate::command::{CommandSpec, FlagSpec};

/// Partition of all known flag aliases into valued and boolean sets.
///
/// The two sets are disjoint. Flags are global to the whole command set:
/// when two commands declare the same alias with different arity, the first
/// classification wins and later declarations are ignored (the engine does
/// not detect that configuration error).
#[derive(Debug, Clone, Default)]
pub struct FlagClassifier {
    valued: HashSet<String>,
    boolean: HashSet<String>,
}

impl FlagClassifier {
    /// Build the classifier from every command spec and the global flags.
    pub fn classify<'a>(
        specs: impl IntoIterator<Item = &'a CommandSpec>,
        globals: &'a [FlagSpec],
    ) -> Self {
        let mut classifier = Self::default();
        let flags = specs
            .into_iter()
            .flat_map(CommandSpec::flags)
            .chain(globals);
        for flag in flags {
            for name in flag.names() {
                if classifier.is_flag(name) {
                    continue;
                }
                if flag.takes_value() {
                    classifier.valued.insert(name.clone());
                } else {
                    classifier.boolean.insert(name.clone());
                }
            }
        }
        classifier
    }

    /// Whether `token` is a flag that consumes the next token as its value.
    #[must_use]
    pub fn is_valued(&self, token: &str) -> bool {
        self.valued.contains(token)
    }

    /// Whether `token` is a stand-alone flag.
    #[must_use]
    pub fn is_boolean(&self, token: &str) -> bool {
        self.boolean.contains(token)
    }

    /// Whether `token` is any known flag.
    #[must_use]
    pub fn is_flag(&self, token: &str) -> bool {
        self.is_valued(token) || self.is_boolean(token)
    }
}
