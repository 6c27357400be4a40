//! Command metadata model and the dispatch-facing command contract.
//!
//! Every command is described declaratively by a [`CommandSpec`]: one or
//! more command names (each possibly multi-word, stored as a single spaced
//! string) and the flags the command accepts. The spec is introspected once
//! at registry-build time; the sorter and classifier are derived from it.
//!
//! The runtime contract mirrors the declarative one: a [`Command`] carries a
//! [`CommandArgs`] holder, attached by the registry at load time and filled
//! by [`ArgMatches::parse`] from the canonical argument vector right before
//! `execute`.

use std::{
    any::Any,
    collections::{HashMap, HashSet},
    path::PathBuf,
};

use crate::error::{Error, Result};

/// Declarative description of one flag: alias names, arity, help line.
///
/// The first alias is the flag's primary name; bound values are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    names: Vec<String>,
    takes_value: bool,
    help: String,
}

impl FlagSpec {
    /// Declare a stand-alone flag carrying no value.
    pub fn boolean(
        names: impl IntoIterator<Item = impl Into<String>>,
        help: impl Into<String>,
    ) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            takes_value: false,
            help: help.into(),
        }
    }

    /// Declare a flag that consumes the following token as its value.
    pub fn valued(
        names: impl IntoIterator<Item = impl Into<String>>,
        help: impl Into<String>,
    ) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            takes_value: true,
            help: help.into(),
        }
    }

    /// All alias names for this flag.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The primary (first declared) name, if any aliases were declared.
    #[must_use]
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Whether the flag consumes the next token as its value.
    #[must_use]
    pub const fn takes_value(&self) -> bool {
        self.takes_value
    }

    /// Help line shown in usage output.
    #[must_use]
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Whether `token` equals any alias of this flag.
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        self.names.iter().any(|name| name == token)
    }
}

/// Declarative description of one command's CLI surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    names: Vec<String>,
    about: String,
    flags: Vec<FlagSpec>,
}

impl CommandSpec {
    /// Create a spec from its command names and about line.
    ///
    /// An empty name list is representable so the registry can reject it
    /// with a configuration error naming the candidate's origin.
    pub fn new(
        names: impl IntoIterator<Item = impl Into<String>>,
        about: impl Into<String>,
    ) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            about: about.into(),
            flags: Vec::new(),
        }
    }

    /// Add a flag declaration.
    #[must_use]
    pub fn with_flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// All declared command names, each possibly multi-word.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The primary (first declared) command name.
    #[must_use]
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// About line shown in usage output.
    #[must_use]
    pub fn about(&self) -> &str {
        &self.about
    }

    /// Declared flags, not including the global flag set.
    #[must_use]
    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }
}

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Working directory for the command (`--base`).
    pub base: Option<PathBuf>,
    /// Suppress informational output (`--quiet`).
    pub quiet: bool,
    /// Verbose diagnostics (`--trace`).
    pub trace: bool,
    /// Usage requested (`--help`).
    pub help: bool,
}

impl GlobalArgs {
    /// The global flag declarations, classified alongside every command's own.
    #[must_use]
    pub fn flags() -> Vec<FlagSpec> {
        vec![
            FlagSpec::valued(["--base", "-b"], "Working directory for the command"),
            FlagSpec::boolean(["--quiet", "-q"], "Suppress informational output"),
            FlagSpec::boolean(["--trace", "-t"], "Print verbose diagnostics"),
            FlagSpec::boolean(["--help", "-h"], "Show usage for the command"),
        ]
    }

    /// Fill the shared fields from bound values.
    pub fn fill(&mut self, matches: &ArgMatches) {
        self.base = matches.value("--base").map(PathBuf::from);
        self.quiet = matches.is_present("--quiet");
        self.trace = matches.is_present("--trace");
        self.help = matches.is_present("--help");
    }
}

/// Values bound from a canonical argument vector for one command.
///
/// This is the simple positional parser the sorter exists for: by the time
/// tokens reach [`ArgMatches::parse`], the command name is gone and every
/// valued flag is adjacent to its value, so a single forward walk suffices.
/// Malformed vectors the sorter deliberately passed through (missing flag
/// values, unknown flags) are rejected here.
#[derive(Debug, Clone, Default)]
pub struct ArgMatches {
    values: HashMap<String, String>,
    present: HashSet<String>,
    positionals: Vec<String>,
}

impl ArgMatches {
    /// Bind the tokens following the command name against the command's
    /// declared flags plus the global flag set.
    pub fn parse(command: &CommandSpec, globals: &[FlagSpec], tokens: &[String]) -> Result<Self> {
        let mut matches = Self::default();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let flag = command
                .flags()
                .iter()
                .chain(globals)
                .find(|flag| flag.matches(token));
            if let Some(flag) = flag {
                let Some(key) = flag.primary_name() else {
                    i += 1;
                    continue;
                };
                if flag.takes_value() {
                    let value = tokens.get(i + 1).ok_or_else(|| Error::MissingFlagValue {
                        flag: token.clone(),
                    })?;
                    matches.values.insert(key.to_string(), value.clone());
                    i += 2;
                } else {
                    matches.present.insert(key.to_string());
                    i += 1;
                }
            } else if token.len() > 1 && token.starts_with('-') {
                return Err(Error::UnknownFlag {
                    flag: token.clone(),
                    command: command.primary_name().unwrap_or_default().to_string(),
                });
            } else {
                matches.positionals.push(token.clone());
                i += 1;
            }
        }
        Ok(matches)
    }

    /// The bound value of a valued flag, looked up by primary name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether a boolean flag was present, looked up by primary name.
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.present.contains(name)
    }

    /// Tokens that bound to no flag, in order.
    #[must_use]
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }
}

/// Argument holder attached to a command: declares the command's metadata
/// and receives the values bound from the canonical vector.
pub trait CommandArgs: Any + Send {
    /// Declarative metadata for the owning command.
    fn spec(&self) -> &CommandSpec;

    /// Fill the holder's fields from bound values.
    fn bind(&mut self, matches: &ArgMatches) -> Result<()>;

    /// Upcast for the attach-time downcast in [`Command::set_args`].
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A dispatchable command.
///
/// Implementations are default-constructed by their provider, given a
/// freshly constructed argument holder through [`Command::set_args`] at
/// registry-build time, and executed with whatever the holder carries after
/// binding.
pub trait Command: Send {
    /// The attached argument holder.
    fn args(&self) -> &dyn CommandArgs;

    /// Mutable access to the attached argument holder, for binding.
    fn args_mut(&mut self) -> &mut dyn CommandArgs;

    /// Attach a constructed argument holder.
    ///
    /// Fails with [`Error::ArgsMismatch`] when the holder is not the
    /// command's own argument type.
    fn set_args(&mut self, args: Box<dyn CommandArgs>) -> Result<()>;

    /// Run the command.
    fn execute(&mut self) -> Result<()>;
}
