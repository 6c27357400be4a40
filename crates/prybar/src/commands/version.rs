//! `version` command.

use std::any::Any;

use prybar_core::{ArgMatches, Command, CommandArgs, CommandSpec, Error, GlobalArgs, Result};

/// Argument holder for `version`.
pub struct VersionArgs {
    spec: CommandSpec,
    pub global: GlobalArgs,
}

impl Default for VersionArgs {
    fn default() -> Self {
        Self {
            spec: CommandSpec::new(["version"], "Print the prybar version"),
            global: GlobalArgs::default(),
        }
    }
}

impl CommandArgs for VersionArgs {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn bind(&mut self, matches: &ArgMatches) -> Result<()> {
        self.global.fill(matches);
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Print the tool version.
#[derive(Default)]
pub struct VersionCommand {
    args: VersionArgs,
}

impl Command for VersionCommand {
    fn args(&self) -> &dyn CommandArgs {
        &self.args
    }

    fn args_mut(&mut self) -> &mut dyn CommandArgs {
        &mut self.args
    }

    fn set_args(&mut self, args: Box<dyn CommandArgs>) -> Result<()> {
        self.args = *args
            .into_any()
            .downcast::<VersionArgs>()
            .map_err(|_| Error::ArgsMismatch { command: "version" })?;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        println!("prybar {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}

pub(crate) fn new_command() -> Box<dyn Command> {
    Box::<VersionCommand>::default()
}

pub(crate) fn new_args() -> Box<dyn CommandArgs> {
    Box::<VersionArgs>::default()
}
