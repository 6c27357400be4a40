//! Commands contributed by extension packages.
//!
//! A declared command's implementation is an external program named in the
//! package manifest. Execution spawns it with the manifest's fixed
//! arguments, then the bound positionals, then the bound flags, inheriting
//! stdio so interactive and long-running programs behave normally. The
//! child's lifecycle beyond wait-for-exit is its own business.

use std::process;

use crate::{
    command::{ArgMatches, Command, CommandArgs, CommandSpec, FlagSpec, GlobalArgs},
    error::{Error, Result},
    extensions::manifest::CommandManifest,
};

/// Argument holder for a manifest-declared command.
#[derive(Debug, Clone)]
pub struct DeclaredArgs {
    spec: CommandSpec,
    global: GlobalArgs,
    positionals: Vec<String>,
    /// Bound flags to forward: primary name plus the value for valued ones.
    flag_values: Vec<(String, Option<String>)>,
}

impl DeclaredArgs {
    fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            global: GlobalArgs::default(),
            positionals: Vec::new(),
            flag_values: Vec::new(),
        }
    }
}

impl CommandArgs for DeclaredArgs {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn bind(&mut self, matches: &ArgMatches) -> Result<()> {
        self.global.fill(matches);
        self.positionals = matches.positionals().to_vec();
        self.flag_values.clear();
        for flag in self.spec.flags() {
            let Some(name) = flag.primary_name() else {
                continue;
            };
            if flag.takes_value() {
                if let Some(value) = matches.value(name) {
                    self.flag_values
                        .push((name.to_string(), Some(value.to_string())));
                }
            } else if matches.is_present(name) {
                self.flag_values.push((name.to_string(), None));
            }
        }
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

/// A command that runs the program declared in its extension package.
#[derive(Debug)]
pub struct DeclaredCommand {
    name: String,
    program: String,
    fixed_args: Vec<String>,
    args: DeclaredArgs,
}

/// Build a command candidate from one manifest entry.
///
/// Missing metadata is fatal here: a command without names cannot be keyed
/// and one without a program is inert. `origin` names the package file in
/// the resulting error.
pub(crate) fn from_manifest(
    origin: &str,
    entry: CommandManifest,
) -> Result<(Box<dyn Command>, Box<dyn CommandArgs>)> {
    let Some(name) = entry.names.first().cloned() else {
        return Err(Error::MissingCommandNames {
            origin: origin.to_string(),
        });
    };
    let program = match entry.program {
        Some(program) if !program.is_empty() => program,
        _ => {
            return Err(Error::MissingProgram {
                origin: origin.to_string(),
                name,
            })
        }
    };

    let mut spec = CommandSpec::new(entry.names, entry.about);
    for flag in entry.flags {
        let declared = if flag.takes_value {
            FlagSpec::valued(flag.names, flag.help)
        } else {
            FlagSpec::boolean(flag.names, flag.help)
        };
        spec = spec.with_flag(declared);
    }

    let command = DeclaredCommand {
        name,
        program,
        fixed_args: entry.args,
        args: DeclaredArgs::new(spec.clone()),
    };
    Ok((Box::new(command), Box::new(DeclaredArgs::new(spec))))
}

impl Command for DeclaredCommand {
    fn args(&self) -> &dyn CommandArgs {
        &self.args
    }

    fn args_mut(&mut self) -> &mut dyn CommandArgs {
        &mut self.args
    }

    fn set_args(&mut self, args: Box<dyn CommandArgs>) -> Result<()> {
        self.args = *args
            .into_any()
            .downcast::<DeclaredArgs>()
            .map_err(|_| Error::ArgsMismatch {
                command: "declared",
            })?;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        let mut child = process::Command::new(&self.program);
        child.args(&self.fixed_args);
        child.args(&self.args.positionals);
        for (name, value) in &self.args.flag_values {
            child.arg(name);
            if let Some(value) = value {
                child.arg(value);
            }
        }
        if let Some(base) = &self.args.global.base {
            child.current_dir(base);
        }
        if self.args.global.quiet {
            child.stdout(process::Stdio::null());
        }
        tracing::debug!(command = %self.name, program = %self.program, "spawning declared command");
        let status = child
            .status()
            .map_err(|source| Error::io(format!("run program '{}'", self.program), source))?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                name: self.name.clone(),
                code: status.code(),
            })
        }
    }
}
