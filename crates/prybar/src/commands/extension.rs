//! `extension list`, `extension install`, and `extension uninstall`.
//!
//! Extension management lives in the fixed core: these commands have to
//! work before any extension is installed. All three resolve the live
//! extensions directory themselves; they never consult the cached registry,
//! which still reflects the scan taken at startup.

use std::{any::Any, fs, path::PathBuf};

use prybar_core::{
    extensions::{extensions_directory, installed_packages, manifest::ExtensionManifest},
    ArgMatches, Command, CommandArgs, CommandSpec, Error, FlagSpec, GlobalArgs, Result,
};

/// Argument holder for `extension list`.
pub struct ListArgs {
    spec: CommandSpec,
    pub global: GlobalArgs,
    json: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            spec: CommandSpec::new(["extension list"], "List installed extension packages")
                .with_flag(FlagSpec::boolean(["--json"], "Machine-readable output")),
            global: GlobalArgs::default(),
            json: false,
        }
    }
}

impl CommandArgs for ListArgs {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn bind(&mut self, matches: &ArgMatches) -> Result<()> {
        self.global.fill(matches);
        self.json = matches.is_present("--json");
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// List the packages installed in the extensions directory.
#[derive(Default)]
pub struct ListCommand {
    args: ListArgs,
}

impl Command for ListCommand {
    fn args(&self) -> &dyn CommandArgs {
        &self.args
    }

    fn args_mut(&mut self) -> &mut dyn CommandArgs {
        &mut self.args
    }

    fn set_args(&mut self, args: Box<dyn CommandArgs>) -> Result<()> {
        self.args = *args
            .into_any()
            .downcast::<ListArgs>()
            .map_err(|_| Error::ArgsMismatch {
                command: "extension list",
            })?;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        let dir = extensions_directory()?;
        let packages = installed_packages(&dir)?;

        if self.args.json {
            let entries: Vec<serde_json::Value> = packages
                .iter()
                .map(|path| match ExtensionManifest::load(path) {
                    Ok(manifest) => serde_json::json!({
                        "path": path.display().to_string(),
                        "package": manifest.package.name,
                        "commands": manifest
                            .commands
                            .iter()
                            .filter_map(|command| command.names.first().cloned())
                            .collect::<Vec<_>>(),
                    }),
                    Err(error) => serde_json::json!({
                        "path": path.display().to_string(),
                        "error": error.to_string(),
                    }),
                })
                .collect();
            let listing = serde_json::Value::Array(entries);
            println!("{listing:#}");
            return Ok(());
        }

        if packages.is_empty() {
            println!("No extension packages installed in {}", dir.display());
            return Ok(());
        }
        for path in &packages {
            match ExtensionManifest::load(path) {
                Ok(manifest) => {
                    let commands: Vec<&str> = manifest
                        .commands
                        .iter()
                        .filter_map(|command| command.names.first().map(String::as_str))
                        .collect();
                    let name = if manifest.package.name.is_empty() {
                        path.display().to_string()
                    } else {
                        manifest.package.name.clone()
                    };
                    println!("{name}  [{}]", commands.join(", "));
                }
                Err(error) => println!("{}  (broken: {error})", path.display()),
            }
        }
        Ok(())
    }
}

/// Argument holder for `extension install`.
pub struct InstallArgs {
    spec: CommandSpec,
    pub global: GlobalArgs,
    source: Option<PathBuf>,
}

impl Default for InstallArgs {
    fn default() -> Self {
        Self {
            spec: CommandSpec::new(["extension install"], "Install an extension package"),
            global: GlobalArgs::default(),
            source: None,
        }
    }
}

impl CommandArgs for InstallArgs {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn bind(&mut self, matches: &ArgMatches) -> Result<()> {
        self.global.fill(matches);
        self.source = matches.positionals().first().map(PathBuf::from);
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Validate a package file and copy it into the extensions directory.
#[derive(Default)]
pub struct InstallCommand {
    args: InstallArgs,
}

impl Command for InstallCommand {
    fn args(&self) -> &dyn CommandArgs {
        &self.args
    }

    fn args_mut(&mut self) -> &mut dyn CommandArgs {
        &mut self.args
    }

    fn set_args(&mut self, args: Box<dyn CommandArgs>) -> Result<()> {
        self.args = *args
            .into_any()
            .downcast::<InstallArgs>()
            .map_err(|_| Error::ArgsMismatch {
                command: "extension install",
            })?;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        let Some(source) = self.args.source.clone() else {
            return Err(Error::MissingArgument {
                command: "extension install".to_string(),
                what: "a package file path".to_string(),
            });
        };
        let source = match &self.args.global.base {
            Some(base) if source.is_relative() => base.join(source),
            _ => source,
        };
        if source
            .extension()
            .map_or(true, |extension| extension != prybar_core::extensions::PACKAGE_EXTENSION)
        {
            return Err(Error::InvalidManifest {
                path: source,
                reason: "package files use the .toml extension".to_string(),
            });
        }

        // Install-time validation is strict where registry loading is
        // lenient; a package that would be skipped at startup is rejected
        // here instead of silently copied.
        let manifest = ExtensionManifest::load(&source)?;

        let dir = extensions_directory()?;
        let Some(file_name) = source.file_name() else {
            return Err(Error::InvalidManifest {
                path: source,
                reason: "package path has no file name".to_string(),
            });
        };
        let target = dir.join(file_name);
        fs::copy(&source, &target)
            .map_err(|error| Error::io(format!("copy package to {}", target.display()), error))?;

        if !self.args.global.quiet {
            let count = manifest.commands.len();
            let plural = if count == 1 { "" } else { "s" };
            println!(
                "Installed {} ({count} command{plural})",
                target.display()
            );
        }
        Ok(())
    }
}

/// Argument holder for `extension uninstall`.
pub struct UninstallArgs {
    spec: CommandSpec,
    pub global: GlobalArgs,
    name: Option<String>,
}

impl Default for UninstallArgs {
    fn default() -> Self {
        Self {
            spec: CommandSpec::new(
                ["extension uninstall"],
                "Remove an installed extension package",
            ),
            global: GlobalArgs::default(),
            name: None,
        }
    }
}

impl CommandArgs for UninstallArgs {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn bind(&mut self, matches: &ArgMatches) -> Result<()> {
        self.global.fill(matches);
        self.name = matches.positionals().first().cloned();
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Remove an installed package by name.
#[derive(Default)]
pub struct UninstallCommand {
    args: UninstallArgs,
}

impl Command for UninstallCommand {
    fn args(&self) -> &dyn CommandArgs {
        &self.args
    }

    fn args_mut(&mut self) -> &mut dyn CommandArgs {
        &mut self.args
    }

    fn set_args(&mut self, args: Box<dyn CommandArgs>) -> Result<()> {
        self.args = *args
            .into_any()
            .downcast::<UninstallArgs>()
            .map_err(|_| Error::ArgsMismatch {
                command: "extension uninstall",
            })?;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        let Some(name) = self.args.name.clone() else {
            return Err(Error::MissingArgument {
                command: "extension uninstall".to_string(),
                what: "an installed package name".to_string(),
            });
        };
        let dir = extensions_directory()?;
        let mut file_name = name.clone();
        if !file_name.ends_with(".toml") {
            file_name.push_str(".toml");
        }
        let target = dir.join(&file_name);
        if !target.is_file() {
            return Err(Error::UnknownExtension { name });
        }
        fs::remove_file(&target)
            .map_err(|error| Error::io(format!("remove {}", target.display()), error))?;

        if !self.args.global.quiet {
            println!("Removed {}", target.display());
        }
        Ok(())
    }
}

pub(crate) fn new_list_command() -> Box<dyn Command> {
    Box::<ListCommand>::default()
}

pub(crate) fn new_list_args() -> Box<dyn CommandArgs> {
    Box::<ListArgs>::default()
}

pub(crate) fn new_install_command() -> Box<dyn Command> {
    Box::<InstallCommand>::default()
}

pub(crate) fn new_install_args() -> Box<dyn CommandArgs> {
    Box::<InstallArgs>::default()
}

pub(crate) fn new_uninstall_command() -> Box<dyn Command> {
    Box::<UninstallCommand>::default()
}

pub(crate) fn new_uninstall_args() -> Box<dyn CommandArgs> {
    Box::<UninstallArgs>::default()
}
