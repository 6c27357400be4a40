//! Extension discovery and the command registry.
//!
//! Commands reach the registry through one enumeration step with two
//! sources chained together: the compiled-in provider table (the process's
//! own commands) and the extension packages installed under the extensions
//! directory. Candidates from both sources get the same treatment: a
//! freshly constructed argument holder is attached to the command and the
//! registry is keyed by the first declared command name.
//!
//! The registry is built lazily on first use and cached; a second call
//! returns the same mapping even if the directory changed on disk.

pub mod declared;
pub mod manifest;

use std::{
    collections::BTreeMap,
    env, fs,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::{
    command::{Command, CommandArgs},
    error::{Error, Result},
    extensions::manifest::ExtensionManifest,
};

/// File extension of loadable packages.
pub const PACKAGE_EXTENSION: &str = "toml";

/// Environment variable overriding the `~/.prybar` root, mainly for tests.
pub const HOME_ENV: &str = "PRYBAR_HOME";

/// The live command registry: primary command name to command instance.
pub type CommandMap = BTreeMap<String, Box<dyn Command>>;

/// A compiled-in source of one command implementation.
#[derive(Clone, Copy)]
pub struct CommandProvider {
    /// Diagnostic name reported when the candidate is rejected.
    pub type_name: &'static str,
    /// Construct the command.
    pub new_command: fn() -> Box<dyn Command>,
    /// Construct the command's argument holder.
    pub new_args: fn() -> Box<dyn CommandArgs>,
}

impl std::fmt::Debug for CommandProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandProvider")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Command discovery over the extensions directory and a provider table.
pub struct Extensions {
    dir: PathBuf,
    providers: &'static [CommandProvider],
    commands: Mutex<Option<CommandMap>>,
}

impl Extensions {
    /// Resolve the extensions directory and prepare a registry over
    /// `providers`.
    ///
    /// The directory is `<root>/extensions` where the root is `$PRYBAR_HOME`
    /// or `~/.prybar`. Both levels are created when absent; an existing
    /// non-directory at either level is fatal.
    pub fn open(providers: &'static [CommandProvider]) -> Result<Self> {
        Ok(Self {
            dir: extensions_directory()?,
            providers,
            commands: Mutex::new(None),
        })
    }

    /// Like [`Extensions::open`] but rooted at an explicit directory.
    pub fn open_at(root: impl Into<PathBuf>, providers: &'static [CommandProvider]) -> Result<Self> {
        let root = root.into();
        ensure_directory(&root)?;
        let dir = root.join("extensions");
        ensure_directory(&dir)?;
        Ok(Self {
            dir,
            providers,
            commands: Mutex::new(None),
        })
    }

    /// The resolved extensions directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Run `f` against the lazily built command registry.
    ///
    /// The first call scans the directory and builds the mapping under the
    /// guard; concurrent callers block until it is complete and never see a
    /// partially built map. Later calls reuse the cached mapping.
    pub fn with_commands<T>(&self, f: impl FnOnce(&mut CommandMap) -> Result<T>) -> Result<T> {
        let mut guard = self
            .commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(commands) = guard.as_mut() {
            return f(commands);
        }
        let mut commands = self.load_commands()?;
        let result = f(&mut commands);
        *guard = Some(commands);
        result
    }

    /// The package files currently installed, sorted by path.
    ///
    /// This is a live view of the directory; the cached registry is not
    /// consulted or refreshed.
    pub fn installed_packages(&self) -> Result<Vec<PathBuf>> {
        installed_packages(&self.dir)
    }

    fn load_commands(&self) -> Result<CommandMap> {
        let paths = installed_packages(&self.dir)?;
        let mut loader = PackageLoader::open(self.providers, paths);
        let candidates = loader.candidates()?;
        drop(loader);

        let mut commands = CommandMap::new();
        let mut origins: BTreeMap<String, String> = BTreeMap::new();
        for candidate in candidates {
            let Candidate {
                origin,
                mut command,
                args,
            } = candidate;
            let Some(primary) = args.spec().names().first().cloned() else {
                return Err(Error::MissingCommandNames { origin });
            };
            command.set_args(args)?;
            if let Some(first) = origins.insert(primary.clone(), origin.clone()) {
                return Err(Error::DuplicateCommandName {
                    name: primary,
                    first,
                    second: origin,
                });
            }
            commands.insert(primary, command);
        }
        tracing::debug!(commands = commands.len(), "command registry built");
        Ok(commands)
    }
}

/// A loadable package discovered in the extensions directory.
///
/// The handle stays open for the duration of the scan and is closed when
/// the owning loader goes away.
#[derive(Debug)]
struct ExtensionPackage {
    path: PathBuf,
    file: File,
}

impl ExtensionPackage {
    fn read_manifest(&mut self) -> Result<ExtensionManifest> {
        let mut text = String::new();
        self.file
            .read_to_string(&mut text)
            .map_err(|source| Error::io(format!("read {}", self.path.display()), source))?;
        ExtensionManifest::parse(&text).map_err(|source| Error::InvalidManifest {
            path: self.path.clone(),
            reason: source.to_string(),
        })
    }
}

/// Scoped loader over one scan's worth of packages, chained to the
/// process's own provider table.
///
/// All package handles are released when the loader is dropped, whichever
/// way candidate enumeration ends.
struct PackageLoader {
    providers: &'static [CommandProvider],
    packages: Vec<ExtensionPackage>,
}

/// One discovered command implementation, not yet keyed.
struct Candidate {
    origin: String,
    command: Box<dyn Command>,
    args: Box<dyn CommandArgs>,
}

impl PackageLoader {
    /// Open every package path. A path that cannot be opened is skipped
    /// with a warning so one broken package never blocks the rest.
    fn open(providers: &'static [CommandProvider], paths: Vec<PathBuf>) -> Self {
        let packages = paths
            .into_iter()
            .filter_map(|path| match File::open(&path) {
                Ok(file) => Some(ExtensionPackage { path, file }),
                Err(error) => {
                    tracing::warn!(
                        package = %path.display(),
                        %error,
                        "skipping unreadable extension package"
                    );
                    None
                }
            })
            .collect();
        Self {
            providers,
            packages,
        }
    }

    /// Enumerate command candidates: provider table first, then each
    /// package's declared commands.
    ///
    /// A package that does not parse is skipped with a warning. A command
    /// entry with missing metadata is a fatal configuration error.
    fn candidates(&mut self) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for provider in self.providers {
            candidates.push(Candidate {
                origin: provider.type_name.to_string(),
                command: (provider.new_command)(),
                args: (provider.new_args)(),
            });
        }
        for package in &mut self.packages {
            let manifest = match package.read_manifest() {
                Ok(manifest) => manifest,
                Err(error) => {
                    tracing::warn!(
                        package = %package.path.display(),
                        %error,
                        "skipping malformed extension package"
                    );
                    continue;
                }
            };
            let origin = package.path.display().to_string();
            for entry in manifest.commands {
                let (command, args) = declared::from_manifest(&origin, entry)?;
                candidates.push(Candidate {
                    origin: origin.clone(),
                    command,
                    args,
                });
            }
        }
        Ok(candidates)
    }
}

/// Resolve (and create when absent) the extensions directory without
/// building a registry.
///
/// The root is `$PRYBAR_HOME` when set, `~/.prybar` otherwise; the
/// extensions directory lives directly under it. An existing non-directory
/// at either level is fatal.
pub fn extensions_directory() -> Result<PathBuf> {
    let root = match env::var_os(HOME_ENV) {
        Some(home) => PathBuf::from(home),
        None => directories::BaseDirs::new()
            .ok_or(Error::NoHomeDirectory)?
            .home_dir()
            .join(".prybar"),
    };
    ensure_directory(&root)?;
    let dir = root.join("extensions");
    ensure_directory(&dir)?;
    Ok(dir)
}

/// The `*.toml` package files under `dir`, sorted for determinism.
pub fn installed_packages(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|source| Error::io(format!("scan extensions directory {}", dir.display()), source))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|extension| extension == PACKAGE_EXTENSION)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Create `path` (and parents) when absent; reject an existing non-directory.
fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    fs::create_dir_all(path)
        .map_err(|source| Error::io(format!("create directory {}", path.display()), source))
}
