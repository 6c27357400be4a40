//! Extension package manifests.
//!
//! An extension package is a TOML file in the extensions directory:
//!
//! ```toml
//! [package]
//! name = "deploy-tools"
//!
//! [[command]]
//! names = ["deploy watch"]
//! about = "Deploy and watch a bundle"
//! program = "deploy-runner"
//! args = ["--mode", "watch"]
//!
//! [[command.flag]]
//! names = ["-p", "--port"]
//! takes_value = true
//! help = "Runtime port"
//! ```
//!
//! Fields the registry treats as required metadata (`names`, `program`)
//! still default here: a manifest must *parse* for its commands to be
//! inspected at all, and the registry is the one place that decides whether
//! missing metadata is fatal.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level structure of an extension package file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtensionManifest {
    /// Package identity, informational.
    #[serde(default)]
    pub package: PackageSection,
    /// Commands the package contributes.
    #[serde(default, rename = "command")]
    pub commands: Vec<CommandManifest>,
}

/// The `[package]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One `[[command]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandManifest {
    /// Command names; the first is the registry key.
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub about: String,
    /// Program to run when the command executes.
    pub program: Option<String>,
    /// Fixed arguments passed before any bound ones.
    #[serde(default)]
    pub args: Vec<String>,
    /// Flags the command accepts.
    #[serde(default, rename = "flag")]
    pub flags: Vec<FlagManifest>,
}

/// One `[[command.flag]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FlagManifest {
    pub names: Vec<String>,
    #[serde(default)]
    pub takes_value: bool,
    #[serde(default)]
    pub help: String,
}

impl ExtensionManifest {
    /// Parse manifest text.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and fully validate a package file, as `extension install` does
    /// before copying it into the extensions directory.
    ///
    /// Unlike registry loading, which skips unreadable packages, validation
    /// here is strict: parse failures and missing command metadata are both
    /// reported as [`Error::InvalidManifest`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|source| Error::io(format!("read {}", path.display()), source))?;
        let manifest = Self::parse(&text).map_err(|source| Error::InvalidManifest {
            path: path.to_path_buf(),
            reason: source.to_string(),
        })?;
        for command in &manifest.commands {
            if command.names.is_empty() {
                return Err(Error::InvalidManifest {
                    path: path.to_path_buf(),
                    reason: "a command declares no command names".to_string(),
                });
            }
            if command.program.as_deref().unwrap_or_default().is_empty() {
                return Err(Error::InvalidManifest {
                    path: path.to_path_buf(),
                    reason: format!(
                        "command '{}' declares no program",
                        command.names.join(", ")
                    ),
                });
            }
        }
        Ok(manifest)
    }
}
