//! Built-in commands compiled into the prybar core.
//!
//! The provider table here is the process's own contribution to command
//! discovery; the registry chains it ahead of the installed extension
//! packages so built-ins and extensions flow through one enumeration step.

pub mod extension;
pub mod version;

use prybar_core::CommandProvider;

/// The compiled-in provider table chained into extension discovery.
#[must_use]
pub fn builtin_providers() -> &'static [CommandProvider] {
    BUILTIN_PROVIDERS
}

static BUILTIN_PROVIDERS: &[CommandProvider] = &[
    CommandProvider {
        type_name: "prybar::commands::version::VersionCommand",
        new_command: version::new_command,
        new_args: version::new_args,
    },
    CommandProvider {
        type_name: "prybar::commands::extension::ListCommand",
        new_command: extension::new_list_command,
        new_args: extension::new_list_args,
    },
    CommandProvider {
        type_name: "prybar::commands::extension::InstallCommand",
        new_command: extension::new_install_command,
        new_args: extension::new_install_args,
    },
    CommandProvider {
        type_name: "prybar::commands::extension::UninstallCommand",
        new_command: extension::new_uninstall_command,
        new_args: extension::new_uninstall_args,
    },
];
