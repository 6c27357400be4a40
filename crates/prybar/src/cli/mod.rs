//! CLI dispatch: registry -> classifier -> sorter -> binder -> command.
//!
//! `run_cli` is the data flow of the engine end to end: the registry yields
//! the loaded command specs, the classifier and multi-word name set are
//! derived from them, the raw argument vector is canonicalized, and the
//! first canonical token resolves the command that receives the bound
//! arguments.

use anyhow::Result;
use prybar_core::{
    multi_word_names, sort_args, ArgMatches, CommandSpec, Error, Extensions, FlagClassifier,
    FlagSpec, GlobalArgs,
};

use crate::commands;

/// Run the CLI against the process argument vector.
pub fn run_cli() -> Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    run_with_args(&raw)
}

/// Run the CLI against an explicit raw argument vector.
pub fn run_with_args(raw: &[String]) -> Result<()> {
    let extensions = Extensions::open(commands::builtin_providers())?;

    // Snapshot the metadata the canonicalization step needs.
    let specs: Vec<CommandSpec> = extensions.with_commands(|commands| {
        Ok(commands
            .values()
            .map(|command| command.args().spec().clone())
            .collect())
    })?;
    let globals = GlobalArgs::flags();
    let classifier = FlagClassifier::classify(specs.iter(), &globals);
    let names = multi_word_names(specs.iter());
    let canonical = sort_args(raw, &names, &classifier);

    let Some((name, rest)) = canonical.split_first() else {
        print_usage(&specs, &globals);
        return Ok(());
    };
    // A flag in first position means no command token was supplied at all
    // (flags sort after every positional).
    if name == "help" || classifier.is_flag(name) {
        print_usage(&specs, &globals);
        return Ok(());
    }

    extensions.with_commands(|commands| {
        let key = commands
            .iter()
            .find(|(key, command)| {
                *key == name
                    || command
                        .args()
                        .spec()
                        .names()
                        .iter()
                        .any(|alias| alias == name)
            })
            .map(|(key, _)| key.clone());
        let Some(key) = key else {
            return Err(Error::UnknownCommand { name: name.clone() });
        };
        let Some(command) = commands.get_mut(&key) else {
            return Err(Error::UnknownCommand { name: name.clone() });
        };

        let spec = command.args().spec().clone();
        let matches = ArgMatches::parse(&spec, &globals, rest)?;
        if matches.is_present("--help") {
            print_command_usage(&spec, &globals);
            return Ok(());
        }
        command.args_mut().bind(&matches)?;
        tracing::debug!(command = %key, "dispatching");
        command.execute()
    })?;
    Ok(())
}

/// Render a failure for the terminal, with a hint where one helps.
#[must_use]
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    if let Some(Error::UnknownCommand { .. }) = err.downcast_ref::<Error>() {
        return format!("{msg}\nRun 'prybar help' to list the available commands.");
    }
    if let Some(source) = err.source() {
        let source_msg = source.to_string();
        if !msg.contains(&source_msg) && !source_msg.is_empty() {
            return format!("{msg}\nCause: {source_msg}");
        }
    }
    msg
}

/// Print the top-level usage listing.
fn print_usage(specs: &[CommandSpec], globals: &[FlagSpec]) {
    println!(
        "prybar {} - pluggable command-line tool",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Usage: prybar [flags] <command> [args]");
    println!();
    println!("Commands:");
    let width = specs
        .iter()
        .filter_map(CommandSpec::primary_name)
        .map(str::len)
        .max()
        .unwrap_or(0);
    for spec in specs {
        let Some(name) = spec.primary_name() else {
            continue;
        };
        println!("  {name:<width$}  {}", spec.about());
    }
    println!();
    print_flag_listing(globals);
}

/// Print usage for a single command.
fn print_command_usage(spec: &CommandSpec, globals: &[FlagSpec]) {
    let name = spec.primary_name().unwrap_or_default();
    println!("Usage: prybar {name} [flags] [args]");
    if !spec.about().is_empty() {
        println!();
        println!("{}", spec.about());
    }
    println!();
    let flags: Vec<FlagSpec> = spec.flags().iter().chain(globals).cloned().collect();
    print_flag_listing(&flags);
}

fn print_flag_listing(flags: &[FlagSpec]) {
    println!("Flags:");
    let labels: Vec<String> = flags
        .iter()
        .map(|flag| {
            let mut label = flag.names().join(", ");
            if flag.takes_value() {
                label.push_str(" <value>");
            }
            label
        })
        .collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0);
    for (label, flag) in labels.iter().zip(flags) {
        println!("  {label:<width$}  {}", flag.help());
    }
}
