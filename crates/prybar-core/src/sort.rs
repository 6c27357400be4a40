//! Argument vector canonicalization.
//!
//! Users interleave flags and command words freely (`prybar --base /ws
//! server start --debug`), and command names may span several words. The
//! sorter rewrites a raw argument vector into canonical form: positional
//! tokens first (with recognized multi-word command names collapsed into
//! one spaced token), flag tokens last, valued flags kept adjacent to their
//! values, original relative order preserved within each partition.
//!
//! The sorter validates nothing. A vector it cannot make sense of (dangling
//! valued flag, unknown command word) comes out reordered but still
//! malformed, and the downstream binder rejects it with a real diagnostic.

use itertools::Itertools;

use crate::{command::CommandSpec, flags::FlagClassifier};

/// Derive the multi-word command name sequences from the loaded specs.
///
/// Sequences are ordered longest-first (ties lexicographic) so that
/// matching in [`sort_args`] is deterministic and a longer name like
/// `server start now` always wins over its `server start` prefix.
pub fn multi_word_names<'a>(specs: impl IntoIterator<Item = &'a CommandSpec>) -> Vec<Vec<String>> {
    specs
        .into_iter()
        .flat_map(CommandSpec::names)
        .filter(|name| name.contains(' '))
        .map(|name| name.split_whitespace().map(ToString::to_string).collect())
        .sorted_by(|a: &Vec<String>, b: &Vec<String>| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
        .dedup()
        .collect()
}

/// Reorder a raw argument vector into canonical form.
///
/// Single left-to-right pass over `args` into two buffers:
///
/// 1. A valued-flag token moves to the tail together with its following
///    token. A valued flag with nothing after it moves alone; rejecting the
///    request is the binder's job.
/// 2. A boolean-flag token moves to the tail.
/// 3. Any other token starts a multi-word match attempt: the first sequence
///    in `command_names` whose words equal the tokens from this position
///    (and which still fits in the remaining tokens) is collapsed into one
///    spaced token on the head, and scanning resumes past the span. With no
///    match the token joins the head as a plain positional.
///
/// Flags are classified before multi-word matching at every position, so a
/// flag name is never absorbed into a command name. The result is `head`
/// followed by `tail`. On input that is already canonical, with no
/// multi-word name spanning a former flag position, the sorter returns it
/// unchanged.
#[must_use]
pub fn sort_args(
    args: &[String],
    command_names: &[Vec<String>],
    flags: &FlagClassifier,
) -> Vec<String> {
    let mut head: Vec<String> = Vec::with_capacity(args.len());
    let mut tail: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let token = &args[i];
        if flags.is_valued(token) {
            tail.push(token.clone());
            if let Some(value) = args.get(i + 1) {
                tail.push(value.clone());
                i += 2;
            } else {
                i += 1;
            }
        } else if flags.is_boolean(token) {
            tail.push(token.clone());
            i += 1;
        } else if let Some(words) = match_at(args, i, command_names) {
            head.push(words.join(" "));
            i += words.len();
        } else {
            head.push(token.clone());
            i += 1;
        }
    }

    head.append(&mut tail);
    head
}

/// The first command-name sequence fully matching the tokens at `i`.
fn match_at<'a>(
    args: &[String],
    i: usize,
    command_names: &'a [Vec<String>],
) -> Option<&'a Vec<String>> {
    command_names.iter().find(|words| {
        args.len() - i >= words.len()
            && words.iter().zip(&args[i..]).all(|(word, token)| word == token)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FlagSpec;

    fn server_specs() -> Vec<CommandSpec> {
        vec![
            CommandSpec::new(["server"], "Server status"),
            CommandSpec::new(["server start"], "Start the server"),
            CommandSpec::new(["server stop"], "Stop the server"),
        ]
    }

    fn classifier() -> FlagClassifier {
        let globals = [
            FlagSpec::boolean(["--debug"], "Enable debug output"),
            FlagSpec::valued(["--base"], "Working directory"),
        ];
        FlagClassifier::classify(std::iter::empty(), &globals)
    }

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_multi_word_names_longest_first() {
        let specs = vec![
            CommandSpec::new(["server start"], ""),
            CommandSpec::new(["server start now"], ""),
            CommandSpec::new(["deploy"], ""),
            CommandSpec::new(["server stop"], ""),
        ];
        let names = multi_word_names(specs.iter());
        assert_eq!(
            names,
            vec![
                tokens(&["server", "start", "now"]),
                tokens(&["server", "start"]),
                tokens(&["server", "stop"]),
            ]
        );
    }

    #[test]
    fn test_flags_move_to_tail_and_command_words_collapse() {
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(
            &tokens(&["--base", "/tmp/x", "server", "start", "--debug"]),
            &names,
            &classifier(),
        );
        assert_eq!(
            canonical,
            tokens(&["server start", "--base", "/tmp/x", "--debug"])
        );
    }

    #[test]
    fn test_out_of_order_words_stay_separate() {
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(
            &tokens(&["start", "server", "--debug"]),
            &names,
            &classifier(),
        );
        assert_eq!(canonical, tokens(&["start", "server", "--debug"]));
    }

    #[test]
    fn test_sequence_matches_when_it_consumes_the_rest() {
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(&tokens(&["server", "start"]), &names, &classifier());
        assert_eq!(canonical, tokens(&["server start"]));
    }

    #[test]
    fn test_longer_sequence_wins_over_prefix() {
        let specs = vec![
            CommandSpec::new(["server start"], ""),
            CommandSpec::new(["server start now"], ""),
        ];
        let names = multi_word_names(specs.iter());
        let canonical = sort_args(
            &tokens(&["server", "start", "now"]),
            &names,
            &classifier(),
        );
        assert_eq!(canonical, tokens(&["server start now"]));
    }

    #[test]
    fn test_flag_between_command_words_blocks_the_match() {
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(
            &tokens(&["server", "--debug", "start"]),
            &names,
            &classifier(),
        );
        assert_eq!(canonical, tokens(&["server", "start", "--debug"]));
    }

    #[test]
    fn test_flag_before_command_words_does_not_block() {
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(
            &tokens(&["--debug", "server", "stop"]),
            &names,
            &classifier(),
        );
        assert_eq!(canonical, tokens(&["server stop", "--debug"]));
    }

    #[test]
    fn test_dangling_valued_flag_moves_alone() {
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(
            &tokens(&["server", "start", "--base"]),
            &names,
            &classifier(),
        );
        assert_eq!(canonical, tokens(&["server start", "--base"]));
    }

    #[test]
    fn test_valued_flag_value_is_never_reinterpreted() {
        // The value consumes a token that would otherwise be a flag.
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(
            &tokens(&["--base", "--debug", "server"]),
            &names,
            &classifier(),
        );
        assert_eq!(canonical, tokens(&["server", "--base", "--debug"]));
    }

    #[test]
    fn test_relative_order_preserved_within_partitions() {
        let names = multi_word_names(server_specs().iter());
        let canonical = sort_args(
            &tokens(&["alpha", "--debug", "beta", "--base", "x", "gamma"]),
            &names,
            &classifier(),
        );
        assert_eq!(
            canonical,
            tokens(&["alpha", "beta", "gamma", "--debug", "--base", "x"])
        );
    }

    #[test]
    fn test_idempotent_on_canonical_input() {
        let names = multi_word_names(server_specs().iter());
        let raw = tokens(&["--debug", "server", "start", "--base", "/x", "extra"]);
        let canonical = sort_args(&raw, &names, &classifier());
        let again = sort_args(&canonical, &names, &classifier());
        assert_eq!(canonical, again);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let names = multi_word_names(server_specs().iter());
        assert!(sort_args(&[], &names, &classifier()).is_empty());
    }
}
