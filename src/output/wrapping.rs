//! Line wrapping human-readable output.

use std::fmt;
use std::io;
use std::sync::OnceLock;

/// Writes the given message to `stream`.
///
/// Hint: Use `wwriteln!(..)` or `weprintln!(..)` instead of invoking
/// this function directly.
pub fn wwriteln(stream: &mut dyn io::Write, msg: fmt::Arguments) {
    iwwriteln(stream, "", "", msg)
}

/// Writes the given message to `stream`, indenting continuations.
///
/// Hint: Use `weprintln!(initial_indent="...", ..)` or
/// `weprintln!(initial_indent="...", subsequent_indent="...", ..)`
/// instead of invoking this function directly.
pub fn iwwriteln(stream: &mut dyn io::Write,
                 initial_indent: &str,
                 subsequent_indent: &str,
                 msg: fmt::Arguments) {
    let m = format!("{}", msg);
    for l in wrap(&m, initial_indent, subsequent_indent) {
        if let Err(err) = writeln!(stream, "{}", l) {
            panic!("Error writing to output stream: {}", err);
        }
    }
}

/// Wraps `msg` to the terminal width.
fn wrap(msg: &str, initial_indent: &str, subsequent_indent: &str)
        -> Vec<String>
{
    textwrap::wrap(msg,
                   options()
                   .initial_indent(initial_indent)
                   .subsequent_indent(subsequent_indent))
        .into_iter()
        .map(|l| l.into_owned())
        .collect()
}

/// Returns options for text-wrapping.
fn options() -> textwrap::Options<'static> {
    static OPTIONS: OnceLock<textwrap::Options> = OnceLock::new();
    OPTIONS.get_or_init(|| {
        // It is better to use terminal_size instead of letting
        // textwrap do it, because textwrap uses an older version,
        // leading to duplicate crates.
        textwrap::Options::new(terminal_width())
    }).clone()
}

/// Returns the terminal width we assume for wrapping.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size().map(|(w, _h)| w.0)
        .unwrap_or(80)
        .into()
}
