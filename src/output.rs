//! Human-readable output.
//!
//! vpki writes its artifacts to files.  Everything meant for the
//! user (progress, warnings, and errors) goes to stderr, wrapped to
//! the width of the terminal.

pub mod wrapping;

// Sometimes the same error cascades, e.g. a transport error whose
// source renders with the same message.  Compress these.
fn error_chain(err: &anyhow::Error) -> Vec<String> {
    let mut errs = std::iter::once(err.to_string())
        .chain(err.chain().skip(1).map(|source| source.to_string()))
        .collect::<Vec<String>>();
    errs.dedup();
    errs
}

/// Prints the error and causes, if any.
pub fn print_error_chain(err: &anyhow::Error) {
    let mut errs = error_chain(err).into_iter();
    if let Some(e) = errs.next() {
        weprintln!(initial_indent = "Error: ", "{}", e);
    }
    errs.for_each(|cause| {
        weprintln!(initial_indent = "  because: ", "{}", cause)
    });
}
