use std::fmt;

use crate::config::Config;

/// The state of an invocation.
pub struct Vpki {
    pub config: Config,
}

impl Vpki {
    /// Returns the state for the given configuration.
    pub fn new(config: Config) -> Self {
        Vpki {
            config,
        }
    }

    /// Be verbose.
    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    /// Be quiet.
    pub fn quiet(&self) -> bool {
        self.config.quiet
    }

    /// Prints additional information in verbose mode.
    pub fn info(&self, msg: fmt::Arguments) {
        if self.verbose() {
            weprintln!("{}", msg);
        }
    }

    /// Prints a warning unless in quiet mode.
    pub fn warn(&self, msg: fmt::Arguments) {
        if ! self.quiet() {
            weprintln!(initial_indent = "Warning: ", "{}", msg);
        }
    }
}
