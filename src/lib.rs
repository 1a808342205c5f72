//! smallsh - a small interactive shell
//!
//! Reads one command per line, runs builtins (`exit`, `cd`, `status`) in process and
//! everything else in a forked child, with optional `<`/`>` redirection and background
//! execution via a trailing `&`. SIGTSTP toggles a foreground-only mode in which `&` is
//! ignored.

/// Logs `$result` at error level if it is an `Err`, prefixed with a formatted message.
macro_rules! log_if_err {
    ($result:expr, $fmt:expr) => {
        if let Err(ref e) = $result {
            log::error!(concat!($fmt, ": {}"), e);
        }
    };
    ($result:expr, $fmt:expr, $($arg:tt)*) => {
        if let Err(ref e) = $result {
            log::error!(concat!($fmt, ": {}"), $($arg)*, e);
        }
    };
}

mod builtins;
pub mod errors;
pub mod jobs;
pub mod launcher;
pub mod parse;
pub mod redirection;
pub mod shell;
pub mod signals;
pub mod util;

pub use crate::shell::{Shell, ShellConfig};
