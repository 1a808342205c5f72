//! smallsh builtins
//!
//! Commands that run inside the shell process itself instead of in a child:
//! `exit`, `cd` and `status`.

use std::io::Write;

use self::dirs::Cd;
use self::exit::Exit;
use self::status::Status;

use crate::errors::Result;
use crate::launcher::Outcome;
use crate::shell::ShellState;

mod dirs;
mod exit;
mod status;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const STATUS_NAME: &str = "status";

/// Represents a smallsh builtin command such as cd or status.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// Runs the command with the given arguments in the shell's state.
    fn run(state: &mut ShellState, args: &[String], stdout: &mut dyn Write) -> Result<Outcome>;
}

pub fn is_builtin<T: AsRef<str>>(program: T) -> bool {
    [CD_NAME, EXIT_NAME, STATUS_NAME].contains(&program.as_ref())
}

/// precondition: `program` is a builtin.
pub fn run<T: AsRef<str>>(
    state: &mut ShellState,
    program: T,
    args: &[String],
    stdout: &mut dyn Write,
) -> Result<Outcome> {
    debug_assert!(is_builtin(&program));

    match program.as_ref() {
        CD_NAME => Cd::run(state, args, stdout),
        EXIT_NAME => Exit::run(state, args, stdout),
        STATUS_NAME => Status::run(state, args, stdout),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names() {
        assert!(is_builtin("cd"));
        assert!(is_builtin("exit"));
        assert!(is_builtin("status"));
        assert!(!is_builtin("ls"));
        assert!(!is_builtin("Status"));
        assert!(!is_builtin(""));
    }
}
