use std::io::Write;

use crate::builtins::{self, BuiltinCommand};
use crate::errors::Result;
use crate::launcher::Outcome;
use crate::shell::ShellState;

pub struct Exit;

/// `exit` takes no arguments and always ends the shell with status 0. Outstanding
/// background jobs are left running and are not reported.
impl BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    fn run(_state: &mut ShellState, _args: &[String], _stdout: &mut dyn Write) -> Result<Outcome> {
        Ok(Outcome::Exit)
    }
}
