use std::io::Write;

use crate::builtins::{self, BuiltinCommand};
use crate::errors::Result;
use crate::launcher::Outcome;
use crate::shell::ShellState;
use crate::util::describe_status;

pub struct Status;

impl BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    fn run(state: &mut ShellState, _args: &[String], stdout: &mut dyn Write) -> Result<Outcome> {
        writeln!(stdout, "{}", describe_status(state.last_status()))?;
        stdout.flush()?;
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_output(last_status: i32) -> String {
        let mut state = ShellState::detached();
        state.set_last_status(last_status);
        let mut out: Vec<u8> = Vec::new();
        Status::run(&mut state, &[], &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn initial_status() {
        let mut state = ShellState::detached();
        let mut out: Vec<u8> = Vec::new();
        Status::run(&mut state, &[], &mut out).unwrap();
        assert_eq!(out, b"exit value 0\n");
    }

    #[test]
    fn exit_value() {
        assert_eq!(status_output(2), "exit value 2\n");
    }

    #[test]
    fn terminated_by_signal() {
        assert_eq!(status_output(-9), "terminated by signal 9\n");
    }
}
