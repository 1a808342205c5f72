use std::env;
use std::io::Write;
use std::path::PathBuf;

use log::debug;

use crate::builtins::{self, BuiltinCommand};
use crate::errors::Result;
use crate::launcher::Outcome;
use crate::shell::ShellState;

pub struct Cd;

impl BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    /// Changes to the first argument, or to `$HOME` without one. Failures are not
    /// reported and do not change the last status.
    fn run(_state: &mut ShellState, args: &[String], _stdout: &mut dyn Write) -> Result<Outcome> {
        let dir = match args.first() {
            Some(dir) => Some(PathBuf::from(dir)),
            None => ::dirs::home_dir(),
        };

        match dir {
            Some(dir) => {
                if let Err(e) = env::set_current_dir(&dir) {
                    debug!("cd: {}: {}", dir.display(), e);
                }
            }
            None => debug!("cd: HOME not set"),
        }

        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    #[test]
    fn cd_failure_is_silently_ignored() {
        let mut state = ShellState::detached();
        let before = env::current_dir().unwrap();
        let args = vec!["/this/directory/does/not/exist".to_string()];
        let mut out: Vec<u8> = Vec::new();

        let outcome = Cd::run(&mut state, &args, &mut out).unwrap();

        assert_eq!(outcome, Outcome::Continue);
        assert!(out.is_empty());
        assert_eq!(state.last_status(), 0);
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn cd_to_a_file_is_silently_ignored() {
        let mut state = ShellState::detached();
        let args = vec![file!().to_string(), "extra".to_string()];
        let outcome = Cd::run(&mut state, &args, &mut io::sink()).unwrap();
        assert_eq!(outcome, Outcome::Continue);
    }
}
