//! smallsh - Shell Module
//!
//! The Shell owns the read-eval loop: it reaps background jobs, prompts, parses one line
//! and hands the command to the launcher.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::process;

use log::{debug, error, info};
use nix::unistd::{self, Pid};

use crate::errors::Result;
use crate::jobs::JobTable;
use crate::launcher::{self, Outcome};
use crate::parse::Command;
use crate::shell::{ShellConfig, ShellState};
use crate::signals::SignalPolicy;

/// smallsh Shell
pub struct Shell {
    config: ShellConfig,
    state: ShellState,
    jobs: JobTable,
    /// Substituted for `$$`.
    pid: Pid,
}

impl Shell {
    /// Constructs a new Shell and installs its signal handlers.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        let signals = SignalPolicy::install()?;
        let shell = Shell::with_state(config, ShellState::new(signals));
        info!("smallsh started up");
        Ok(shell)
    }

    fn with_state(config: ShellConfig, state: ShellState) -> Shell {
        Shell {
            jobs: JobTable::with_capacity(config.job_capacity()),
            config,
            state,
            pid: unistd::getpid(),
        }
    }

    /// Writes the prompt and reads one line into `line`.
    ///
    /// Returns the number of bytes read; `0` means end of input.
    pub fn prompt(&self, stdout: &mut dyn Write, line: &mut String) -> io::Result<usize> {
        write!(stdout, "{}", self.config.prompt())?;
        stdout.flush()?;

        line.clear();
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        handle.read_line(line)
    }

    /// Parses and runs one line of input.
    pub fn execute_command_string(
        &mut self,
        input: &str,
        stdout: &mut dyn Write,
    ) -> Result<Outcome> {
        let foreground_only = self.state.foreground_only();
        let command = match Command::parse(input, self.pid.as_raw(), foreground_only)? {
            Some(command) => command,
            None => return Ok(Outcome::Continue),
        };
        debug!("parsed {:?}", command);

        launcher::run(&command, &mut self.state, &mut self.jobs, stdout)
    }

    /// Runs commands from stdin until `exit` or end of input.
    pub fn execute_from_stdin(&mut self) {
        let mut stdout = io::stdout();
        let mut line = String::new();

        loop {
            let temp_result = self.jobs.poll(&mut stdout);
            log_if_err!(temp_result, "polling background jobs");

            match self.prompt(&mut stdout, &mut line) {
                Ok(0) => {
                    debug!("end of input");
                    break;
                }
                Ok(_) => {}
                Err(ref e) if e.kind() == io::ErrorKind::InvalidData => {
                    eprintln!("smallsh: {}", e);
                    continue;
                }
                Err(e) => {
                    error!("failed to read input: {}", e);
                    break;
                }
            }

            match self.execute_command_string(&line, &mut stdout) {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Exit) => break,
                Err(e) => {
                    debug!("{:?}", e);
                    eprintln!("smallsh: {}", e);
                }
            }
        }
    }

    /// Exit the shell with status 0. Background jobs are left running.
    pub fn exit(&mut self) -> ! {
        if let Err(e) = io::stdout().flush() {
            error!("failed to flush stdout during shutdown: {}", e);
        }
        if self.jobs.has_jobs() {
            info!("leaving background jobs running: {:?}", self.jobs.pids());
        }

        info!("smallsh has shut down");
        process::exit(0);
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pid {}\n{:?}", self.pid, self.jobs)
    }
}
