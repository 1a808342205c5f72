//! Process launcher.
//!
//! Builtins run inside the shell. Anything else is forked: the child applies the signal
//! rule and its redirections and then replaces itself with the program, while the shell
//! either waits for it or records it as a background job.

use std::ffi::CString;
use std::io::Write;

use log::{debug, info};
use nix::errno::Errno;
use nix::libc;
use nix::sys::wait;
use nix::unistd::{self, ForkResult, Pid};

use crate::builtins;
use crate::errors::{Error, ErrorKind, Result};
use crate::jobs::JobTable;
use crate::parse::Command;
use crate::redirection::RedirectPlan;
use crate::shell::ShellState;
use crate::signals::SignalPolicy;
use crate::util::{write_stderr, WaitStatusExt};

/// Child exit status when the program cannot be executed.
pub const EXEC_FAILURE_EXIT_STATUS: i32 = 1;

/// What the main loop should do after a command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// Read the next line.
    Continue,
    /// Leave the shell.
    Exit,
}

/// Runs `command`.
///
/// Foreground commands are waited for and their status recorded in `state`; background
/// commands have their pid printed to `stdout` and registered in `jobs`.
pub fn run(
    command: &Command,
    state: &mut ShellState,
    jobs: &mut JobTable,
    stdout: &mut dyn Write,
) -> Result<Outcome> {
    if builtins::is_builtin(command.program()) {
        debug!("running builtin {}", command.program());
        return builtins::run(state, command.program(), command.args(), stdout);
    }

    run_external(command, state, jobs, stdout)?;
    Ok(Outcome::Continue)
}

fn run_external(
    command: &Command,
    state: &mut ShellState,
    jobs: &mut JobTable,
    stdout: &mut dyn Write,
) -> Result<()> {
    // Everything the child needs is allocated before fork.
    let argv = to_c_strings(&command.argv)?;
    let redirects = RedirectPlan::new(command)?;
    stdout.flush()?;

    match unsafe { unistd::fork() }? {
        ForkResult::Child => exec_child(&argv, &redirects, state.signals(), command.background),
        ForkResult::Parent { child } => {
            debug!("launched {} as pid {}", command.program(), child);
            if command.background {
                writeln!(stdout, "background pid is {}", child)?;
                stdout.flush()?;
                jobs.insert(child);
            } else {
                let status = wait_for_foreground(child)?;
                info!("foreground pid {} finished with {}", child, status);
                state.set_last_status(status);
            }
        }
    }

    Ok(())
}

/// Runs in the forked child and never returns.
fn exec_child(
    argv: &[CString],
    redirects: &RedirectPlan,
    signals: &SignalPolicy,
    background: bool,
) -> ! {
    if let Err(errno) = signals.prepare_child(background) {
        report_child_error(b"sigaction", errno);
    }

    redirects.apply();

    if let Err(errno) = unistd::execvp(&argv[0], argv) {
        report_child_error(argv[0].as_bytes(), errno);
    }
    unsafe { libc::_exit(EXEC_FAILURE_EXIT_STATUS) }
}

fn report_child_error(what: &[u8], errno: Errno) {
    write_stderr(&[b"smallsh: ", what, b": ", errno.desc().as_bytes(), b"\n"]);
}

/// Blocks until `child` exits or is killed, returning its status as the `status`
/// builtin records it.
fn wait_for_foreground(child: Pid) -> Result<i32> {
    loop {
        match wait::waitpid(child, None) {
            Ok(status) => {
                if let Some(code) = status.last_status() {
                    return Ok(code);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

fn to_c_strings(argv: &[String]) -> Result<Vec<CString>> {
    argv.iter()
        .map(|arg| {
            CString::new(arg.as_str()).map_err(|_| Error::from(ErrorKind::NulByte(arg.clone())))
        })
        .collect()
}
