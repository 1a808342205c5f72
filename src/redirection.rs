//! Standard input/output rebinding for child processes.
//!
//! [`RedirectPlan::new`] runs in the shell and does all the allocation; the child then
//! only issues `open`, `dup2` and `close` from [`RedirectPlan::apply`].

use std::ffi::{CStr, CString};
use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::libc;
use nix::sys::stat::Mode;
use nix::unistd;

use crate::errors::{Error, ErrorKind, Result};
use crate::parse::Command;
use crate::util::write_stderr;

/// Child exit status when a redirection file cannot be opened.
pub const OPEN_FAILURE_EXIT_STATUS: i32 = 2;
/// Child exit status when the opened file cannot replace a standard descriptor.
pub const DUP_FAILURE_EXIT_STATUS: i32 = 3;

const NULL_DEVICE: &[u8] = b"/dev/null\0";

/// Where one standard stream of the child comes from or goes to.
#[derive(Clone, Debug, PartialEq)]
pub enum Redirect {
    /// Keep whatever the shell has.
    Inherit,
    /// A file named on the command line.
    File(CString),
    /// The null device, for unattended background jobs.
    Null,
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Input,
    Output,
}

/// Standard input and output of one child, decided before it is created.
#[derive(Clone, Debug, PartialEq)]
pub struct RedirectPlan {
    stdin: Redirect,
    stdout: Redirect,
}

impl RedirectPlan {
    /// Decides how `command`'s standard streams are bound.
    ///
    /// An explicit path always wins; otherwise background commands get the null device
    /// and foreground commands inherit the shell's streams.
    pub fn new(command: &Command) -> Result<RedirectPlan> {
        Ok(RedirectPlan {
            stdin: choose(command.input_path.as_deref(), command.background)?,
            stdout: choose(command.output_path.as_deref(), command.background)?,
        })
    }

    #[cfg(test)]
    fn stdin(&self) -> &Redirect {
        &self.stdin
    }

    #[cfg(test)]
    fn stdout(&self) -> &Redirect {
        &self.stdout
    }

    /// Rebinds standard input, then standard output, in the calling process.
    ///
    /// Only ever call this in a freshly forked child. On failure a diagnostic is written
    /// to standard error and the process exits with [`OPEN_FAILURE_EXIT_STATUS`] or
    /// [`DUP_FAILURE_EXIT_STATUS`].
    pub fn apply(&self) {
        bind(&self.stdin, Direction::Input);
        bind(&self.stdout, Direction::Output);
    }
}

fn choose(path: Option<&str>, background: bool) -> Result<Redirect> {
    match path {
        Some(path) => CString::new(path)
            .map(Redirect::File)
            .map_err(|_| Error::from(ErrorKind::NulByte(path.to_string()))),
        None if background => Ok(Redirect::Null),
        None => Ok(Redirect::Inherit),
    }
}

fn bind(redirect: &Redirect, direction: Direction) {
    let path: &CStr = match redirect {
        Redirect::Inherit => return,
        Redirect::File(path) => path.as_c_str(),
        Redirect::Null => CStr::from_bytes_with_nul(NULL_DEVICE).unwrap_or_default(),
    };

    let (flags, target) = match direction {
        Direction::Input => (OFlag::O_RDONLY, libc::STDIN_FILENO),
        Direction::Output => (
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            libc::STDOUT_FILENO,
        ),
    };
    let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;

    let fd = match fcntl::open(path, flags, mode) {
        Ok(fd) => fd,
        Err(errno) => fail(path, direction, errno, OPEN_FAILURE_EXIT_STATUS),
    };
    if let Err(errno) = replace_fd(fd, target) {
        fail(path, direction, errno, DUP_FAILURE_EXIT_STATUS);
    }
}

/// Makes `fd` the descriptor `target` and releases the original.
fn replace_fd(fd: RawFd, target: RawFd) -> nix::Result<()> {
    if fd != target {
        unistd::dup2(fd, target)?;
        unistd::close(fd)?;
    }
    Ok(())
}

fn fail(path: &CStr, direction: Direction, errno: Errno, code: i32) -> ! {
    let what: &[u8] = match direction {
        Direction::Input => b" for input: ",
        Direction::Output => b" for output: ",
    };
    write_stderr(&[
        b"smallsh: cannot open ",
        path.to_bytes(),
        what,
        errno.desc().as_bytes(),
        b"\n",
    ]);
    unsafe { libc::_exit(code) }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parse::CommandBuilder;

    fn file(path: &str) -> Redirect {
        Redirect::File(CString::new(path).unwrap())
    }

    #[test]
    fn foreground_inherits() {
        let plan = RedirectPlan::new(&CommandBuilder::new("ls").build()).unwrap();
        assert_eq!(plan.stdin(), &Redirect::Inherit);
        assert_eq!(plan.stdout(), &Redirect::Inherit);
    }

    #[test]
    fn explicit_paths() {
        let mut builder = CommandBuilder::new("sort");
        builder.input("in.txt").output("out.txt");
        let plan = RedirectPlan::new(&builder.build()).unwrap();
        assert_eq!(plan.stdin(), &file("in.txt"));
        assert_eq!(plan.stdout(), &file("out.txt"));
    }

    #[test]
    fn background_uses_null_device() {
        let mut builder = CommandBuilder::new("sleep");
        builder.arg("5").background(true);
        let plan = RedirectPlan::new(&builder.build()).unwrap();
        assert_eq!(plan.stdin(), &Redirect::Null);
        assert_eq!(plan.stdout(), &Redirect::Null);
    }

    #[test]
    fn background_explicit_path_wins() {
        let mut builder = CommandBuilder::new("wc");
        builder.input("in.txt").background(true);
        let plan = RedirectPlan::new(&builder.build()).unwrap();
        assert_eq!(plan.stdin(), &file("in.txt"));
        assert_eq!(plan.stdout(), &Redirect::Null);
    }

    #[test]
    fn nul_byte_in_path() {
        let mut builder = CommandBuilder::new("cat");
        builder.input("in\0.txt");
        let err = RedirectPlan::new(&builder.build()).unwrap_err();
        assert!(err.kind().is_malformed_input());
    }
}
