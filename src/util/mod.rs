use std::os::unix::io::BorrowedFd;

use nix::errno::Errno;
use nix::libc;
use nix::sys::wait::WaitStatus;
use nix::unistd;

/// smallsh extensions for `WaitStatus`
pub trait WaitStatusExt {
    /// Status in the form the `status` builtin reports: the exit code when the process
    /// exited, the negated signal number when a signal terminated it.
    ///
    /// `None` for any other wait result (still alive, stopped, continued).
    fn last_status(&self) -> Option<i32>;
}

impl WaitStatusExt for WaitStatus {
    fn last_status(&self) -> Option<i32> {
        match *self {
            WaitStatus::Exited(_, code) => Some(code),
            WaitStatus::Signaled(_, signal, _) => Some(-(signal as i32)),
            _ => None,
        }
    }
}

/// Describes a recorded status: `exit value N` or `terminated by signal N`.
///
/// # Examples
/// ```rust
/// use smallsh::util::describe_status;
/// assert_eq!(describe_status(2), "exit value 2");
/// assert_eq!(describe_status(-9), "terminated by signal 9");
/// ```
pub fn describe_status(status: i32) -> String {
    if status >= 0 {
        format!("exit value {}", status)
    } else {
        format!("terminated by signal {}", -status)
    }
}

/// Unbuffered write to standard output, safe to call from a signal handler.
/// Errors are dropped.
pub fn write_stdout(message: &str) {
    write_raw(libc::STDOUT_FILENO, message.as_bytes());
}

/// Unbuffered write to standard error, safe to call between fork and exec.
pub fn write_stderr(parts: &[&[u8]]) {
    for part in parts {
        write_raw(libc::STDERR_FILENO, part);
    }
}

fn write_raw(fd: libc::c_int, mut bytes: &[u8]) {
    // Standard streams stay open for the life of the process.
    let fd = unsafe { BorrowedFd::borrow_raw(fd) };
    while !bytes.is_empty() {
        match unistd::write(fd, bytes) {
            Ok(0) => return,
            Ok(n) => bytes = &bytes[n..],
            Err(Errno::EINTR) => continue,
            Err(_) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn last_status_from_wait_status() {
        let pid = Pid::from_raw(100);
        assert_eq!(WaitStatus::Exited(pid, 0).last_status(), Some(0));
        assert_eq!(WaitStatus::Exited(pid, 2).last_status(), Some(2));
        assert_eq!(
            WaitStatus::Signaled(pid, Signal::SIGKILL, false).last_status(),
            Some(-9)
        );
        assert_eq!(
            WaitStatus::Signaled(pid, Signal::SIGINT, true).last_status(),
            Some(-2)
        );
        assert_eq!(WaitStatus::StillAlive.last_status(), None);
        assert_eq!(
            WaitStatus::Stopped(pid, Signal::SIGTSTP).last_status(),
            None
        );
    }

    #[test]
    fn describe() {
        assert_eq!(describe_status(0), "exit value 0");
        assert_eq!(describe_status(1), "exit value 1");
        assert_eq!(describe_status(-15), "terminated by signal 15");
    }
}
