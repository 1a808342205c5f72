//! Signal dispositions for the shell and the children it creates.
//!
//! The shell catches SIGINT and SIGTSTP for its whole lifetime. Both handlers are
//! allocation free: they write a fixed message straight to file descriptor 1 and,
//! for SIGTSTP, flip an atomic flag. Everything else reads that flag from the main
//! loop.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::errors::Result;
use crate::util::write_stdout;

/// Written when SIGINT reaches the shell.
pub const INTERRUPT_MESSAGE: &str = "terminated by signal 2\n";
/// Written when SIGTSTP turns foreground-only mode on.
pub const ENTER_FOREGROUND_ONLY_MESSAGE: &str =
    "Entering foreground-only mode (& is now ignored)\n";
/// Written when SIGTSTP turns foreground-only mode off.
pub const EXIT_FOREGROUND_ONLY_MESSAGE: &str = "Exiting foreground-only mode\n";

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

/// Process-wide signal policy.
///
/// Holds the flag written by the SIGTSTP handler and the SIGINT disposition the shell
/// replaced, so foreground children can get it back.
pub struct SignalPolicy {
    foreground_only: &'static AtomicBool,
    default_interrupt: SigAction,
}

impl SignalPolicy {
    /// Installs the shell's SIGINT and SIGTSTP handlers.
    ///
    /// Call once at startup.
    pub fn install() -> Result<SignalPolicy> {
        let interrupt = SigAction::new(
            SigHandler::Handler(handle_interrupt),
            SaFlags::SA_RESTART,
            SigSet::all(),
        );
        let stop = SigAction::new(
            SigHandler::Handler(handle_stop),
            SaFlags::SA_RESTART,
            SigSet::all(),
        );

        // Handlers only touch FOREGROUND_ONLY and write(2).
        let default_interrupt = unsafe { signal::sigaction(Signal::SIGINT, &interrupt) }?;
        unsafe { signal::sigaction(Signal::SIGTSTP, &stop) }?;
        debug!("installed SIGINT and SIGTSTP handlers");

        Ok(SignalPolicy {
            foreground_only: &FOREGROUND_ONLY,
            default_interrupt,
        })
    }

    /// A policy that installs nothing and tracks foreground-only mode in `flag`.
    ///
    /// Foreground children still reset SIGINT to its default action.
    #[cfg(test)]
    pub(crate) fn detached(flag: &'static AtomicBool) -> SignalPolicy {
        SignalPolicy {
            foreground_only: flag,
            default_interrupt: SigAction::new(
                SigHandler::SigDfl,
                SaFlags::empty(),
                SigSet::empty(),
            ),
        }
    }

    /// Returns `true` while `&` is being ignored.
    pub fn foreground_only(&self) -> bool {
        self.foreground_only.load(Ordering::SeqCst)
    }

    /// Applies the child-side disposition rule. Runs between fork and exec.
    ///
    /// A foreground child gets the original SIGINT disposition back; a background child
    /// keeps the shell's handler. SIGTSTP is left alone in both.
    pub fn prepare_child(&self, background: bool) -> nix::Result<()> {
        if !background {
            unsafe { signal::sigaction(Signal::SIGINT, &self.default_interrupt) }?;
        }
        Ok(())
    }
}

extern "C" fn handle_interrupt(_: libc::c_int) {
    write_stdout(INTERRUPT_MESSAGE);
}

extern "C" fn handle_stop(_: libc::c_int) {
    let was_foreground_only = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    if was_foreground_only {
        write_stdout(EXIT_FOREGROUND_ONLY_MESSAGE);
    } else {
        write_stdout(ENTER_FOREGROUND_ONLY_MESSAGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_reads_its_own_flag() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let policy = SignalPolicy::detached(&FLAG);
        assert!(!policy.foreground_only());
        FLAG.store(true, Ordering::SeqCst);
        assert!(policy.foreground_only());
    }

    // The only test that installs handlers in the test process.
    #[test]
    fn installed_handlers() {
        let policy = SignalPolicy::install().unwrap();
        let start = policy.foreground_only();

        signal::raise(Signal::SIGTSTP).unwrap();
        assert_eq!(policy.foreground_only(), !start);
        signal::raise(Signal::SIGTSTP).unwrap();
        assert_eq!(policy.foreground_only(), start);

        // Still running: SIGINT only prints a notification.
        signal::raise(Signal::SIGINT).unwrap();
        assert_eq!(policy.foreground_only(), start);
    }
}
