//! Background job table and reaper.

use std::fmt;
use std::io::Write;

use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::errors::Result;
use crate::util::{describe_status, WaitStatusExt};

/// Number of background jobs tracked at once.
pub const JOB_TABLE_CAPACITY: usize = 100;

/// Fixed-capacity table of background process ids.
///
/// Slots are filled by a cursor that wraps around to slot 0 once it reaches the end.
/// Wrapping onto a slot whose job is still running overwrites it, and that job is then
/// never reported.
pub struct JobTable {
    slots: Vec<Option<Pid>>,
    cursor: usize,
}

impl JobTable {
    /// Creates an empty table with room for `capacity` jobs.
    pub fn with_capacity(capacity: usize) -> JobTable {
        JobTable {
            slots: vec![None; capacity.max(1)],
            cursor: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if any background job is still being tracked.
    pub fn has_jobs(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Process ids currently tracked, in slot order.
    pub fn pids(&self) -> Vec<Pid> {
        self.slots.iter().filter_map(|slot| *slot).collect()
    }

    /// Registers a background process.
    ///
    /// Returns the pid that was dropped from tracking if the slot under the cursor was
    /// still occupied.
    pub fn insert(&mut self, pid: Pid) -> Option<Pid> {
        let overwritten = self.slots[self.cursor].replace(pid);
        if let Some(old) = overwritten {
            warn!(
                "job table full: slot {} reused, no longer tracking pid {}",
                self.cursor, old
            );
        }
        debug!("tracking background pid {} in slot {}", pid, self.cursor);

        self.cursor += 1;
        if self.cursor >= self.slots.len() {
            self.cursor = 0;
        }
        overwritten
    }

    /// Checks every tracked job without blocking, reporting and clearing finished ones.
    ///
    /// Reports are written to `stdout` in slot order as
    /// `background pid <pid> is done: exit value <n>` or
    /// `background pid <pid> is done: terminated by signal <n>`.
    pub fn poll(&mut self, stdout: &mut dyn Write) -> Result<()> {
        for slot in &mut self.slots {
            let pid = match *slot {
                Some(pid) => pid,
                None => continue,
            };

            match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => {}
                Ok(status) => {
                    if let Some(code) = status.last_status() {
                        debug!("background pid {} finished: {:?}", pid, status);
                        writeln!(
                            stdout,
                            "background pid {} is done: {}",
                            pid,
                            describe_status(code)
                        )?;
                        *slot = None;
                    }
                }
                Err(Errno::ECHILD) => {
                    warn!("background pid {} is not our child, dropping it", pid);
                    *slot = None;
                }
                Err(e) => return Err(e.into()),
            }
        }

        stdout.flush()?;
        Ok(())
    }
}

impl Default for JobTable {
    fn default() -> JobTable {
        JobTable::with_capacity(JOB_TABLE_CAPACITY)
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} jobs\tcursor: {}",
            self.slots.iter().filter(|s| s.is_some()).count(),
            self.cursor
        )?;
        for (index, pid) in self.slots.iter().enumerate() {
            if let Some(pid) = pid {
                writeln!(f, "slot: {}\tpid: {}", index, pid)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;
    use std::time::Duration;

    use nix::unistd::{fork, ForkResult};

    fn pid(raw: i32) -> Pid {
        Pid::from_raw(raw)
    }

    #[test]
    fn insert_fills_in_order() {
        let mut jobs = JobTable::with_capacity(3);
        assert!(!jobs.has_jobs());
        assert_eq!(jobs.insert(pid(10)), None);
        assert_eq!(jobs.insert(pid(11)), None);
        assert_eq!(jobs.pids(), vec![pid(10), pid(11)]);
        assert!(jobs.has_jobs());
    }

    #[test]
    fn insert_wraps_and_overwrites_oldest() {
        let mut jobs = JobTable::with_capacity(3);
        for raw in 1..=3 {
            assert_eq!(jobs.insert(pid(raw)), None);
        }
        // Known limitation: pid 1 is silently dropped.
        assert_eq!(jobs.insert(pid(4)), Some(pid(1)));
        assert_eq!(jobs.pids(), vec![pid(4), pid(2), pid(3)]);
        assert_eq!(jobs.insert(pid(5)), Some(pid(2)));
        assert_eq!(jobs.pids().len(), jobs.capacity());
    }

    #[test]
    fn default_capacity() {
        let mut jobs = JobTable::default();
        assert_eq!(jobs.capacity(), JOB_TABLE_CAPACITY);
        for raw in 0..(JOB_TABLE_CAPACITY as i32 + 5) {
            jobs.insert(pid(1000 + raw));
        }
        assert_eq!(jobs.pids().len(), JOB_TABLE_CAPACITY);
    }

    #[test]
    fn poll_empty_table_prints_nothing() {
        let mut jobs = JobTable::default();
        let mut out: Vec<u8> = Vec::new();
        jobs.poll(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn poll_drops_unknown_pid() {
        let mut jobs = JobTable::default();
        // Never a child of the test process.
        jobs.insert(pid(1));
        let mut out: Vec<u8> = Vec::new();
        jobs.poll(&mut out).unwrap();
        assert!(out.is_empty());
        assert!(!jobs.has_jobs());
    }

    #[test]
    fn poll_reports_exit_value_once() {
        let child = match unsafe { fork() }.unwrap() {
            ForkResult::Child => unsafe { nix::libc::_exit(7) },
            ForkResult::Parent { child } => child,
        };

        let mut jobs = JobTable::default();
        jobs.insert(child);

        let mut out: Vec<u8> = Vec::new();
        for _ in 0..200 {
            jobs.poll(&mut out).unwrap();
            if !jobs.has_jobs() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("background pid {} is done: exit value 7\n", child)
        );

        let mut again: Vec<u8> = Vec::new();
        jobs.poll(&mut again).unwrap();
        assert!(again.is_empty());
    }
}
