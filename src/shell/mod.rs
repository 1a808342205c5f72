use crate::jobs::JOB_TABLE_CAPACITY;
use crate::signals::SignalPolicy;

pub use self::shell::Shell;

mod shell;

/// Printed before every line is read.
pub const DEFAULT_PROMPT: &str = ": ";

/// Policy object to control a Shell's behavior
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Written, without a newline, before each line of input is read.
    prompt: String,

    /// Number of background jobs tracked at once.
    job_capacity: usize,
}

impl ShellConfig {
    /// Creates the default configuration with a different prompt.
    pub fn with_prompt<S: Into<String>>(prompt: S) -> ShellConfig {
        ShellConfig {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// The prompt string.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Number of background jobs tracked at once.
    pub fn job_capacity(&self) -> usize {
        self.job_capacity
    }
}

impl Default for ShellConfig {
    fn default() -> ShellConfig {
        ShellConfig {
            prompt: DEFAULT_PROMPT.to_string(),
            job_capacity: JOB_TABLE_CAPACITY,
        }
    }
}

/// State shared between the main loop, the launcher and the builtins.
pub struct ShellState {
    signals: SignalPolicy,
    /// Status of the last foreground command. Positive or zero is an exit value,
    /// negative is the number of the signal that killed it.
    last_status: i32,
}

impl ShellState {
    /// Creates the state of a shell that has not run anything yet.
    pub fn new(signals: SignalPolicy) -> ShellState {
        ShellState {
            signals,
            last_status: 0,
        }
    }

    /// State with its own foreground-only flag and no handlers installed.
    #[cfg(test)]
    pub(crate) fn detached() -> ShellState {
        use std::sync::atomic::AtomicBool;

        let flag: &'static AtomicBool = Box::leak(Box::new(AtomicBool::new(false)));
        ShellState::new(SignalPolicy::detached(flag))
    }

    pub fn signals(&self) -> &SignalPolicy {
        &self.signals
    }

    /// Returns `true` while a trailing `&` is ignored.
    pub fn foreground_only(&self) -> bool {
        self.signals.foreground_only()
    }

    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    pub fn set_last_status(&mut self, status: i32) {
        self.last_status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ShellConfig::default();
        assert_eq!(config.prompt(), ": ");
        assert_eq!(config.job_capacity(), 100);
    }

    #[test]
    fn custom_prompt_keeps_job_capacity() {
        let config = ShellConfig::with_prompt("$ ");
        assert_eq!(config.prompt(), "$ ");
        assert_eq!(config.job_capacity(), JOB_TABLE_CAPACITY);
    }

    #[test]
    fn fresh_state() {
        let mut state = ShellState::detached();
        assert_eq!(state.last_status(), 0);
        assert!(!state.foreground_only());
        state.set_last_status(-15);
        assert_eq!(state.last_status(), -15);
    }
}
