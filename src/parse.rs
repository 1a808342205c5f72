//! smallsh Parser
//!
//! Turns one line of user input into a [`Command`]. The grammar is deliberately tiny:
//!
//! ```text
//! <program> [args...] [< input_file] [> output_file] [&]
//! ```
//!
//! A line starting with `#` is a comment, and every `$$` is replaced with the shell's
//! process id before the line is split on whitespace.

use crate::errors::{ErrorKind, Result};

/// Input lines must be shorter than this many bytes, trailing newline included.
pub const MAX_LINE_LEN: usize = 2048;
/// Most arguments accepted after the program name.
pub const MAX_ARGS: usize = 512;

const COMMENT_MARKER: char = '#';
const PID_MARKER: &str = "$$";
const INPUT_REDIRECT: &str = "<";
const OUTPUT_REDIRECT: &str = ">";
const BACKGROUND_MARKER: &str = "&";

/// Represents all information associated with one line of user input.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    /// Program or builtin name followed by its arguments. Never empty.
    pub argv: Vec<String>,
    /// The name of the input file, if one is specified
    pub input_path: Option<String>,
    /// The file to write stdout to, if one is specified
    pub output_path: Option<String>,
    /// Run the command in the background, defaults to false
    pub background: bool,
}

impl Command {
    /// Parses a line of input into a `Command`.
    ///
    /// Returns `Ok(None)` for blank lines and comments. `shell_pid` replaces every `$$`,
    /// and `foreground_only` forces the result to run in the foreground even when the
    /// line ends with `&`.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallsh::parse::Command;
    ///
    /// let command = Command::parse("ls -l > out.txt", 42, false).unwrap().unwrap();
    /// assert_eq!(command.argv, vec!["ls", "-l"]);
    /// assert_eq!(command.output_path, Some("out.txt".to_string()));
    /// assert!(command.input_path.is_none());
    /// assert!(!command.background);
    /// ```
    pub fn parse(line: &str, shell_pid: i32, foreground_only: bool) -> Result<Option<Command>> {
        if line.len() >= MAX_LINE_LEN {
            return Err(ErrorKind::LineTooLong(line.len()).into());
        }

        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            return Ok(None);
        }

        let expanded = expand_pid(line, shell_pid);
        let mut words = expanded.split_whitespace();
        let program = match words.next() {
            Some(program) => program,
            None => return Ok(None),
        };

        let mut builder = CommandBuilder::new(program);
        while let Some(word) = words.next() {
            match word {
                INPUT_REDIRECT => {
                    let path = words
                        .next()
                        .ok_or_else(|| ErrorKind::Syntax(line.to_string()))?;
                    builder.input(path);
                }
                OUTPUT_REDIRECT => {
                    let path = words
                        .next()
                        .ok_or_else(|| ErrorKind::Syntax(line.to_string()))?;
                    builder.output(path);
                }
                _ => {
                    builder.arg(word);
                }
            }
        }

        if builder.last_arg() == Some(BACKGROUND_MARKER) {
            // A lone `&` leaves nothing to run.
            if builder.arg_count() == 0 {
                return Ok(None);
            }
            builder.pop_arg();
            builder.background(!foreground_only);
        }

        let arg_count = builder.arg_count();
        if arg_count > MAX_ARGS {
            return Err(ErrorKind::TooManyArguments(arg_count).into());
        }

        Ok(Some(builder.build()))
    }

    /// The program or builtin to run.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments following the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Replaces every `$$` in `line` with the decimal form of `shell_pid`.
pub fn expand_pid(line: &str, shell_pid: i32) -> String {
    line.replace(PID_MARKER, &shell_pid.to_string())
}

/// Builds Commands.
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    argv: Vec<String>,
    input_path: Option<String>,
    output_path: Option<String>,
    background: bool,
}

impl CommandBuilder {
    /// Construct a new `CommandBuilder` for `program`, with the following default
    /// configuration:
    ///
    /// * No arguments
    /// * No input/output redirection
    /// * Runs in foreground
    pub fn new(program: &str) -> CommandBuilder {
        CommandBuilder {
            argv: vec![program.to_string()],
            input_path: None,
            output_path: None,
            background: false,
        }
    }

    /// Add an argument to pass to the program.
    pub fn arg(&mut self, arg: &str) -> &mut CommandBuilder {
        self.argv.push(arg.to_string());
        self
    }

    /// Add several arguments to pass to the program.
    pub fn args(&mut self, args: &[&str]) -> &mut CommandBuilder {
        self.argv.extend(args.iter().map(|a| (*a).to_owned()));
        self
    }

    /// Add input redirection from the specified filename.
    pub fn input(&mut self, path: &str) -> &mut CommandBuilder {
        self.input_path = Some(path.to_string());
        self
    }

    /// Add output redirection to the specified filename.
    pub fn output(&mut self, path: &str) -> &mut CommandBuilder {
        self.output_path = Some(path.to_string());
        self
    }

    /// Configure the command to run in the background.
    pub fn background(&mut self, background: bool) -> &mut CommandBuilder {
        self.background = background;
        self
    }

    fn last_arg(&self) -> Option<&str> {
        self.argv.last().map(String::as_str)
    }

    fn pop_arg(&mut self) {
        if self.argv.len() > 1 {
            self.argv.pop();
        }
    }

    fn arg_count(&self) -> usize {
        self.argv.len() - 1
    }

    /// Build the final command.
    pub fn build(self) -> Command {
        Command {
            argv: self.argv,
            input_path: self.input_path,
            output_path: self.output_path,
            background: self.background,
        }
    }
}
