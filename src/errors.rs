//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

#![allow(deprecated)]

use error_chain::error_chain;

error_chain! {
    foreign_links {
        Docopt(::docopt::Error);
        Io(::std::io::Error);
        Log(::log::SetLoggerError);
        Nix(::nix::Error);
    }

    errors {
        Syntax(line: String) {
            description("syntax error")
            display("syntax error near: '{}'", line)
        }
        LineTooLong(len: usize) {
            description("input line too long")
            display("input line too long: {} bytes", len)
        }
        TooManyArguments(count: usize) {
            description("too many arguments")
            display("too many arguments: {}", count)
        }
        NulByte(word: String) {
            description("argument contains a nul byte")
            display("{}: argument contains a nul byte", word)
        }
    }
}

impl ErrorKind {
    /// Returns `true` if the command was rejected before any process was created.
    pub fn is_malformed_input(&self) -> bool {
        match *self {
            ErrorKind::Syntax(_)
            | ErrorKind::LineTooLong(_)
            | ErrorKind::TooManyArguments(_)
            | ErrorKind::NulByte(_) => true,
            _ => false,
        }
    }
}
