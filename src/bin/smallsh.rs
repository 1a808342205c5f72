use std::path::PathBuf;

use docopt::Docopt;
use log::debug;
use nix::unistd::Pid;
use serde_derive::Deserialize;

use smallsh::errors::*;
use smallsh::{Shell, ShellConfig};

const LOG_FILE_NAME: &str = ".smallsh_log";

const USAGE: &str = "
smallsh.

Usage:
    smallsh [options]
    smallsh (-h | --help)
    smallsh --version

Options:
    -h --help           Show this screen.
    --version           Show version.
    --log=<path>        File to write log to, defaults to ~/.smallsh_log
    --prompt=<prompt>   String printed before each command is read, defaults to \": \"
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    flag_version: bool,
    flag_log: Option<String>,
    flag_prompt: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if args.flag_version {
        println!("smallsh version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = init_logger(args.flag_log.as_deref()) {
        eprintln!("smallsh: continuing without a log: {}", e);
    }
    debug!("{:?}", args);

    let config = match args.flag_prompt {
        Some(prompt) => ShellConfig::with_prompt(prompt),
        None => ShellConfig::default(),
    };
    let mut shell = Shell::new(config).unwrap_or_else(|e| display_error_and_exit(&e));
    shell.execute_from_stdin();
    shell.exit()
}

fn init_logger(path: Option<&str>) -> Result<()> {
    let log_path = match path {
        Some(path) => PathBuf::from(path),
        None => default_log_path()?,
    };

    let pid = Pid::this();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(fern::log_file(log_path)?)
        .apply()?;
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(LOG_FILE_NAME))
        .ok_or_else(|| "unable to find home directory".into())
}

fn display_error_and_exit(error: &Error) -> ! {
    log::error!("failed to create shell: {}", error);
    eprintln!("smallsh: {}", error);
    std::process::exit(1);
}
