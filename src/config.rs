// SPDX-License-Identifier: MIT
//
// Command-line configuration.
//
// kilo has no config file. Everything it needs comes from argv:
//
//   kilo [OPTIONS] [FILE]
//
//   --log <PATH>   write tracing output to PATH (stdout is the screen)
//   -h, --help     print usage and exit
//   -V, --version  print version and exit
//   --             treat everything after as a file name
//
// Parsing never exits the process; `main` decides what to do with the
// resulting `Command`.

use std::path::PathBuf;

use anyhow::{Result, bail};

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Open the editor.
    #[default]
    Edit,
    /// Print usage.
    Help,
    /// Print the version.
    Version,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// File to display; `None` shows the welcome screen.
    pub path: Option<PathBuf>,
    /// Where to write logs; `None` disables logging.
    pub log_file: Option<PathBuf>,
    pub command: Command,
}

impl Config {
    /// Parse arguments, not including the program name.
    ///
    /// # Errors
    ///
    /// Unknown options, `--log` without a value, or more than one file.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::into);
        let mut only_files = false;

        while let Some(arg) = args.next() {
            if only_files || arg == "-" || !arg.starts_with('-') {
                config.set_path(arg)?;
                continue;
            }

            match arg.as_str() {
                "-h" | "--help" => config.command = Command::Help,
                "-V" | "--version" => {
                    if config.command == Command::Edit {
                        config.command = Command::Version;
                    }
                }
                "--log" => {
                    let Some(value) = args.next() else {
                        bail!("--log requires a path");
                    };
                    config.log_file = Some(PathBuf::from(value));
                }
                "--" => only_files = true,
                other => {
                    if let Some(value) = other.strip_prefix("--log=") {
                        if value.is_empty() {
                            bail!("--log requires a path");
                        }
                        config.log_file = Some(PathBuf::from(value));
                    } else {
                        bail!("unknown option: {other} (try --help)");
                    }
                }
            }
        }

        Ok(config)
    }

    /// Parse the process's own arguments.
    ///
    /// # Errors
    ///
    /// See [`Config::parse`].
    pub fn from_env() -> Result<Self> {
        Self::parse(std::env::args().skip(1))
    }

    fn set_path(&mut self, arg: String) -> Result<()> {
        if let Some(existing) = &self.path {
            bail!(
                "only one file can be opened (got {} and {arg})",
                existing.display()
            );
        }
        self.path = Some(PathBuf::from(arg));
        Ok(())
    }
}

/// Usage text for `--help`.
pub fn usage() -> String {
    format!(
        "kilo {version}\n\
         A minimal terminal text viewer.\n\
         \n\
         Usage: kilo [OPTIONS] [FILE]\n\
         \n\
         Options:\n\
         \x20     --log <PATH>  Write logs to PATH (level from KILO_LOG, default info)\n\
         \x20 -h, --help        Print this help\n\
         \x20 -V, --version     Print version\n\
         \n\
         Keys: arrows move, PageUp/PageDown page, Home/End jump, Ctrl-Q quits",
        version = env!("CARGO_PKG_VERSION"),
    )
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Config> {
        Config::parse(args.iter().copied())
    }

    #[test]
    fn no_args_edits_nothing() {
        assert_eq!(parse(&[]).unwrap(), Config::default());
    }

    #[test]
    fn single_file() {
        let config = parse(&["notes.txt"]).unwrap();
        assert_eq!(config.path, Some(PathBuf::from("notes.txt")));
        assert_eq!(config.command, Command::Edit);
    }

    #[test]
    fn log_with_separate_value() {
        let config = parse(&["--log", "/tmp/kilo.log", "a.txt"]).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/kilo.log")));
        assert_eq!(config.path, Some(PathBuf::from("a.txt")));
    }

    #[test]
    fn log_with_equals() {
        let config = parse(&["--log=kilo.log"]).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("kilo.log")));
        assert_eq!(config.path, None);
    }

    #[test]
    fn log_without_value_is_an_error() {
        assert!(parse(&["--log"]).is_err());
        assert!(parse(&["--log="]).is_err());
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["-h"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["--help"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["-V"]).unwrap().command, Command::Version);
        assert_eq!(parse(&["--version"]).unwrap().command, Command::Version);
    }

    #[test]
    fn help_wins_over_version() {
        assert_eq!(parse(&["-V", "-h"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["-h", "-V"]).unwrap().command, Command::Help);
    }

    #[test]
    fn unknown_option_is_an_error() {
        let err = parse(&["--frobnicate"]).unwrap_err();
        assert!(err.to_string().contains("--frobnicate"));
    }

    #[test]
    fn two_files_is_an_error() {
        let err = parse(&["a.txt", "b.txt"]).unwrap_err();
        assert!(err.to_string().contains("only one file"));
    }

    #[test]
    fn double_dash_ends_options() {
        let config = parse(&["--", "-weird-name"]).unwrap();
        assert_eq!(config.path, Some(PathBuf::from("-weird-name")));
    }

    #[test]
    fn usage_mentions_every_option() {
        let text = usage();
        for needle in ["--log", "--help", "--version", "KILO_LOG"] {
            assert!(text.contains(needle), "{needle}");
        }
    }
}
