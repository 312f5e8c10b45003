use crate::error::{Result, StampError};
use std::path::PathBuf;

pub const DEFAULT_VERSION_FILE: &str = "version.ver";

/// Options for one stamping run. Built once from the command line and
/// passed by reference to every engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub increment_build: bool,
    pub increment_revision: bool,
    pub simulate: bool,
    pub verbose: bool,
    pub path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            increment_build: false,
            increment_revision: false,
            simulate: false,
            verbose: false,
            path: PathBuf::from(DEFAULT_VERSION_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Dir(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub engine: EngineConfig,
    pub log: Option<LogTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(RunOptions),
    Help,
}

/// Parses the full argv, program name included.
pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().skip(1).peekable();
    if args.peek().is_none() {
        return Err(StampError::Usage("no arguments given".to_string()));
    }

    let mut engine = EngineConfig::default();
    let mut log = None;

    while let Some(arg) = args.next() {
        let Some(option) = option_name(&arg) else {
            engine.path = PathBuf::from(&arg);
            continue;
        };

        match option {
            "inc" => engine.increment_build = true,
            "rev" => engine.increment_revision = true,
            "sim" => engine.simulate = true,
            "v" | "verbose" => engine.verbose = true,
            "h" | "?" | "help" => return Ok(Invocation::Help),
            "log" => log = Some(LogTarget::Stderr),
            "logdir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| StampError::Usage("-logdir needs a directory".to_string()))?;
                log = Some(LogTarget::Dir(PathBuf::from(dir)));
            }
            _ => return Err(StampError::Usage(format!("unknown option '{}'", arg))),
        }
    }

    Ok(Invocation::Run(RunOptions { engine, log }))
}

/// `-name`, or `/name` on Windows where absolute paths never start with a slash.
fn option_name(arg: &str) -> Option<&str> {
    arg.strip_prefix('-').or_else(|| {
        if cfg!(windows) {
            arg.strip_prefix('/')
        } else {
            None
        }
    })
}

pub fn usage(program: &str) -> String {
    let mut text = format!(
        "Usage: {} [-h] [-inc] [-rev] [-sim] [-v] [-log | -logdir <dir>] [{}]\n\n",
        program, DEFAULT_VERSION_FILE
    );
    text.push_str("  -inc    = Autoincrement build number\n");
    text.push_str("  -rev    = Autoincrement revision number (QFE)\n");
    text.push_str("  -sim    = Writes to stdout, the version file stays untouched.\n");
    text.push_str("  -v      = Verbose; prints the modifications to stdout too.\n");
    text.push_str("  -log    = Streams the session log to stderr.\n");
    text.push_str("  -logdir = Writes the session log into <dir>.\n");
    text.push_str("  -h/?    = This screen.\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("verstamp")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    fn run_options(args: &[&str]) -> RunOptions {
        match parse_args(argv(args)).unwrap() {
            Invocation::Run(opts) => opts,
            Invocation::Help => panic!("expected a run invocation"),
        }
    }

    #[test]
    fn no_arguments_is_a_usage_error() {
        let err = parse_args(argv(&[])).unwrap_err();
        assert!(matches!(err, StampError::Usage(_)));
    }

    #[test]
    fn flags_and_default_path() {
        let opts = run_options(&["-inc", "-sim"]);
        assert!(opts.engine.increment_build);
        assert!(!opts.engine.increment_revision);
        assert!(opts.engine.simulate);
        assert!(!opts.engine.verbose);
        assert_eq!(opts.engine.path, PathBuf::from("version.ver"));
        assert_eq!(opts.log, None);
    }

    #[test]
    fn verbose_alias_and_path() {
        let opts = run_options(&["-rev", "-verbose", "build/app.ver"]);
        assert!(opts.engine.increment_revision);
        assert!(opts.engine.verbose);
        assert_eq!(opts.engine.path, PathBuf::from("build/app.ver"));
    }

    #[test]
    #[cfg(windows)]
    fn slash_prefixed_options() {
        let opts = run_options(&["/inc", "/sim"]);
        assert!(opts.engine.increment_build);
        assert!(opts.engine.simulate);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_unix_path_is_not_an_option() {
        let opts = run_options(&["-inc", "/tmp/app.ver"]);
        assert_eq!(opts.engine.path, PathBuf::from("/tmp/app.ver"));
    }

    #[test]
    fn last_positional_wins() {
        let opts = run_options(&["a.ver", "-v", "b.ver"]);
        assert_eq!(opts.engine.path, PathBuf::from("b.ver"));
    }

    #[test]
    fn help_short_circuits() {
        for flag in ["-h", "-?", "-help"] {
            assert_eq!(parse_args(argv(&["-inc", flag])).unwrap(), Invocation::Help);
        }
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = parse_args(argv(&["-increment"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown option '-increment'");
    }

    #[test]
    fn log_targets() {
        assert_eq!(run_options(&["-log"]).log, Some(LogTarget::Stderr));
        assert_eq!(
            run_options(&["-logdir", "logs"]).log,
            Some(LogTarget::Dir(PathBuf::from("logs")))
        );
        assert!(parse_args(argv(&["-logdir"])).is_err());
    }

    #[test]
    fn usage_lists_every_option() {
        let text = usage("verstamp");
        for option in ["-inc", "-rev", "-sim", "-v", "-log", "-logdir", "-h/?"] {
            assert!(text.contains(option), "missing {option}");
        }
    }
}
