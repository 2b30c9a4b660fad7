use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
};

use clap::{AppSettings, Arg, ArgMatches, Command as ClapCommand};

use crate::{
    error::{NosigError, NosigResult},
    machine::Command,
    redirect::Redirect,
};

struct OptionSpec {
    id: &'static str,
    long: &'static str,
    short: Option<char>,
    value_name: Option<&'static str>,
    realtime: bool,
    help: &'static str,
}

const fn flag(long: &'static str, short: Option<char>, help: &'static str) -> OptionSpec {
    OptionSpec {
        id: long,
        long,
        short,
        value_name: None,
        realtime: false,
        help,
    }
}

const fn rt_flag(long: &'static str, help: &'static str) -> OptionSpec {
    OptionSpec {
        realtime: true,
        ..flag(long, None, help)
    }
}

const fn valued(
    long: &'static str,
    short: Option<char>,
    value_name: &'static str,
    help: &'static str,
) -> OptionSpec {
    OptionSpec {
        value_name: Some(value_name),
        ..flag(long, short, help)
    }
}

// Listed in help order.
static OPTIONS: &[OptionSpec] = &[
    flag("reset", None, "Reset all signals: unblock & set to default dispositions"),
    valued("ignore", Some('I'), "SIG", "Ignore one signal"),
    flag("ignore-all", None, "Ignore all signals"),
    flag("ignore-all-std", None, "Ignore all standard signals"),
    rt_flag("ignore-all-rt", "Ignore all realtime signals"),
    valued("default", Some('D'), "SIG", "Reset one signal disposition to the default"),
    flag("default-all", None, "Reset all signal dispositions to their default"),
    flag("default-all-std", None, "Reset all standard signal dispositions to their default"),
    rt_flag("default-all-rt", "Reset all realtime signal dispositions to their default"),
    valued("add", Some('a'), "SIG", "Add signal to the current signal set"),
    valued("del", Some('d'), "SIG", "Delete signal from the current signal set"),
    flag("empty", Some('e'), "Empty out the current signal set"),
    flag("fill", Some('f'), "Fill the current signal set"),
    flag("block", Some('b'), "Add the current signal set to the block mask"),
    flag("unblock", Some('u'), "Remove the current signal set from the block mask"),
    flag("set", Some('s'), "Set the block mask to the current signal set"),
    flag("block-all", None, "Block all signals (ignores current signal set)"),
    flag("block-all-std", None, "Block all standard signals (ignores current signal set)"),
    rt_flag("block-all-rt", "Block all realtime signals (ignores current signal set)"),
    flag("unblock-all", None, "Unblock all signals (ignores current signal set)"),
    flag("unblock-all-std", None, "Unblock all standard signals (ignores current signal set)"),
    rt_flag("unblock-all-rt", "Unblock all realtime signals (ignores current signal set)"),
    valued("stdin", None, "PATH", "Redirect stdin from the specified path"),
    valued("stdout", None, "PATH", "Redirect stdout to the specified path"),
    valued("stderr", None, "PATH", "Redirect stderr to the specified path"),
    valued("output", None, "PATH", "Redirect stdout & stderr to the specified path"),
    flag("null-io", None, "Redirect stdin/stdout/stderr to /dev/null"),
    flag("verbose", Some('v'), "Display verbose internal nosig output"),
    flag("show-status", None, "Display current signal settings (meant for debugging)"),
    flag("list", Some('l'), "List all known signals"),
    // clap keeps the "version" id for itself.
    OptionSpec {
        id: "show-version",
        ..flag("version", Some('V'), "Show version info and exit")
    },
];

const ABOUT: &str = "Like `nohup`, but more advanced signal management.
Signals are specified by name e.g. SIGTERM or TERM.";

const ABOUT_RT: &str = "Like `nohup`, but more advanced signal management.
Signals are specified by name e.g. SIGTERM or TERM.
Realtime signals are specified as offsets of SIGRTMIN or SIGRTMAX.";

const AFTER_HELP: &str = "The options fall into one of three buckets:
 - Oneshots (sigaction(2)): --ignore --default
 - Set management (sigsetops(3)): --add --del --empty --fill
 - Set usage (sigprocmask(2)): --block --unblock --set
You should manage the set, then use the set.  This may be repeated!";

/// One command line option, in the order it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Signal(Command),
    Redirect(Redirect),
    ShowStatus,
    List,
    Version,
}

impl Step {
    pub fn from_option(id: &str, value: Option<&OsStr>) -> NosigResult<Self> {
        let path = || {
            value
                .map(PathBuf::from)
                .ok_or_else(|| NosigError::UsageError(format!("option '{}' requires a path", id)))
        };
        let step = match id {
            "stdin" => Step::Redirect(Redirect::Stdin(path()?)),
            "stdout" => Step::Redirect(Redirect::Stdout(path()?)),
            "stderr" => Step::Redirect(Redirect::Stderr(path()?)),
            "output" => Step::Redirect(Redirect::Output(path()?)),
            "null-io" => Step::Redirect(Redirect::NullIo),
            "show-status" => Step::ShowStatus,
            "list" => Step::List,
            "show-version" => Step::Version,
            _ => {
                let spec = value
                    .map(|v| {
                        v.to_str().ok_or_else(|| {
                            NosigError::invalid_spec(&v.to_string_lossy(), "not valid UTF-8")
                        })
                    })
                    .transpose()?;
                Step::Signal(Command::from_option(id, spec)?)
            }
        };
        Ok(step)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub steps: Vec<Step>,
    pub program: Vec<OsString>,
}

fn available(realtime: bool) -> impl Iterator<Item = &'static OptionSpec> {
    OPTIONS.iter().filter(move |o| realtime || !o.realtime)
}

/// The command line parser. The `-rt` options only exist when the platform
/// has realtime signals.
pub fn command(realtime: bool) -> ClapCommand<'static> {
    let mut cmd = ClapCommand::new("nosig")
        .about(if realtime { ABOUT_RT } else { ABOUT })
        .override_usage("nosig [options] <program> [program args]")
        .after_help(AFTER_HELP)
        .setting(AppSettings::TrailingVarArg)
        .setting(AppSettings::DisableVersionFlag);
    for o in available(realtime) {
        let mut arg = Arg::new(o.id)
            .long(o.long)
            .help(o.help)
            .multiple_occurrences(true);
        if let Some(short) = o.short {
            arg = arg.short(short);
        }
        if let Some(value_name) = o.value_name {
            arg = arg
                .takes_value(true)
                .value_name(value_name)
                .allow_hyphen_values(true)
                .allow_invalid_utf8(true);
        }
        cmd = cmd.arg(arg);
    }
    cmd.arg(
        Arg::new("program")
            .value_name("PROGRAM")
            .help("Program to run, followed by its arguments")
            .multiple_values(true)
            .allow_invalid_utf8(true),
    )
}

/// Turns parsed matches into the steps to run, in command line order.
pub fn invocation(matches: &ArgMatches, realtime: bool) -> NosigResult<Invocation> {
    let mut steps = Vec::new();
    for o in available(realtime) {
        let indices = match matches.indices_of(o.id) {
            Some(indices) => indices,
            None => continue,
        };
        if o.value_name.is_some() {
            let values = matches.values_of_os(o.id).into_iter().flatten();
            for (i, v) in indices.zip(values) {
                steps.push((i, Step::from_option(o.id, Some(v))?));
            }
        } else {
            for i in indices {
                steps.push((i, Step::from_option(o.id, None)?));
            }
        }
    }
    steps.sort_by_key(|(i, _)| *i);
    let program = matches
        .values_of_os("program")
        .map(|values| values.map(OsString::from).collect())
        .unwrap_or_default();
    Ok(Invocation {
        steps: steps.into_iter().map(|(_, s)| s).collect(),
        program,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range_ops::Partition;

    fn parse(realtime: bool, args: &[&str]) -> Invocation {
        let matches = command(realtime)
            .try_get_matches_from(std::iter::once("nosig").chain(args.iter().copied()))
            .unwrap();
        invocation(&matches, realtime).unwrap()
    }

    #[test]
    fn steps_keep_command_line_order() {
        let inv = parse(
            true,
            &[
                "--ignore-all",
                "-D",
                "INT",
                "-v",
                "--show-status",
                "-a",
                "TERM",
                "-bv",
                "--stdout",
                "out.log",
                "--ignore-all",
            ],
        );
        assert_eq!(
            inv.steps,
            vec![
                Step::Signal(Command::IgnoreAll(Partition::All)),
                Step::Signal(Command::Default("INT".to_string())),
                Step::Signal(Command::Verbose),
                Step::ShowStatus,
                Step::Signal(Command::Add("TERM".to_string())),
                Step::Signal(Command::Block),
                Step::Signal(Command::Verbose),
                Step::Redirect(Redirect::Stdout(PathBuf::from("out.log"))),
                Step::Signal(Command::IgnoreAll(Partition::All)),
            ]
        );
        assert!(inv.program.is_empty());
    }

    #[test]
    fn program_arguments_are_untouched() {
        let inv = parse(true, &["-I", "HUP", "sleep", "-I", "10", "--list"]);
        assert_eq!(inv.steps, vec![Step::Signal(Command::Ignore("HUP".to_string()))]);
        assert_eq!(inv.program, vec!["sleep", "-I", "10", "--list"]);

        let inv = parse(true, &["--reset", "--", "--not-an-option"]);
        assert_eq!(inv.steps, vec![Step::Signal(Command::Reset)]);
        assert_eq!(inv.program, vec!["--not-an-option"]);
    }

    #[test]
    fn values_may_look_like_options() {
        let inv = parse(true, &["--ignore", "-1", "true"]);
        assert_eq!(inv.steps, vec![Step::Signal(Command::Ignore("-1".to_string()))]);
    }

    #[test]
    fn redirect_and_output_steps() {
        let inv = parse(
            false,
            &["--null-io", "--stdin", "in", "--output", "all.log", "-l", "-V"],
        );
        assert_eq!(
            inv.steps,
            vec![
                Step::Redirect(Redirect::NullIo),
                Step::Redirect(Redirect::Stdin(PathBuf::from("in"))),
                Step::Redirect(Redirect::Output(PathBuf::from("all.log"))),
                Step::List,
                Step::Version,
            ]
        );
    }

    #[test]
    fn realtime_options_depend_on_the_platform() {
        assert!(command(true)
            .try_get_matches_from(["nosig", "--block-all-rt"])
            .is_ok());
        assert!(command(false)
            .try_get_matches_from(["nosig", "--block-all-rt"])
            .is_err());
        assert!(command(false)
            .try_get_matches_from(["nosig", "--block-all-std"])
            .is_ok());
    }

    #[test]
    fn help_is_not_an_error() {
        let err = command(true)
            .try_get_matches_from(["nosig", "--help"])
            .unwrap_err();
        assert!(!err.use_stderr());
        let err = command(true)
            .try_get_matches_from(["nosig", "--bogus"])
            .unwrap_err();
        assert!(err.use_stderr());
        let err = command(true)
            .try_get_matches_from(["nosig", "--ignore"])
            .unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn step_from_option() {
        assert_eq!(
            Step::from_option("fill", None),
            Ok(Step::Signal(Command::Fill))
        );
        assert!(matches!(
            Step::from_option("stdout", None),
            Err(NosigError::UsageError(_))
        ));
        assert!(matches!(
            Step::from_option("nope", None),
            Err(NosigError::UsageError(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_signal_specs_are_invalid() {
        use std::os::unix::ffi::OsStrExt;
        let spec = OsStr::from_bytes(b"SIG\xff");
        assert!(matches!(
            Step::from_option("ignore", Some(spec)),
            Err(NosigError::InvalidSigSpec { .. })
        ));
    }
}
