mod catalog;
pub mod cli;
pub mod config;
mod context;
pub mod error;
pub mod launcher;
pub mod machine;
pub mod range_ops;
pub mod redirect;
pub mod sigspec;
pub mod status;
mod working_set;

use std::io::Write;

use clap::ArgMatches;
use platform::{HostSignals, SignalBackend};

pub use catalog::{CatalogEntry, SignalCatalog, UNKNOWN_SIGNAL_NAME};
pub use context::SignalContext;
pub use error::{NosigError, NosigResult};
pub use working_set::WorkingSet;

use cli::{Invocation, Step};
use config::Config;
use launcher::{EXIT_ERR, EXIT_OK};

/// Runs nosig on the process's own arguments and returns the exit status.
/// Does not return when the program is executed.
pub fn nosig_main() -> i32 {
    let config = Config::from_env();
    if logger::init("nosig", config.log_level).is_err() {
        eprintln!("nosig: failed to set up logging");
        return EXIT_ERR;
    }
    logger::debug!("{:?}", config);

    let mut ctx = SignalContext::new(HostSignals);
    ctx.restore_runtime_signals();
    let realtime = ctx.catalog().realtime().is_some();
    let matches = match cli::command(realtime).try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { EXIT_ERR } else { EXIT_OK };
        }
    };
    match run(ctx, &matches, realtime) {
        Ok(status) => status,
        Err(e) => {
            logger::error!("{:#}", e);
            EXIT_ERR
        }
    }
}

fn run<B: SignalBackend>(
    mut ctx: SignalContext<B>,
    matches: &ArgMatches,
    realtime: bool,
) -> anyhow::Result<i32> {
    let invocation = cli::invocation(matches, realtime)?;
    let stdout = std::io::stdout();
    if let Some(status) = run_steps(&mut ctx, &invocation, &mut stdout.lock())? {
        return Ok(status);
    }
    launcher::exec(&invocation.program)
}

/// Runs the steps of `invocation` in order. Returns the exit status when a
/// step ends nosig before the program is executed.
pub fn run_steps<B: SignalBackend, W: Write>(
    ctx: &mut SignalContext<B>,
    invocation: &Invocation,
    out: &mut W,
) -> anyhow::Result<Option<i32>> {
    for step in &invocation.steps {
        match step {
            Step::Signal(cmd) => ctx.apply(cmd)?,
            Step::Redirect(redirect) => redirect.apply()?,
            Step::ShowStatus => return finish(out, |out| status::show_status(ctx, out)),
            Step::List => return finish(out, |out| status::list_signals(ctx, out)),
            Step::Version => {
                let realtime = ctx.catalog().realtime().is_some();
                return finish(out, |out| status::show_version(out, realtime));
            }
        }
    }
    Ok(None)
}

fn finish<W, F>(out: &mut W, print: F) -> anyhow::Result<Option<i32>>
where
    W: Write,
    F: FnOnce(&mut W) -> anyhow::Result<()>,
{
    print(out)?;
    out.flush()?;
    Ok(Some(EXIT_OK))
}
