use std::io::Write;

use anyhow::Context;
use platform::SignalBackend;
use posix::{Disposition, Signal};

use crate::{catalog::strip_sig, context::SignalContext};

fn write_id<B: SignalBackend, W: Write>(
    ctx: &SignalContext<B>,
    out: &mut W,
    sig: Signal,
) -> std::io::Result<()> {
    match ctx.verbose() {
        0 => write!(out, "{}", sig),
        1 => write!(out, "{}[{}]", strip_sig(&ctx.name_of(sig)), sig),
        _ => write!(out, "{}[{}]", ctx.name_of(sig), sig),
    }
}

/// Prints the disposition of every signal on one line and the block mask on
/// the next.
pub fn show_status<B: SignalBackend, W: Write>(
    ctx: &SignalContext<B>,
    out: &mut W,
) -> anyhow::Result<()> {
    let signals = || (1..=ctx.sigmax().0).map(Signal);
    let verbose = ctx.verbose() > 0;

    if verbose {
        write!(out, "disp:")?;
    }
    for sig in signals() {
        let c = match ctx.backend().disposition(sig) {
            Ok(Some(Disposition::Ignore)) => 'i',
            Ok(Some(Disposition::Default)) => 'd',
            Ok(None) => '?',
            Err(e) if e.is_invalid_argument() => 'd',
            Err(e) => {
                logger::warn!("sigaction({}) failed: {}", sig, e);
                '?'
            }
        };
        write!(out, " {}", c)?;
        write_id(ctx, out, sig)?;
    }
    writeln!(out)?;

    let blocked = ctx
        .backend()
        .blocked()
        .context("could not read the signal mask")?;
    if verbose {
        write!(out, "mask:")?;
    }
    for sig in signals() {
        write!(out, " {}", if blocked.contains(sig) { 'b' } else { 'u' })?;
        write_id(ctx, out, sig)?;
    }
    writeln!(out)?;
    Ok(())
}

fn list_one<W: Write>(
    out: &mut W,
    name: &str,
    sig: Signal,
    description: &str,
) -> std::io::Result<()> {
    writeln!(out, "{:<15} {:>2}   {}", name, sig.0, description)
}

/// Prints every signal name nosig understands.
pub fn list_signals<B: SignalBackend, W: Write>(
    ctx: &SignalContext<B>,
    out: &mut W,
) -> anyhow::Result<()> {
    let backend = ctx.backend();
    for entry in ctx.catalog().entries() {
        list_one(out, entry.name, entry.number, &backend.describe(entry.number))?;
    }
    if let Some(rt) = ctx.catalog().realtime() {
        list_one(out, "SIGRTMIN", rt.min, &backend.describe(rt.min))?;
        for k in 1..=rt.span() {
            let sig = Signal(rt.min.0 + k);
            list_one(out, &format!("SIGRTMIN+{}", k), sig, &backend.describe(sig))?;
        }
        list_one(out, "SIGRTMAX", rt.max, &backend.describe(rt.max))?;
        for k in 1..=rt.span() {
            let sig = Signal(rt.max.0 - k);
            list_one(out, &format!("SIGRTMAX-{}", k), sig, &backend.describe(sig))?;
        }
    }
    Ok(())
}

pub fn show_version<W: Write>(out: &mut W, realtime: bool) -> anyhow::Result<()> {
    writeln!(out, "nosig v{}", env!("CARGO_PKG_VERSION"))?;
    if realtime {
        writeln!(out, "Realtime signals supported")?;
    } else {
        writeln!(out, "OS missing realtime signal support")?;
    }
    let homepage = env!("CARGO_PKG_HOMEPAGE");
    if !homepage.is_empty() {
        writeln!(out, "{}", homepage)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use platform::fake::FakeSignals;

    use super::*;
    use crate::machine::Command;

    fn status(ctx: &SignalContext<FakeSignals>) -> Vec<String> {
        let mut out = Vec::new();
        show_status(ctx, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn terse_status() {
        let mut ctx = SignalContext::new(FakeSignals::without_realtime());
        ctx.apply(&Command::Ignore("HUP".to_string())).unwrap();
        ctx.apply(&Command::Add("INT".to_string())).unwrap();
        ctx.apply(&Command::Block).unwrap();
        let lines = status(&ctx);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" i1 d2 d3 "));
        assert!(lines[0].ends_with(" d31"));
        assert!(lines[1].starts_with(" u1 b2 u3 "));
        assert_eq!(lines[1].split(' ').count(), 32);
    }

    #[test]
    fn verbose_status_names_signals() {
        let mut ctx = SignalContext::new(FakeSignals::linux());
        ctx.apply(&Command::Verbose).unwrap();
        let lines = status(&ctx);
        assert!(lines[0].starts_with("disp: dHUP[1] dINT[2]"));
        assert!(lines[0].ends_with(" dRTMAX[64]"));
        assert!(lines[0].contains(" d???[32] "));
        assert!(lines[1].starts_with("mask: uHUP[1]"));

        ctx.apply(&Command::Verbose).unwrap();
        let lines = status(&ctx);
        assert!(lines[0].starts_with("disp: dSIGHUP[1]"));
        assert!(lines[1].contains(" uSIGRTMIN+1[35] "));
    }

    #[test]
    fn list_format() {
        let ctx = SignalContext::new(FakeSignals::linux());
        let mut out = Vec::new();
        list_signals(&ctx, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "SIGHUP           1   Signal 1");
        assert!(lines.contains(&"SIGRTMIN        34   Signal 34"));
        assert!(lines.contains(&"SIGRTMIN+30     64   Signal 64"));
        assert!(lines.contains(&"SIGRTMAX-1      63   Signal 63"));
        assert_eq!(lines.len(), ctx.catalog().entries().len() + 2 * 31);
    }

    #[test]
    fn list_without_realtime() {
        let ctx = SignalContext::new(FakeSignals::without_realtime());
        let mut out = Vec::new();
        list_signals(&ctx, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("SIGRTMIN"));
        assert_eq!(out.lines().count(), ctx.catalog().entries().len());
    }

    #[test]
    fn version() {
        let mut out = Vec::new();
        show_version(&mut out, true).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with(&format!("nosig v{}\n", env!("CARGO_PKG_VERSION"))));
        assert!(out.contains("Realtime signals supported"));

        let mut out = Vec::new();
        show_version(&mut out, false).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("OS missing realtime"));
    }
}
